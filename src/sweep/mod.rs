pub mod handlers;
pub mod job;
pub mod message;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
