use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{instrument, warn};

use crate::{
    auth::services::AuthUser,
    config::AppConfig,
    error::ApiError,
    state::AppState,
    sweep::job::{self, SweepReport},
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/sweep/run", post(run))
}

#[derive(Debug, Deserialize)]
pub struct SweepParams {
    /// Skip the per-user preferred-hour gate.
    #[serde(default)]
    pub force: bool,
}

/// Trigger for an external scheduler (shared secret) or an authenticated
/// session. Anything else is rejected before the sweep starts.
#[instrument(skip(state, headers, user))]
pub async fn run(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: Option<AuthUser>,
    Query(params): Query<SweepParams>,
) -> Result<Json<SweepReport>, ApiError> {
    authorize(&state.config, &headers, user.is_some())?;
    let report = job::run_sweep(&state, OffsetDateTime::now_utc(), params.force).await?;
    Ok(Json(report))
}

fn authorize(config: &AppConfig, headers: &HeaderMap, has_session: bool) -> Result<(), ApiError> {
    if has_session {
        return Ok(());
    }
    let presented = headers.get("x-sweep-token").and_then(|v| v.to_str().ok());
    match (&config.sweep_token, presented) {
        (Some(expected), Some(token)) if token == expected => Ok(()),
        _ => {
            warn!("sweep trigger rejected: no session and no valid token");
            Err(ApiError::unauthorized("sweep trigger requires credentials"))
        }
    }
}
