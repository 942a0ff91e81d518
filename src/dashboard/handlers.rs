use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use time::{Date, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    care::CareKind,
    dashboard::{
        dto::{BulkActionResponse, DashboardPlant, DashboardResponse},
        services::{self, BulkAction},
    },
    error::ApiError,
    plants::repo,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/water-all", post(water_all))
        .route("/dashboard/postpone-all", post(postpone_all))
}

#[instrument(skip(state))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<DashboardResponse>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let plants = repo::list_by_user(&state.db, user_id).await?;
    let (needs_water, up_to_date) = services::partition(plants, today);
    Ok(Json(DashboardResponse {
        needs_water: needs_water.into_iter().map(DashboardPlant::from).collect(),
        up_to_date: up_to_date.into_iter().map(DashboardPlant::from).collect(),
    }))
}

/// Waters every plant that is overdue or due today.
#[instrument(skip(state))]
pub async fn water_all(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<BulkActionResponse>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let target = services::bulk_target_date(BulkAction::Water, today);
    let response = bulk_set_water_date(&state, user_id, today, target).await?;
    info!(user_id = %user_id, updated = response.updated, "watered all due plants");
    Ok(Json(response))
}

/// Pushes every due plant's last-watered date to yesterday, making it due
/// again tomorrow without counting as watered today. A fixed one-day shift,
/// not a general snooze.
#[instrument(skip(state))]
pub async fn postpone_all(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<BulkActionResponse>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let target = services::bulk_target_date(BulkAction::Postpone, today);
    let response = bulk_set_water_date(&state, user_id, today, target).await?;
    info!(user_id = %user_id, updated = response.updated, "postponed all due plants");
    Ok(Json(response))
}

/// One update per due plant, all carrying the same `target` date. A failed
/// or concurrently-deleted plant is skipped, never aborting the rest of the
/// batch; the caller learns the final count.
async fn bulk_set_water_date(
    state: &AppState,
    user_id: Uuid,
    today: Date,
    target: Date,
) -> Result<BulkActionResponse, ApiError> {
    let plants = repo::list_by_user(&state.db, user_id).await?;
    let due = services::due_for_watering(&plants, today);

    let mut updated = Vec::with_capacity(due.len());
    for plant_id in due {
        match repo::set_care_date(&state.db, plant_id, user_id, CareKind::Water, target).await {
            Ok(Some(plant)) => updated.push(plant),
            Ok(None) => {
                warn!(user_id = %user_id, plant_id = %plant_id, "plant vanished during bulk update")
            }
            Err(e) => {
                warn!(error = %e, user_id = %user_id, plant_id = %plant_id, "bulk update failed for plant")
            }
        }
    }

    Ok(BulkActionResponse {
        updated: updated.len(),
        plants: updated.into_iter().map(Into::into).collect(),
    })
}
