use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    care::CareKind,
    error::ApiError,
    plants::{
        dto::{CreatePlantRequest, PlantResponse, UpdatePlantRequest},
        repo,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plants", get(list_plants).post(create_plant))
        .route("/plants/:id", patch(update_plant).delete(delete_plant))
        .route("/plants/:id/care/:kind", post(record_care))
}

// A decade between waterings is already absurd; anything past these caps is
// a client bug, not a cadence.
const MAX_FREQUENCY_DAYS: i32 = 3650;
const MAX_FREQUENCY_MONTHS: i32 = 1200;

fn check_frequency(name: &'static str, value: Option<i32>, max: i32) -> Result<(), ApiError> {
    match value {
        Some(v) if v < 1 => Err(ApiError::validation(format!("{name} must be at least 1"))),
        Some(v) if v > max => Err(ApiError::validation(format!("{name} must be at most {max}"))),
        _ => Ok(()),
    }
}

#[instrument(skip(state))]
pub async fn list_plants(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<PlantResponse>>, ApiError> {
    let plants = repo::list_by_user(&state.db, user_id).await?;
    Ok(Json(plants.into_iter().map(PlantResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_plant(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreatePlantRequest>,
) -> Result<(StatusCode, Json<PlantResponse>), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("name is required"));
    }
    check_frequency(
        "watering_frequency_days",
        Some(payload.watering_frequency_days),
        MAX_FREQUENCY_DAYS,
    )?;
    check_frequency(
        "fertilizing_frequency_days",
        payload.fertilizing_frequency_days,
        MAX_FREQUENCY_DAYS,
    )?;
    check_frequency(
        "repotting_frequency_months",
        payload.repotting_frequency_months,
        MAX_FREQUENCY_MONTHS,
    )?;
    check_frequency(
        "pruning_frequency_months",
        payload.pruning_frequency_months,
        MAX_FREQUENCY_MONTHS,
    )?;

    let plant = repo::create(&state.db, user_id, payload.into()).await?;
    info!(user_id = %user_id, plant_id = %plant.id, name = %plant.name, "plant created");
    Ok((StatusCode::CREATED, Json(plant.into())))
}

#[instrument(skip(state, payload))]
pub async fn update_plant(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePlantRequest>,
) -> Result<Json<PlantResponse>, ApiError> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(ApiError::validation("name must not be empty"));
        }
    }
    check_frequency(
        "watering_frequency_days",
        payload.watering_frequency_days,
        MAX_FREQUENCY_DAYS,
    )?;
    check_frequency(
        "fertilizing_frequency_days",
        payload.fertilizing_frequency_days,
        MAX_FREQUENCY_DAYS,
    )?;
    check_frequency(
        "repotting_frequency_months",
        payload.repotting_frequency_months,
        MAX_FREQUENCY_MONTHS,
    )?;
    check_frequency(
        "pruning_frequency_months",
        payload.pruning_frequency_months,
        MAX_FREQUENCY_MONTHS,
    )?;

    let plant = repo::update_partial(&state.db, id, user_id, payload.into())
        .await?
        .ok_or(ApiError::NotFound("plant"))?;
    Ok(Json(plant.into()))
}

#[instrument(skip(state))]
pub async fn delete_plant(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !repo::delete(&state.db, id, user_id).await? {
        return Err(ApiError::NotFound("plant"));
    }
    info!(user_id = %user_id, plant_id = %id, "plant deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Marks one care action as done today: only that track's last date moves.
#[instrument(skip(state))]
pub async fn record_care(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, kind)): Path<(Uuid, CareKind)>,
) -> Result<Json<PlantResponse>, ApiError> {
    let today = OffsetDateTime::now_utc().date();
    let plant = repo::set_care_date(&state.db, id, user_id, kind, today)
        .await?
        .ok_or(ApiError::NotFound("plant"))?;
    info!(user_id = %user_id, plant_id = %id, kind = ?kind, "care recorded");
    Ok(Json(plant.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_must_be_positive_and_bounded() {
        assert!(check_frequency("watering_frequency_days", Some(1), MAX_FREQUENCY_DAYS).is_ok());
        assert!(check_frequency("watering_frequency_days", None, MAX_FREQUENCY_DAYS).is_ok());
        assert!(check_frequency("watering_frequency_days", Some(0), MAX_FREQUENCY_DAYS).is_err());
        assert!(check_frequency("watering_frequency_days", Some(-3), MAX_FREQUENCY_DAYS).is_err());
        assert!(
            check_frequency("watering_frequency_days", Some(i32::MAX), MAX_FREQUENCY_DAYS)
                .is_err()
        );
        assert!(check_frequency(
            "repotting_frequency_months",
            Some(1_200_000),
            MAX_FREQUENCY_MONTHS
        )
        .is_err());
    }
}
