use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::{
    auth::services::AuthUser,
    error::ApiError,
    push::{dto::SubscribeRequest, repo},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/push/subscribe", post(subscribe).delete(unsubscribe))
        .route("/push/test", post(send_test))
}

#[instrument(skip(state, payload))]
pub async fn subscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SubscribeRequest>,
) -> Result<StatusCode, ApiError> {
    if payload.endpoint.trim().is_empty() {
        return Err(ApiError::validation("endpoint is required"));
    }
    if payload.keys.p256dh.trim().is_empty() || payload.keys.auth.trim().is_empty() {
        return Err(ApiError::validation("subscription keys are required"));
    }

    repo::replace_for_user(
        &state.db,
        user_id,
        &payload.endpoint,
        &payload.keys.p256dh,
        &payload.keys.auth,
    )
    .await?;
    info!(user_id = %user_id, "push subscription registered");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, ApiError> {
    repo::delete_for_user(&state.db, user_id).await?;
    info!(user_id = %user_id, "push subscription removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Delivers a fixed diagnostic payload to the caller's own subscription.
#[instrument(skip(state))]
pub async fn send_test(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<StatusCode, ApiError> {
    let sub = repo::find_by_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("push subscription"))?;

    let payload = json!({
        "title": "Plantling",
        "body": "Push notifications are working!",
    })
    .to_string();

    match state.push.deliver(&sub, &payload).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) if e.is_permanent() => {
            warn!(user_id = %user_id, error = %e, "test push hit a gone endpoint, pruning");
            repo::delete_endpoint(&state.db, user_id, &sub.endpoint).await?;
            Err(ApiError::NotFound("push subscription"))
        }
        Err(e) => Err(ApiError::Internal(anyhow::anyhow!(e))),
    }
}
