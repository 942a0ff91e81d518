use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest,
            UpdateSettingsRequest,
        },
        repo::{self, User},
        services::{
            hash_password, is_valid_email, is_valid_notification_time, verify_password, AuthUser,
            JwtKeys,
        },
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).put(update_me))
}

fn public(user: User) -> PublicUser {
    PublicUser {
        id: user.id,
        email: user.email,
        notification_time: user.notification_time,
    }
}

fn token_pair(state: &AppState, user: &User) -> Result<(String, String), ApiError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id).map_err(|e| {
        error!(error = %e, "jwt sign access failed");
        ApiError::Internal(e)
    })?;
    let refresh_token = keys.sign_refresh(user.id).map_err(|e| {
        error!(error = %e, "jwt sign refresh failed");
        ApiError::Internal(e)
    })?;
    Ok((access_token, refresh_token))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }
    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(ApiError::validation("Password too short"));
    }

    if repo::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::validation("Email already registered"));
    }

    let hash = hash_password(&payload.password)?;
    let user = repo::create(&state.db, &payload.email, &hash).await?;
    let (access_token, refresh_token) = token_pair(&state, &user)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: public(user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    let user = repo::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::unauthorized("Invalid credentials")
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let (access_token, refresh_token) = token_pair(&state, &user)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: public(user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    let user = repo::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    let (access_token, refresh_token) = token_pair(&state, &user)?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: public(user),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = repo::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;
    Ok(Json(public(user)))
}

#[instrument(skip(state, payload))]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    if !is_valid_notification_time(&payload.notification_time) {
        return Err(ApiError::validation(
            "notification_time must be HH:MM (24-hour)",
        ));
    }
    let user = repo::set_notification_time(&state.db, user_id, &payload.notification_time)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    info!(user_id = %user.id, notification_time = %user.notification_time, "settings updated");
    Ok(Json(public(user)))
}
