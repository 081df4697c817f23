use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, MeResponse, RegisterRequest, UpdatePasswordRequest},
        extractors::{CurrentUser, MaybeUser},
        services,
    },
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/update-password", put(update_password))
        .route("/auth/logout", post(logout))
}

#[instrument(skip(state, actor, payload))]
pub async fn register(
    State(state): State<AppState>,
    MaybeUser(actor): MaybeUser,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let (user, token) = services::register(&state, payload, actor.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, token) = services::login(&state, &payload.email, &payload.password).await?;
    Ok(Json(AuthResponse { user, token }))
}

#[instrument(skip(state, user))]
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MeResponse>, ApiError> {
    let user = services::get_me(&state, user.id).await?;
    Ok(Json(MeResponse { user }))
}

#[instrument(skip(state, user, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.new_password != payload.confirm_password {
        return Err(ApiError::Validation(
            "Password confirmation does not match".into(),
        ));
    }

    let (user, token) = services::update_password(
        &state,
        &user,
        &payload.current_password,
        &payload.new_password,
    )
    .await?;
    Ok(Json(AuthResponse { user, token }))
}

/// Stateless: nothing to tear down server-side. The token stays valid
/// until its embedded expiry.
#[instrument(skip(user))]
pub async fn logout(CurrentUser(user): CurrentUser) -> Json<serde_json::Value> {
    info!(user_id = %user.id, "user logged out");
    Json(serde_json::Value::Null)
}
