use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::{AdminOnly, Gated, Staff},
    auth::services::{is_valid_email, validate_password},
    error::ApiError,
    state::AppState,
    users::dto::{CreateUserRequest, ListParams, UpdateUserRequest, UserListResponse},
    users::repo_types::{NewUser, Role, User, UserChanges},
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id", put(update_user))
        .route("/users/:id", delete(delete_user))
}

#[instrument(skip(state, _gate))]
pub async fn list_users(
    State(state): State<AppState>,
    _gate: Gated<Staff>,
    Query(params): Query<ListParams>,
) -> Result<Json<UserListResponse>, ApiError> {
    let limit = params.limit.clamp(1, 100);
    let offset = params.offset.max(0);

    let users = User::list(&state.db, limit, offset).await?;
    let total = User::count(&state.db).await?;

    Ok(Json(UserListResponse { users, total }))
}

#[instrument(skip(state, _gate))]
pub async fn get_user(
    State(state): State<AppState>,
    _gate: Gated<Staff>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(user))
}

#[instrument(skip(state, gate, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    gate: Gated<AdminOnly>,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    let name = payload.name.trim().to_string();

    if name.is_empty() {
        return Err(ApiError::Validation("Name is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }
    validate_password(&payload.password)?;

    let user = User::create(
        &state.db,
        NewUser {
            name,
            email: payload.email,
            password: payload.password,
            role: payload.role.unwrap_or(Role::User),
            is_active: payload.is_active,
        },
    )
    .await?;

    info!(user_id = %user.id, actor = %gate.user.id, "user created by admin");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, gate, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    gate: Gated<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let email = match payload.email {
        Some(raw) => {
            let email = raw.trim().to_lowercase();
            if !is_valid_email(&email) {
                warn!(email = %email, "invalid email");
                return Err(ApiError::Validation("Invalid email".into()));
            }
            Some(email)
        }
        None => None,
    };

    let user = User::update(
        &state.db,
        id,
        UserChanges {
            name: payload.name,
            email,
            role: payload.role,
            is_active: payload.is_active,
        },
    )
    .await?
    .ok_or(ApiError::NotFound)?;

    info!(user_id = %user.id, actor = %gate.user.id, "user updated by admin");
    Ok(Json(user))
}

#[instrument(skip(state, gate))]
pub async fn delete_user(
    State(state): State<AppState>,
    gate: Gated<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    let user = User::delete(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(user_id = %user.id, actor = %gate.user.id, "user deleted by admin");
    Ok(Json(user))
}
