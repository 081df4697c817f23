use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::dto::RegisterRequest;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo_types::{NewUser, Role, User};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }
    Ok(())
}

/// Registration. The client-supplied role is honored only when the
/// deployment allows it or the caller is an authenticated admin; everyone
/// else registers as a plain user.
pub async fn register(
    state: &AppState,
    mut payload: RegisterRequest,
    actor: Option<&User>,
) -> Result<(User, String), ApiError> {
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

    // Pre-check; the unique index still decides races.
    if User::find_by_email_with_secret(&state.db, &payload.email)
        .await?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::EmailInUse);
    }

    let admin_actor = actor.is_some_and(|u| u.role == Role::Admin);
    let role = match payload.role {
        Some(requested) if state.config.registration_allow_role || admin_actor => requested,
        Some(requested) => {
            warn!(email = %payload.email, requested = %requested, "client role ignored");
            Role::User
        }
        None => Role::User,
    };

    let user = User::create(
        &state.db,
        NewUser {
            name,
            email: payload.email,
            password: payload.password,
            role,
            is_active: true,
        },
    )
    .await?;

    let token = JwtKeys::from_ref(state).sign(&user)?;

    info!(user_id = %user.id, email = %user.email, role = %user.role, "user registered");
    Ok((user, token))
}

/// Login. An unknown email and a wrong password are deliberately
/// indistinguishable; deactivation is only reported once the caller has
/// proven the password.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<(User, String), ApiError> {
    let email = email.trim().to_lowercase();

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(ApiError::Validation("Invalid email".into()));
    }

    let record = match User::find_by_email_with_secret(&state.db, &email).await? {
        Some(record) => record,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !record.verify_password(password)? {
        warn!(email = %email, user_id = %record.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    if !record.is_active {
        warn!(user_id = %record.id, "login on deactivated account");
        return Err(ApiError::AccountDeactivated);
    }

    let user = record.into_user();
    let token = JwtKeys::from_ref(state).sign(&user)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok((user, token))
}

/// Second resolution on top of the gate's: the record can vanish between
/// token issuance and use.
pub async fn get_me(state: &AppState, id: Uuid) -> Result<User, ApiError> {
    User::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)
}

/// Password change. Re-verifies the current secret, re-hashes the new one
/// and returns a fresh token. The previously issued token stays valid
/// until its own expiry; there is no revocation.
pub async fn update_password(
    state: &AppState,
    user: &User,
    current_password: &str,
    new_password: &str,
) -> Result<(User, String), ApiError> {
    validate_password(new_password)?;

    let record = User::find_by_email_with_secret(&state.db, &user.email)
        .await?
        .ok_or(ApiError::UserGone)?;

    if !record.verify_password(current_password)? {
        warn!(user_id = %user.id, "password change with wrong current password");
        return Err(ApiError::IncorrectPassword);
    }

    let updated = User::set_password(&state.db, user.id, new_password)
        .await?
        .ok_or(ApiError::UserGone)?;

    let token = JwtKeys::from_ref(state).sign(&updated)?;

    info!(user_id = %updated.id, "password updated");
    Ok((updated, token))
}
