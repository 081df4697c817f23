use std::convert::Infallible;
use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::repo_types::{Role, User};

/// Required-auth gate. Extracts the bearer token, verifies it, re-resolves
/// the user from the store (token claims may be stale) and checks the
/// account is still active. The resolved user is also attached to the
/// request extensions for downstream layers.
pub struct CurrentUser(pub User);

pub(crate) fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::NotAuthenticated)?;

    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .ok_or(ApiError::NotAuthenticated)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let claims = JwtKeys::from_ref(state).verify(token).map_err(|e| {
            // Unverified claims are diagnostics only, never an identity.
            let subject = crate::auth::jwt::decode_unverified(token).map(|c| c.sub);
            warn!(error = %e, subject = ?subject, "token verification failed");
            e
        })?;

        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| {
                warn!(user_id = %claims.sub, "token subject no longer exists");
                ApiError::UserGone
            })?;

        if !user.is_active {
            warn!(user_id = %user.id, "deactivated account presented a valid token");
            return Err(ApiError::AccountDeactivated);
        }

        parts.extensions.insert(user.clone());
        Ok(CurrentUser(user))
    }
}

/// A fixed set of roles allowed through a `Gated` extractor.
pub trait RoleSet {
    const ALLOWED: &'static [Role];
}

/// Admin only.
pub struct AdminOnly;
impl RoleSet for AdminOnly {
    const ALLOWED: &'static [Role] = &[Role::Admin];
}

/// Admin or moderator.
pub struct Staff;
impl RoleSet for Staff {
    const ALLOWED: &'static [Role] = &[Role::Admin, Role::Moderator];
}

/// Role gate. Runs the required-auth gate itself, so it cannot be composed
/// before authentication: misordering is unrepresentable, not a runtime 500.
pub struct Gated<S: RoleSet> {
    pub user: User,
    _allowed: PhantomData<S>,
}

#[async_trait]
impl<S> FromRequestParts<AppState> for Gated<S>
where
    S: RoleSet + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !S::ALLOWED.contains(&user.role) {
            warn!(user_id = %user.id, role = %user.role, "role not in allowed set");
            return Err(ApiError::Forbidden);
        }

        Ok(Gated {
            user,
            _allowed: PhantomData,
        })
    }
}

/// Optional-auth gate: same extraction and verification as `CurrentUser`,
/// but every failure collapses to `None` and the request proceeds.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state)
            .await
            .ok()
            .map(|current| current.0);
        Ok(MaybeUser(user))
    }
}
