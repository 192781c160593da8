//! Authentication extractors.
//!
//! Bearer tokens travel in the `Authorization` header. Extraction fails
//! closed: a missing header, a malformed header, a bad signature, an
//! expired token, or a payload without a usable identity all reject the
//! request with 401 before the handler runs.

use axum::{extract::FromRequestParts, http::request::Parts};

use tradepost_core::Role;
use tradepost_core::policy::Actor;
use tradepost_core::types::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// The verified caller, as established from the session token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    /// Display name carried in the token, denormalized into comments.
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    /// The caller's identity for policy decisions.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Extractor that requires a valid session token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     AuthUser(user): AuthUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct AuthUser(pub CurrentUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user = verify(state, token)?;
        Ok(Self(user))
    }
}

/// Extractor that accepts but does not require a session token.
///
/// A present-but-invalid token is still rejected with 401; only a missing
/// `Authorization` header counts as anonymous.
pub struct OptionalUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.get(axum::http::header::AUTHORIZATION).is_none() {
            return Ok(Self(None));
        }

        let token = bearer_token(parts)?;
        let user = verify(state, token)?;
        Ok(Self(Some(user)))
    }
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("no token provided".to_owned()))?;

    let header = header
        .to_str()
        .map_err(|_| AppError::Unauthorized("invalid token format".to_owned()))?;

    header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("invalid token format".to_owned()))
}

/// Verify the token and build the caller identity.
fn verify(state: &AppState, token: &str) -> Result<CurrentUser, AppError> {
    let claims = state.tokens().verify(token)?;
    let actor = claims.actor()?;

    Ok(CurrentUser {
        id: actor.id,
        name: claims.name,
        role: actor.role,
    })
}
