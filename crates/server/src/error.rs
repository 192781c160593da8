//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that maps the error taxonomy
//! (validation / auth / permission / not-found / conflict / internal) onto
//! HTTP status codes with user-safe JSON bodies, capturing server errors to
//! Sentry before responding. All route handlers return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use tradepost_core::policy;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::google::GoogleAuthError;
use crate::services::token::TokenError;

/// Application-level error type for the marketplace backend.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or missing input (400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Missing, invalid, or expired credential (401).
    #[error("auth error: {0}")]
    Unauthorized(String),

    /// Authenticated but disallowed by role or ownership (403).
    #[error("permission error: {0}")]
    Forbidden(String),

    /// Resource absent (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Uniqueness violation, e.g. duplicate email (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Session token problem (401).
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Authentication service failure.
    #[error("auth service error: {0}")]
    Auth(#[from] AuthError),

    /// Google sign-in failure (401).
    #[error("google auth error: {0}")]
    Google(#[from] GoogleAuthError),

    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<policy::Denied> for AppError {
    fn from(denied: policy::Denied) -> Self {
        Self::Forbidden(denied.to_string())
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) | Self::Token(_) | Self::Google(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Auth(err) => match err {
                AuthError::MissingFields | AuthError::InvalidEmail(_) | AuthError::WeakPassword(_) => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::EmailTaken => StatusCode::CONFLICT,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Database(err) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// A message safe to hand to clients: never storage details, never
    /// stack traces.
    fn public_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Token(err) => err.to_string(),
            Self::Google(_) => "google sign-in failed".to_owned(),
            Self::Auth(err) => match err {
                AuthError::PasswordHash | AuthError::Repository(_) => {
                    "internal server error".to_owned()
                }
                other => other.to_string(),
            },
            Self::Database(err) => match err {
                RepositoryError::NotFound => "not found".to_owned(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    "internal server error".to_owned()
                }
            },
            Self::Internal(_) => "internal server error".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = Json(json!({ "message": self.public_message() }));
        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tradepost_core::policy::Denied;

    #[test]
    fn test_taxonomy_status_codes() {
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("no token provided".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("forbidden".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("product".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_error_mapping() {
        assert_eq!(
            AppError::Auth(AuthError::MissingFields).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Auth(AuthError::EmailTaken).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Auth(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Auth(AuthError::PasswordHash).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_policy_denials_are_forbidden() {
        assert_eq!(
            AppError::from(Denied::AdminOnly).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(Denied::NotOwner).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        assert_eq!(
            AppError::Database(RepositoryError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Database(RepositoryError::Conflict("dup".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database(RepositoryError::DataCorruption("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_are_not_leaked() {
        let err = AppError::Internal("connection pool exhausted at 10.0.0.3".into());
        assert_eq!(err.public_message(), "internal server error");

        let err = AppError::Database(RepositoryError::DataCorruption(
            "row 17 has invalid role".into(),
        ));
        assert_eq!(err.public_message(), "internal server error");
    }
}
