//! Authentication route handlers.
//!
//! Registration and login return the same response shape: a fresh session
//! token plus the public user fields. The password hash never appears in
//! any response.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Google sign-in request body: the ID token obtained client-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub credential: String,
}

/// Session token plus public user fields.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /auth/register` - create a user, return a session token.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(&body.full_name, &body.email, &body.password)
        .await?;

    let token = state.tokens().issue(&user)?;
    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// `POST /auth/login` - verify credentials, return a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&body.email, &body.password).await?;

    let token = state.tokens().issue(&user)?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse { token, user }))
}

/// `POST /auth/google` - verify a Google ID token, return a session token.
///
/// Provisions an account on first sight of the email. Fails closed with
/// 401 when Google sign-in is not configured.
pub async fn google(
    State(state): State<AppState>,
    Json(body): Json<GoogleLoginRequest>,
) -> Result<Json<AuthResponse>> {
    let verifier = state
        .google()
        .ok_or_else(|| AppError::Unauthorized("google sign-in is not enabled".to_owned()))?;

    let identity = verifier.verify(&body.credential).await?;

    let auth = AuthService::new(state.pool());
    let user = auth.login_with_google(&identity).await?;

    let token = state.tokens().issue(&user)?;
    tracing::info!(user_id = %user.id, "user logged in via google");

    Ok(Json(AuthResponse { token, user }))
}
