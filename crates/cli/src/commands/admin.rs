//! Account management commands.
//!
//! Roles are immutable through the HTTP API; `promote`/`demote` here are
//! the only way an account's role changes.

use tradepost_core::{Email, Role};
use tradepost_server::db::users::UserRepository;
use tradepost_server::services::AuthService;

use super::CliError;

/// Create a new account with a password (role `user`).
///
/// Goes through the same registration path as the HTTP API, so the
/// password is hashed identically.
///
/// # Errors
///
/// Returns `CliError` if validation fails or the email is taken.
pub async fn create_account(email: &str, name: &str, password: &str) -> Result<(), CliError> {
    let pool = super::connect().await?;

    let auth = AuthService::new(&pool);
    let user = auth.register(name, email, password).await?;

    tracing::info!(user_id = %user.id, email = %user.email, "account created");
    Ok(())
}

/// Change an account's role.
///
/// # Errors
///
/// Returns `CliError` if the email is invalid or no such account exists.
pub async fn set_role(email: &str, role: Role) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let pool = super::connect().await?;

    let users = UserRepository::new(&pool);
    let user = users.set_role(&email, role).await?;

    tracing::info!(user_id = %user.id, role = %user.role, "role updated");
    Ok(())
}
