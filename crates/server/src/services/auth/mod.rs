//! Authentication service.
//!
//! Registration, password login, and Google sign-in with lazy account
//! provisioning. Session tokens themselves are minted by
//! [`crate::services::token::TokenService`]; this service only establishes
//! who the caller is.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use tradepost_core::{Email, Role};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::services::google::GoogleIdentity;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with name, email, and password.
    ///
    /// The stored credential is an Argon2id hash with a per-password random
    /// salt; the plaintext never reaches the repository.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` if any field is empty.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let full_name = full_name.trim();
        if full_name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(full_name, &email, Some(&password_hash), Role::User)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// Unknown email, wrong password, and external-identity accounts (which
    /// have no password) all fail with the same generic error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on any verification failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // A structurally invalid email cannot be registered, so it cannot
        // log in either; report it like any other bad credential.
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_hash = password_hash.ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Login with a verified Google identity, provisioning an account on
    /// first sight of the email.
    ///
    /// Auto-provisioned accounts store no password credential, so password
    /// login stays impossible for them; they must return via Google.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if a database operation fails.
    pub async fn login_with_google(&self, identity: &GoogleIdentity) -> Result<User, AuthError> {
        if let Some(user) = self.users.get_by_email(&identity.email).await? {
            return Ok(user);
        }

        let created = self
            .users
            .create(&identity.name, &identity.email, None, Role::User)
            .await;

        match created {
            Ok(user) => Ok(user),
            // Concurrent first login with the same email: the other request
            // won the insert, so use its row.
            Err(RepositoryError::Conflict(_)) => self
                .users
                .get_by_email(&identity.email)
                .await?
                .ok_or(AuthError::InvalidCredentials),
            Err(other) => Err(AuthError::Repository(other)),
        }
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
