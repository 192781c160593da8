//! Business services for the marketplace backend.
//!
//! - [`auth`] - Registration, login, Google sign-in
//! - [`token`] - Session token issuing and verification
//! - [`google`] - Google ID-token verification client

pub mod auth;
pub mod google;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use google::{GoogleAuthError, GoogleIdentity, GoogleVerifier};
pub use token::{SessionClaims, TokenError, TokenService};
