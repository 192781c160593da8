//! Google ID-token verification.
//!
//! Tokens are checked against Google's `tokeninfo` endpoint, which
//! validates the signature and expiry on Google's side; the audience and
//! `email_verified` claims are checked here. Every failure is terminal for
//! the login attempt.

use serde::Deserialize;

use tradepost_core::{Email, EmailError};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Errors from Google ID-token verification.
#[derive(Debug, thiserror::Error)]
pub enum GoogleAuthError {
    /// The tokeninfo call itself failed.
    #[error("tokeninfo request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Google rejected the token (malformed, expired, or bad signature).
    #[error("google rejected the token")]
    Rejected,

    /// The token was issued for a different OAuth client.
    #[error("token audience mismatch")]
    AudienceMismatch,

    /// The Google account's email is missing or unverified.
    #[error("google account email not verified")]
    UnverifiedEmail,

    /// The email in the token is not structurally valid.
    #[error("invalid email in token: {0}")]
    InvalidEmail(#[from] EmailError),
}

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    pub email: Email,
    /// Display name; falls back to the email's local part when Google
    /// supplies none.
    pub name: String,
}

/// Response shape of the tokeninfo endpoint (all values are strings).
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    email: Option<String>,
    email_verified: Option<String>,
    name: Option<String>,
}

/// Verifies Google ID tokens for the configured OAuth client.
pub struct GoogleVerifier {
    http: reqwest::Client,
    client_id: String,
}

impl GoogleVerifier {
    /// Create a verifier scoped to one OAuth client id.
    #[must_use]
    pub fn new(client_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
        }
    }

    /// Verify an ID token and extract the asserted identity.
    ///
    /// # Errors
    ///
    /// Returns [`GoogleAuthError`] if Google rejects the token, the
    /// audience does not match this deployment, or the email is missing,
    /// unverified, or malformed.
    pub async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, GoogleAuthError> {
        let response = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GoogleAuthError::Rejected);
        }

        let info: TokenInfo = response.json().await?;

        if info.aud != self.client_id {
            return Err(GoogleAuthError::AudienceMismatch);
        }

        if info.email_verified.as_deref() != Some("true") {
            return Err(GoogleAuthError::UnverifiedEmail);
        }

        let email = Email::parse(
            info.email
                .as_deref()
                .ok_or(GoogleAuthError::UnverifiedEmail)?,
        )?;

        let name = info
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| local_part(&email).to_owned());

        Ok(GoogleIdentity { email, name })
    }
}

/// Everything before the @, used as a display-name fallback.
fn local_part(email: &Email) -> &str {
    email.as_str().split('@').next().unwrap_or("")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_local_part_fallback() {
        let email = Email::parse("jane.doe@example.com").unwrap();
        assert_eq!(local_part(&email), "jane.doe");
    }

    #[test]
    fn test_tokeninfo_deserializes_google_shape() {
        let info: TokenInfo = serde_json::from_str(
            r#"{
                "aud": "1234.apps.googleusercontent.com",
                "email": "jane@example.com",
                "email_verified": "true",
                "name": "Jane Doe",
                "exp": "1720000000",
                "sub": "10769150350006150715113082367"
            }"#,
        )
        .unwrap();

        assert_eq!(info.aud, "1234.apps.googleusercontent.com");
        assert_eq!(info.email_verified.as_deref(), Some("true"));
        assert_eq!(info.name.as_deref(), Some("Jane Doe"));
    }
}
