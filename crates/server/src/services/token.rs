//! Session token issuing and verification.
//!
//! Sessions are stateless HS256 JWTs signed with a server-held secret:
//! nothing is persisted, and there is no server-side revocation — logout is
//! purely the client discarding its token, so a stolen token stays valid
//! until natural expiry. A deliberate, documented gap.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use tradepost_core::policy::Actor;
use tradepost_core::{Role, UserId};

use crate::models::User;

/// Session lifetime: one day, matching the original deployment.
const SESSION_TTL_HOURS: i64 = 24;

/// Errors from issuing or verifying session tokens.
///
/// Verification fails closed: malformed, expired, and bad-signature tokens
/// all land in `Invalid` without distinguishing detail for the caller.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Token could not be verified (malformed, expired, or bad signature).
    #[error("invalid or expired token")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    /// Verified payload does not carry a usable user id.
    #[error("token missing identity")]
    MissingIdentity,
}

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user id.
    pub sub: String,
    /// Display name, for denormalizing into comments.
    pub name: String,
    /// Account role at issue time.
    pub role: Role,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

impl SessionClaims {
    /// The verified caller identity for policy decisions.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::MissingIdentity`] if `sub` is not a valid id.
    pub fn actor(&self) -> Result<Actor, TokenError> {
        let id = UserId::parse(&self.sub).map_err(|_| TokenError::MissingIdentity)?;
        Ok(Actor::new(id, self.role))
    }
}

/// Issues and verifies session tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create a token service from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Issue a fresh token for a user.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id.to_string(),
            name: user.full_name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(SESSION_TTL_HOURS)).timestamp(),
        };

        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] for malformed, expired, or
    /// wrongly-signed tokens.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let data = jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tradepost_core::Email;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("kJ8#mN2$pQ5^rT9&wX3*zA6!bC4@dE7%"))
    }

    fn user(role: Role) -> User {
        User {
            id: UserId::new(),
            full_name: "Alice Example".to_owned(),
            email: Email::parse("alice@example.com").unwrap(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_then_verify_roundtrip() {
        let svc = service();
        let alice = user(Role::Admin);

        let token = svc.issue(&alice).unwrap();
        let claims = svc.verify(&token).unwrap();

        assert_eq!(claims.sub, alice.id.to_string());
        assert_eq!(claims.name, "Alice Example");
        assert_eq!(claims.role, Role::Admin);

        let actor = claims.actor().unwrap();
        assert_eq!(actor.id, alice.id);
        assert!(actor.role.is_admin());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let svc = service();
        assert!(matches!(
            svc.verify("not.a.token"),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(svc.verify(""), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = service().issue(&user(Role::User)).unwrap();
        let other = TokenService::new(&SecretString::from("zY7&vU4^tS1$qP8#oN5@mL2*kJ9!hG6%"));
        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let svc = service();
        // Hand-roll claims expired well past any default leeway.
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: UserId::new().to_string(),
            name: "Stale".to_owned(),
            role: Role::User,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token =
            jsonwebtoken::encode(&Header::default(), &claims, &svc.encoding).unwrap();

        assert!(matches!(svc.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_claims_without_identity_are_rejected() {
        let claims = SessionClaims {
            sub: "not-a-uuid".to_owned(),
            name: "Ghost".to_owned(),
            role: Role::User,
            iat: 0,
            exp: 0,
        };
        assert!(matches!(
            claims.actor(),
            Err(TokenError::MissingIdentity)
        ));
    }
}
