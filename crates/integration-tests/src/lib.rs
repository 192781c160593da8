//! Integration tests for Tradepost.
//!
//! # Test Categories
//!
//! - `authorization_flow` - The full pure seam: issue a session token,
//!   extract the actor, run it through the policy rule-set. No database.
//! - `marketplace_db` - End-to-end repository scenarios against a real
//!   `PostgreSQL`. These are `#[ignore]`d; run them with a database:
//!
//! ```bash
//! export TRADEPOST_TEST_DATABASE_URL=postgres://localhost/tradepost_test
//! cargo run -p tradepost-cli -- migrate
//! cargo test -p tradepost-integration-tests -- --ignored
//! ```

use secrecy::SecretString;
use sqlx::PgPool;

use tradepost_server::services::token::TokenService;

/// A token service signed with a throwaway test secret.
#[must_use]
pub fn test_token_service() -> TokenService {
    TokenService::new(&SecretString::from("t3$tOnly!kQ8#mN2^rW5&zX9*bV4@cJ7%"))
}

/// Connect to the test database.
///
/// # Panics
///
/// Panics if `TRADEPOST_TEST_DATABASE_URL` is unset or unreachable; the
/// database-backed tests are `#[ignore]`d so this only runs on demand.
#[allow(clippy::unwrap_used)]
pub async fn test_pool() -> PgPool {
    let url = std::env::var("TRADEPOST_TEST_DATABASE_URL")
        .expect("TRADEPOST_TEST_DATABASE_URL must point at a migrated test database");
    PgPool::connect(&url).await.unwrap()
}

/// A unique throwaway email for re-runnable tests.
#[must_use]
pub fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@tradepost.test", uuid::Uuid::new_v4())
}
