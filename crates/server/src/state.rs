//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::google::GoogleVerifier;
use crate::services::token::TokenService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and the token service.
///
/// Everything here is explicit configuration passed in at startup — there
/// are no ambient globals, so tests can construct a state with a fake
/// secret and their own pool.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    tokens: TokenService,
    google: Option<GoogleVerifier>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Google sign-in is enabled only when the config carries a client id.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let tokens = TokenService::new(&config.jwt_secret);
        let google = config
            .google_client_id
            .clone()
            .map(GoogleVerifier::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                google,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the session token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    /// Get the Google verifier, if Google sign-in is configured.
    #[must_use]
    pub fn google(&self) -> Option<&GoogleVerifier> {
        self.inner.google.as_ref()
    }
}
