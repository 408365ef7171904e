//! Application state shared across handlers.
//!
//! Storage handles are initialized exactly once at startup and threaded
//! through here - there is no module-level singleton, so use-before-init
//! and double-init are unrepresentable.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AdminConfig;
use crate::services::auth::AuthService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: SqlitePool,
}

impl AppState {
    /// Create the application state.
    #[must_use]
    pub fn new(config: AdminConfig, pool: SqlitePool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// Returns the application configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Returns the database pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Returns an authentication service over this state's pool and config.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.pool(), &self.config().auth)
    }
}
