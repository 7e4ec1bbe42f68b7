//! Application state management
//!
//! Shared state handed to every request handler. Built once at startup and
//! read-only afterwards; cloning is a handful of `Arc` increments.

use crate::auth::{JwtSecret, JwtService};
use crate::config::AppConfig;
use crate::repositories::{PgUserStore, UserStore};
use crate::services::AuthService;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Authentication core with its store and pre-computed JWT keys
    pub auth: AuthService,
}

impl AppState {
    /// Create state over any [`UserStore`]
    ///
    /// Derives the JWT keys from the configured secret; call once at startup.
    pub fn new(store: Arc<dyn UserStore>, config: AppConfig) -> Self {
        let secret = JwtSecret::from(config.jwt.secret.as_str());
        let jwt = JwtService::new(
            &secret,
            config.jwt.access_token_ttl_secs,
            config.jwt.refresh_token_ttl_secs,
        );

        Self {
            config: Arc::new(config),
            auth: AuthService::new(store, jwt),
        }
    }

    /// Create state backed by PostgreSQL
    pub fn with_postgres(db: PgPool, config: AppConfig) -> Self {
        Self::new(Arc::new(PgUserStore::new(db)), config)
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}
