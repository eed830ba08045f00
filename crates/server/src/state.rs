//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Database;
use crate::services::mailer::Mailer;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration, the persistence
/// handle, and the notification sender. Handlers receive everything through
/// this handle - there is no global mutable state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    db: Database,
    mailer: Mailer,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AppConfig, db: Database) -> Self {
        let mailer = Mailer::new(&config.mail);
        Self {
            inner: Arc::new(AppStateInner { config, db, mailer }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the persistence handle.
    #[must_use]
    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// Get a reference to the notification sender.
    #[must_use]
    pub fn mailer(&self) -> &Mailer {
        &self.inner.mailer
    }
}
