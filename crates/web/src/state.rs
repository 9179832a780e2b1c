//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::EmailConfig;
use crate::db::Stores;
use crate::services::EmailService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Stores,
    mailer: EmailService,
}

impl AppState {
    /// Create the production state over a `PostgreSQL` pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be configured.
    pub fn new(email: &EmailConfig, pool: PgPool) -> Result<Self, lettre::transport::smtp::Error> {
        Self::with_stores(email, Stores::Postgres(pool))
    }

    /// Create a state over any record store.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be configured.
    pub fn with_stores(
        email: &EmailConfig,
        stores: Stores,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let mailer = EmailService::new(email)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { stores, mailer }),
        })
    }

    /// The record store.
    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.inner.stores
    }

    /// Get a reference to the notification mailer.
    #[must_use]
    pub fn mailer(&self) -> &EmailService {
        &self.inner.mailer
    }
}
