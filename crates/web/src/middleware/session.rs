//! Session middleware configuration.
//!
//! `PostgreSQL`-backed sessions via tower-sessions, SameSite=Lax with a
//! 24 hour inactivity expiry.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::CrmConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "crm_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Schema holding the session table.
pub const SESSION_SCHEMA: &str = "crm";

/// Session table name.
pub const SESSION_TABLE: &str = "session";

/// Build the `PostgreSQL` session store.
///
/// The table is created by the `crm` migrations.
///
/// # Errors
///
/// Returns an error if the schema or table name is rejected by the store.
pub fn create_session_store(pool: &PgPool) -> Result<PostgresStore, sqlx::Error> {
    PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .map_err(|e| sqlx::Error::Configuration(e.into()))?
        .with_table_name(SESSION_TABLE)
        .map_err(|e| sqlx::Error::Configuration(e.into()))
}

/// Wrap any session store in the CRM cookie settings.
#[must_use]
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &CrmConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
