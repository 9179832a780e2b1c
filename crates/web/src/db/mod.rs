//! Database operations for the CRM `PostgreSQL` schema.
//!
//! # Schema: `crm`
//!
//! ## Tables
//!
//! - `users` - Accounts with argon2 password hashes
//! - `companies` - Shared company records (no owner)
//! - `contacts`, `leads`, `deals`, `activities` - Records with one assignee
//! - `session` - tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p crm-cli -- migrate
//! ```
//!
//! # Store traits
//!
//! Services are written against [`EntityStore`], [`ActivityStore`],
//! [`DashboardStore`] and [`UserStore`]. The `PostgreSQL` repositories in this
//! module implement them for production; [`memory::MemoryStore`] implements
//! them for tests. Handlers go through [`Stores`], which picks one of the two.

pub mod activities;
pub mod companies;
pub mod contacts;
pub mod dashboard;
pub mod deals;
pub mod leads;
#[cfg(any(test, feature = "memory-store"))]
pub mod memory;
pub mod stores;
pub mod users;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use crm_core::{ActivityId, Scope, UserId};

use crate::models::{Activity, Record, User};

pub use activities::ActivityRepository;
pub use companies::CompanyRepository;
pub use contacts::ContactRepository;
pub use dashboard::DashboardRepository;
pub use deals::DealRepository;
pub use leads::LeadRepository;
pub use stores::Stores;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`].
pub(crate) fn map_unique_violation(err: sqlx::Error, what: &str) -> RepositoryError {
    let is_unique =
        matches!(&err, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
    if is_unique {
        RepositoryError::Conflict(format!("{what} already exists"))
    } else {
        RepositoryError::Database(err)
    }
}

/// CRUD storage for one record type.
pub trait EntityStore<R: Record>: Sync {
    /// Records inside `scope`, newest first. Stores for unowned records
    /// ignore the scope.
    fn list(&self, scope: Scope) -> impl Future<Output = Result<Vec<R>, RepositoryError>> + Send;

    /// Fetch one record.
    fn get(&self, id: R::Id) -> impl Future<Output = Result<Option<R>, RepositoryError>> + Send;

    /// Insert a record assigned to `owner`.
    fn create(
        &self,
        input: &R::Input,
        owner: R::Owner,
    ) -> impl Future<Output = Result<R, RepositoryError>> + Send;

    /// Overwrite the editable fields.
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist.
    fn update(
        &self,
        id: R::Id,
        input: &R::Input,
    ) -> impl Future<Output = Result<R, RepositoryError>> + Send;

    /// Delete a record. Deleting a missing record is not an error.
    fn delete(&self, id: R::Id) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// The completion transition for activities.
pub trait ActivityStore: EntityStore<Activity> {
    /// Set `status = completed` and `completed_at = at` in one write.
    ///
    /// Returns `RepositoryError::NotFound` if the activity does not exist.
    fn complete(
        &self,
        id: ActivityId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Activity, RepositoryError>> + Send;
}

/// Aggregate queries behind the dashboard.
pub trait DashboardStore: Sync {
    fn count_companies(&self) -> impl Future<Output = Result<i64, RepositoryError>> + Send;

    fn count_contacts(
        &self,
        scope: Scope,
    ) -> impl Future<Output = Result<i64, RepositoryError>> + Send;

    fn count_leads(&self, scope: Scope)
    -> impl Future<Output = Result<i64, RepositoryError>> + Send;

    fn count_deals(&self, scope: Scope)
    -> impl Future<Output = Result<i64, RepositoryError>> + Send;

    /// Newest activities by creation time.
    fn recent_activities(
        &self,
        scope: Scope,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Activity>, RepositoryError>> + Send;

    /// Activities due at or after `now`, soonest first.
    fn upcoming_activities(
        &self,
        scope: Scope,
        now: DateTime<Utc>,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Activity>, RepositoryError>> + Send;

    /// Sum of every deal amount, regardless of assignee.
    fn total_pipeline_value(&self)
    -> impl Future<Output = Result<Decimal, RepositoryError>> + Send;

    /// Number of won deals, regardless of assignee.
    fn count_won_deals(&self) -> impl Future<Output = Result<i64, RepositoryError>> + Send;
}

/// Account lookups needed by login and notifications.
pub trait UserStore: Sync {
    fn get_user(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// A user together with their password hash.
    fn find_credentials(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<(User, String)>, RepositoryError>> + Send;
}
