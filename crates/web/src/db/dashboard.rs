//! Aggregate queries for the dashboard.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crm_core::Scope;

use super::activities::ACTIVITY_COLUMNS;
use super::{DashboardStore, RepositoryError};
use crate::models::Activity;

/// Repository for dashboard aggregates.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    async fn count_scoped(&self, table: &str, scope: Scope) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM crm.{table} WHERE ($1::int IS NULL OR assigned_to = $1)"
        ))
        .bind(scope.assignee())
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}

impl DashboardStore for DashboardRepository<'_> {
    async fn count_companies(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crm.companies")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    async fn count_contacts(&self, scope: Scope) -> Result<i64, RepositoryError> {
        self.count_scoped("contacts", scope).await
    }

    async fn count_leads(&self, scope: Scope) -> Result<i64, RepositoryError> {
        self.count_scoped("leads", scope).await
    }

    async fn count_deals(&self, scope: Scope) -> Result<i64, RepositoryError> {
        self.count_scoped("deals", scope).await
    }

    async fn recent_activities(
        &self,
        scope: Scope,
        limit: i64,
    ) -> Result<Vec<Activity>, RepositoryError> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            r"
            SELECT {ACTIVITY_COLUMNS} FROM crm.activities
            WHERE ($1::int IS NULL OR assigned_to = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "
        ))
        .bind(scope.assignee())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(activities)
    }

    async fn upcoming_activities(
        &self,
        scope: Scope,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Activity>, RepositoryError> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            r"
            SELECT {ACTIVITY_COLUMNS} FROM crm.activities
            WHERE ($1::int IS NULL OR assigned_to = $1) AND due_date >= $2
            ORDER BY due_date, id
            LIMIT $3
            "
        ))
        .bind(scope.assignee())
        .bind(now)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(activities)
    }

    async fn total_pipeline_value(&self) -> Result<Decimal, RepositoryError> {
        let total: Decimal = sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM crm.deals")
            .fetch_one(self.pool)
            .await?;

        Ok(total)
    }

    async fn count_won_deals(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crm.deals WHERE stage = 'won'")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}
