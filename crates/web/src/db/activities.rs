//! Activity repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crm_core::{ActivityId, Scope, UserId};

use super::{ActivityStore, EntityStore, RepositoryError};
use crate::models::{Activity, ActivityInput};

pub(super) const ACTIVITY_COLUMNS: &str = "id, title, activity_type, description, due_date, \
                                           status, completed_at, assigned_to, created_at, \
                                           updated_at";

/// Repository for activity database operations.
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityRepository<'a> {
    /// Create a new activity repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl EntityStore<Activity> for ActivityRepository<'_> {
    async fn list(&self, scope: Scope) -> Result<Vec<Activity>, RepositoryError> {
        let activities = sqlx::query_as::<_, Activity>(&format!(
            r"
            SELECT {ACTIVITY_COLUMNS} FROM crm.activities
            WHERE ($1::int IS NULL OR assigned_to = $1)
            ORDER BY due_date, id
            "
        ))
        .bind(scope.assignee())
        .fetch_all(self.pool)
        .await?;

        Ok(activities)
    }

    async fn get(&self, id: ActivityId) -> Result<Option<Activity>, RepositoryError> {
        let activity = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM crm.activities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(activity)
    }

    async fn create(
        &self,
        input: &ActivityInput,
        owner: UserId,
    ) -> Result<Activity, RepositoryError> {
        let activity = sqlx::query_as::<_, Activity>(&format!(
            r"
            INSERT INTO crm.activities (title, activity_type, description, due_date, assigned_to)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ACTIVITY_COLUMNS}
            "
        ))
        .bind(&input.title)
        .bind(input.activity_type)
        .bind(&input.description)
        .bind(input.due_date)
        .bind(owner)
        .fetch_one(self.pool)
        .await?;

        Ok(activity)
    }

    async fn update(
        &self,
        id: ActivityId,
        input: &ActivityInput,
    ) -> Result<Activity, RepositoryError> {
        let activity = sqlx::query_as::<_, Activity>(&format!(
            r"
            UPDATE crm.activities
            SET title = $2, activity_type = $3, description = $4, due_date = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ACTIVITY_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.title)
        .bind(input.activity_type)
        .bind(&input.description)
        .bind(input.due_date)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(activity)
    }

    async fn delete(&self, id: ActivityId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM crm.activities WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

impl ActivityStore for ActivityRepository<'_> {
    async fn complete(
        &self,
        id: ActivityId,
        at: DateTime<Utc>,
    ) -> Result<Activity, RepositoryError> {
        let activity = sqlx::query_as::<_, Activity>(&format!(
            r"
            UPDATE crm.activities
            SET status = 'completed', completed_at = $2, updated_at = $2
            WHERE id = $1
            RETURNING {ACTIVITY_COLUMNS}
            "
        ))
        .bind(id)
        .bind(at)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(activity)
    }
}
