//! Deal repository.

use sqlx::PgPool;

use crm_core::{CompanyId, DealId, Scope, UserId};

use super::{EntityStore, RepositoryError};
use crate::models::{Deal, DealInput};

const DEAL_COLUMNS: &str =
    "id, title, amount, stage, company_id, close_date, assigned_to, created_at, updated_at";

/// Repository for deal database operations.
pub struct DealRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DealRepository<'a> {
    /// Create a new deal repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Deals attached to a company, for the company detail page.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_company(
        &self,
        company_id: CompanyId,
        scope: Scope,
    ) -> Result<Vec<Deal>, RepositoryError> {
        let deals = sqlx::query_as::<_, Deal>(&format!(
            r"
            SELECT {DEAL_COLUMNS} FROM crm.deals
            WHERE company_id = $1 AND ($2::int IS NULL OR assigned_to = $2)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(company_id)
        .bind(scope.assignee())
        .fetch_all(self.pool)
        .await?;

        Ok(deals)
    }
}

impl EntityStore<Deal> for DealRepository<'_> {
    async fn list(&self, scope: Scope) -> Result<Vec<Deal>, RepositoryError> {
        let deals = sqlx::query_as::<_, Deal>(&format!(
            r"
            SELECT {DEAL_COLUMNS} FROM crm.deals
            WHERE ($1::int IS NULL OR assigned_to = $1)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(scope.assignee())
        .fetch_all(self.pool)
        .await?;

        Ok(deals)
    }

    async fn get(&self, id: DealId) -> Result<Option<Deal>, RepositoryError> {
        let deal = sqlx::query_as::<_, Deal>(&format!(
            "SELECT {DEAL_COLUMNS} FROM crm.deals WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(deal)
    }

    async fn create(&self, input: &DealInput, owner: UserId) -> Result<Deal, RepositoryError> {
        let deal = sqlx::query_as::<_, Deal>(&format!(
            r"
            INSERT INTO crm.deals (title, amount, stage, company_id, close_date, assigned_to)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {DEAL_COLUMNS}
            "
        ))
        .bind(&input.title)
        .bind(input.amount)
        .bind(input.stage)
        .bind(input.company_id)
        .bind(input.close_date)
        .bind(owner)
        .fetch_one(self.pool)
        .await?;

        Ok(deal)
    }

    async fn update(&self, id: DealId, input: &DealInput) -> Result<Deal, RepositoryError> {
        let deal = sqlx::query_as::<_, Deal>(&format!(
            r"
            UPDATE crm.deals
            SET title = $2, amount = $3, stage = $4, company_id = $5, close_date = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {DEAL_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.title)
        .bind(input.amount)
        .bind(input.stage)
        .bind(input.company_id)
        .bind(input.close_date)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(deal)
    }

    async fn delete(&self, id: DealId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM crm.deals WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
