//! Company repository.

use sqlx::PgPool;

use crm_core::{CompanyId, Scope};

use super::{EntityStore, RepositoryError};
use crate::models::{Company, CompanyInput};

const COMPANY_COLUMNS: &str =
    "id, name, industry, website, phone, address, created_at, updated_at";

/// Repository for company database operations.
pub struct CompanyRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompanyRepository<'a> {
    /// Create a new company repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl EntityStore<Company> for CompanyRepository<'_> {
    async fn list(&self, _scope: Scope) -> Result<Vec<Company>, RepositoryError> {
        let companies = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM crm.companies ORDER BY name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(companies)
    }

    async fn get(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError> {
        let company = sqlx::query_as::<_, Company>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM crm.companies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(company)
    }

    async fn create(&self, input: &CompanyInput, (): ()) -> Result<Company, RepositoryError> {
        let company = sqlx::query_as::<_, Company>(&format!(
            r"
            INSERT INTO crm.companies (name, industry, website, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMPANY_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(&input.industry)
        .bind(&input.website)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(self.pool)
        .await?;

        Ok(company)
    }

    async fn update(&self, id: CompanyId, input: &CompanyInput) -> Result<Company, RepositoryError> {
        let company = sqlx::query_as::<_, Company>(&format!(
            r"
            UPDATE crm.companies
            SET name = $2, industry = $3, website = $4, phone = $5, address = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COMPANY_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.industry)
        .bind(&input.website)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(company)
    }

    async fn delete(&self, id: CompanyId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM crm.companies WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
