//! Contact repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crm_core::{CompanyId, ContactId, Email, Scope, UserId};

use super::{EntityStore, RepositoryError};
use crate::models::{Contact, ContactInput};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: i32,
    first_name: String,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    position: Option<String>,
    company_id: Option<i32>,
    assigned_to: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = RepositoryError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid contact email in database: {e}"))
            })?;

        Ok(Self {
            id: ContactId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email,
            phone: row.phone,
            position: row.position,
            company_id: row.company_id.map(CompanyId::new),
            assigned_to: UserId::new(row.assigned_to),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const CONTACT_COLUMNS: &str = "id, first_name, last_name, email, phone, position, company_id, \
                               assigned_to, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for contact database operations.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Contacts attached to a company, for the company detail page.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_for_company(
        &self,
        company_id: CompanyId,
        scope: Scope,
    ) -> Result<Vec<Contact>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactRow>(&format!(
            r"
            SELECT {CONTACT_COLUMNS} FROM crm.contacts
            WHERE company_id = $1 AND ($2::int IS NULL OR assigned_to = $2)
            ORDER BY first_name, last_name, id
            "
        ))
        .bind(company_id)
        .bind(scope.assignee())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Contact::try_from).collect()
    }
}

impl EntityStore<Contact> for ContactRepository<'_> {
    async fn list(&self, scope: Scope) -> Result<Vec<Contact>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactRow>(&format!(
            r"
            SELECT {CONTACT_COLUMNS} FROM crm.contacts
            WHERE ($1::int IS NULL OR assigned_to = $1)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(scope.assignee())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Contact::try_from).collect()
    }

    async fn get(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM crm.contacts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Contact::try_from).transpose()
    }

    async fn create(&self, input: &ContactInput, owner: UserId) -> Result<Contact, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            r"
            INSERT INTO crm.contacts
                (first_name, last_name, email, phone, position, company_id, assigned_to)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CONTACT_COLUMNS}
            "
        ))
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.email.as_ref().map(Email::as_str))
        .bind(&input.phone)
        .bind(&input.position)
        .bind(input.company_id)
        .bind(owner)
        .fetch_one(self.pool)
        .await?;

        Contact::try_from(row)
    }

    async fn update(&self, id: ContactId, input: &ContactInput) -> Result<Contact, RepositoryError> {
        let row = sqlx::query_as::<_, ContactRow>(&format!(
            r"
            UPDATE crm.contacts
            SET first_name = $2, last_name = $3, email = $4, phone = $5, position = $6,
                company_id = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING {CONTACT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.email.as_ref().map(Email::as_str))
        .bind(&input.phone)
        .bind(&input.position)
        .bind(input.company_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Contact::try_from(row)
    }

    async fn delete(&self, id: ContactId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM crm.contacts WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
