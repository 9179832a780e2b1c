//! Lead repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crm_core::{Email, LeadId, LeadStatus, Scope, UserId};

use super::{EntityStore, RepositoryError};
use crate::models::{Lead, LeadInput};

#[derive(Debug, sqlx::FromRow)]
struct LeadRow {
    id: i32,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    source: Option<String>,
    status: LeadStatus,
    notes: Option<String>,
    assigned_to: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeadRow> for Lead {
    type Error = RepositoryError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid lead email in database: {e}"))
            })?;

        Ok(Self {
            id: LeadId::new(row.id),
            name: row.name,
            email,
            phone: row.phone,
            source: row.source,
            status: row.status,
            notes: row.notes,
            assigned_to: UserId::new(row.assigned_to),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const LEAD_COLUMNS: &str =
    "id, name, email, phone, source, status, notes, assigned_to, created_at, updated_at";

/// Repository for lead database operations.
pub struct LeadRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> LeadRepository<'a> {
    /// Create a new lead repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl EntityStore<Lead> for LeadRepository<'_> {
    async fn list(&self, scope: Scope) -> Result<Vec<Lead>, RepositoryError> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            r"
            SELECT {LEAD_COLUMNS} FROM crm.leads
            WHERE ($1::int IS NULL OR assigned_to = $1)
            ORDER BY created_at DESC, id DESC
            "
        ))
        .bind(scope.assignee())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Lead::try_from).collect()
    }

    async fn get(&self, id: LeadId) -> Result<Option<Lead>, RepositoryError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM crm.leads WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Lead::try_from).transpose()
    }

    async fn create(&self, input: &LeadInput, owner: UserId) -> Result<Lead, RepositoryError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            r"
            INSERT INTO crm.leads (name, email, phone, source, status, notes, assigned_to)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {LEAD_COLUMNS}
            "
        ))
        .bind(&input.name)
        .bind(input.email.as_ref().map(Email::as_str))
        .bind(&input.phone)
        .bind(&input.source)
        .bind(input.status)
        .bind(&input.notes)
        .bind(owner)
        .fetch_one(self.pool)
        .await?;

        Lead::try_from(row)
    }

    async fn update(&self, id: LeadId, input: &LeadInput) -> Result<Lead, RepositoryError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            r"
            UPDATE crm.leads
            SET name = $2, email = $3, phone = $4, source = $5, status = $6, notes = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {LEAD_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.email.as_ref().map(Email::as_str))
        .bind(&input.phone)
        .bind(&input.source)
        .bind(input.status)
        .bind(&input.notes)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Lead::try_from(row)
    }

    async fn delete(&self, id: LeadId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM crm.leads WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
