//! Companies: shared reference data with no owner.

use chrono::{DateTime, Utc};

use crm_core::CompanyId;

use super::Record;

/// A company (domain type).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated company fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyInput {
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl Record for Company {
    type Id = CompanyId;
    type Input = CompanyInput;
    type Owner = ();

    const KIND: &'static str = "company";

    fn id(&self) -> CompanyId {
        self.id
    }

    fn build(id: CompanyId, input: CompanyInput, (): (), now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            industry: input.industry,
            website: input.website,
            phone: input.phone,
            address: input.address,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: CompanyInput, now: DateTime<Utc>) {
        self.name = input.name;
        self.industry = input.industry;
        self.website = input.website;
        self.phone = input.phone;
        self.address = input.address;
        self.updated_at = now;
    }
}
