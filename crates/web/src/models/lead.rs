//! Leads: prospects that have not turned into deals yet.

use chrono::{DateTime, Utc};

use crm_core::{Email, LeadId, LeadStatus, Owned, UserId};

use super::Record;

/// A lead (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    /// Where the lead came from (referral, trade show, ...).
    pub source: Option<String>,
    pub status: LeadStatus,
    pub notes: Option<String>,
    pub assigned_to: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated lead fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadInput {
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub status: LeadStatus,
    pub notes: Option<String>,
}

impl Owned for Lead {
    fn assigned_to(&self) -> UserId {
        self.assigned_to
    }
}

impl Record for Lead {
    type Id = LeadId;
    type Input = LeadInput;
    type Owner = UserId;

    const KIND: &'static str = "lead";

    fn id(&self) -> LeadId {
        self.id
    }

    fn build(id: LeadId, input: LeadInput, owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            source: input.source,
            status: input.status,
            notes: input.notes,
            assigned_to: owner,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: LeadInput, now: DateTime<Utc>) {
        self.name = input.name;
        self.email = input.email;
        self.phone = input.phone;
        self.source = input.source;
        self.status = input.status;
        self.notes = input.notes;
        self.updated_at = now;
    }
}
