//! Contacts: people, optionally attached to a company.

use chrono::{DateTime, Utc};

use crm_core::{CompanyId, ContactId, Email, Owned, UserId};

use super::Record;

/// A contact (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub position: Option<String>,
    /// Cleared when the company is deleted.
    pub company_id: Option<CompanyId>,
    pub assigned_to: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// First and last name joined for display.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        }
    }
}

/// Validated contact fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactInput {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub company_id: Option<CompanyId>,
}

impl Owned for Contact {
    fn assigned_to(&self) -> UserId {
        self.assigned_to
    }
}

impl Record for Contact {
    type Id = ContactId;
    type Input = ContactInput;
    type Owner = UserId;

    const KIND: &'static str = "contact";

    fn id(&self) -> ContactId {
        self.id
    }

    fn build(id: ContactId, input: ContactInput, owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            position: input.position,
            company_id: input.company_id,
            assigned_to: owner,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: ContactInput, now: DateTime<Utc>) {
        self.first_name = input.first_name;
        self.last_name = input.last_name;
        self.email = input.email;
        self.phone = input.phone;
        self.position = input.position;
        self.company_id = input.company_id;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let mut contact = Contact::build(
            ContactId::new(1),
            ContactInput {
                first_name: "Ada".to_string(),
                last_name: Some("Lovelace".to_string()),
                email: None,
                phone: None,
                position: None,
                company_id: None,
            },
            UserId::new(1),
            Utc::now(),
        );
        assert_eq!(contact.full_name(), "Ada Lovelace");

        contact.last_name = None;
        assert_eq!(contact.full_name(), "Ada");
    }
}
