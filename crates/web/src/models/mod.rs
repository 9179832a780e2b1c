//! Domain models for the CRM.
//!
//! Handlers and services work with these validated types; the `db` module
//! converts database rows into them.

pub mod activity;
pub mod company;
pub mod contact;
pub mod deal;
pub mod lead;
pub mod session;
pub mod user;

use chrono::{DateTime, Utc};

pub use activity::{Activity, ActivityInput};
pub use company::{Company, CompanyInput};
pub use contact::{Contact, ContactInput};
pub use deal::{Deal, DealInput};
pub use lead::{Lead, LeadInput};
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;

/// A record type managed through the list/detail/create/edit/delete screens.
///
/// `Owner` is `UserId` for assignable records and `()` for companies.
pub trait Record: Clone + Send + Sync + 'static {
    /// Typed primary key.
    type Id: Copy + Eq + Ord + Send + Sync + std::fmt::Display + std::fmt::Debug + From<i32>;
    /// Validated form payload used for create and edit.
    type Input: Clone + Send + Sync;
    /// Who the record is assigned to on creation.
    type Owner: Copy + Send + Sync;

    /// Singular name used in log fields.
    const KIND: &'static str;

    /// The record's id.
    fn id(&self) -> Self::Id;

    /// Build a fresh record from validated input.
    fn build(id: Self::Id, input: Self::Input, owner: Self::Owner, now: DateTime<Utc>) -> Self;

    /// Overwrite the editable fields, leaving assignment and timestamps of
    /// creation untouched.
    fn apply(&mut self, input: Self::Input, now: DateTime<Utc>);
}

/// Trim a free-text form field, treating blank input as absent.
#[must_use]
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  "), None);
        assert_eq!(non_blank(" Acme "), Some("Acme".to_string()));
    }
}
