//! Visibility and ownership rules.
//!
//! Contacts, leads, deals and activities each have exactly one assignee.
//! Administrators see and mutate everything; everyone else lists only their
//! own records and may delete or complete only their own records.
//!
//! Two deliberate asymmetries are kept as-is:
//!
//! - Detail views and full edits perform no ownership check, so any
//!   authenticated user who knows an id can view or edit the record.
//! - Companies have no owner: anyone may list, view, create and edit them,
//!   only administrators may delete them.
//!
//! A denied delete/complete is reported as [`Decision::Denied`] so callers can
//! log it, but the HTTP layer answers it exactly like a successful mutation.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// The acting user, passed explicitly into every policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The user's database ID.
    pub user_id: UserId,
    /// Whether the user bypasses ownership scoping.
    pub is_admin: bool,
}

impl Principal {
    /// Create a principal.
    #[must_use]
    pub const fn new(user_id: UserId, is_admin: bool) -> Self {
        Self { user_id, is_admin }
    }

    /// Which records of an assignable type this principal may list or count.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        if self.is_admin {
            Scope::All
        } else {
            Scope::AssignedTo(self.user_id)
        }
    }

    /// Delete and completion require admin rights or being the assignee.
    #[must_use]
    pub fn can_mutate<R: Owned + ?Sized>(&self, record: &R) -> bool {
        self.is_admin || record.assigned_to() == self.user_id
    }

    /// Outcome of a delete or completion attempt on `record`.
    #[must_use]
    pub fn decide<R: Owned + ?Sized>(&self, record: &R) -> Decision {
        Decision::from_allowed(self.can_mutate(record))
    }

    /// Only administrators may delete companies.
    #[must_use]
    pub const fn can_delete_company(&self) -> bool {
        self.is_admin
    }

    /// Outcome of a company delete attempt.
    #[must_use]
    pub const fn decide_company_delete(&self) -> Decision {
        Decision::from_allowed(self.can_delete_company())
    }
}

/// Row filter for list and count queries over assignable records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Every record.
    All,
    /// Only records assigned to this user.
    AssignedTo(UserId),
}

impl Scope {
    /// The assignee filter, or `None` for an unscoped query.
    ///
    /// Maps directly onto `WHERE ($1::int IS NULL OR assigned_to = $1)`.
    #[must_use]
    pub const fn assignee(self) -> Option<UserId> {
        match self {
            Self::All => None,
            Self::AssignedTo(user) => Some(user),
        }
    }

    /// Whether a record assigned to `owner` falls inside this scope.
    #[must_use]
    pub fn includes(self, owner: UserId) -> bool {
        match self {
            Self::All => true,
            Self::AssignedTo(user) => user == owner,
        }
    }

    /// Keep only the records inside this scope.
    pub fn filter<R: Owned>(self, records: impl IntoIterator<Item = R>) -> Vec<R> {
        records
            .into_iter()
            .filter(|r| self.includes(r.assigned_to()))
            .collect()
    }
}

/// A record with a single accountable user.
pub trait Owned {
    /// The assignee.
    fn assigned_to(&self) -> UserId;
}

impl Owned for UserId {
    fn assigned_to(&self) -> UserId {
        *self
    }
}

/// Result of a guarded mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Decision {
    /// The mutation was performed.
    Applied,
    /// The principal lacked permission; nothing changed.
    Denied,
}

impl Decision {
    const fn from_allowed(allowed: bool) -> Self {
        if allowed { Self::Applied } else { Self::Denied }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record {
        owner: UserId,
    }

    impl Owned for Record {
        fn assigned_to(&self) -> UserId {
            self.owner
        }
    }

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);
    const ROOT: UserId = UserId::new(99);

    fn records() -> Vec<Record> {
        vec![
            Record { owner: ALICE },
            Record { owner: BOB },
            Record { owner: ALICE },
            Record { owner: ROOT },
        ]
    }

    #[test]
    fn test_regular_user_lists_only_own_records() {
        let alice = Principal::new(ALICE, false);
        let listed = alice.scope().filter(records());
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|r| r.owner == ALICE));
    }

    #[test]
    fn test_admin_lists_everything() {
        let admin = Principal::new(ROOT, true);
        assert_eq!(admin.scope(), Scope::All);
        assert_eq!(admin.scope().filter(records()).len(), 4);
    }

    #[test]
    fn test_scope_assignee_filter() {
        assert_eq!(Scope::All.assignee(), None);
        assert_eq!(Scope::AssignedTo(BOB).assignee(), Some(BOB));
    }

    #[test]
    fn test_user_without_records_lists_nothing() {
        let carol = Principal::new(UserId::new(3), false);
        assert!(carol.scope().filter(records()).is_empty());
    }

    #[test]
    fn test_mutation_requires_owner_or_admin() {
        let alices = Record { owner: ALICE };
        assert_eq!(Principal::new(ALICE, false).decide(&alices), Decision::Applied);
        assert_eq!(Principal::new(ROOT, true).decide(&alices), Decision::Applied);
        assert_eq!(Principal::new(BOB, false).decide(&alices), Decision::Denied);
    }

    #[test]
    fn test_company_delete_is_admin_only() {
        assert!(Principal::new(ROOT, true).can_delete_company());
        assert_eq!(
            Principal::new(ALICE, false).decide_company_delete(),
            Decision::Denied
        );
    }
}
