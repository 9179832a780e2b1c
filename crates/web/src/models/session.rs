//! Session-stored identity.

use serde::{Deserialize, Serialize};

use crm_core::{Email, Principal, UserId};

/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Address used for activity notifications.
    pub email: Option<Email>,
    /// Whether the user sees every record.
    pub is_admin: bool,
}

impl CurrentUser {
    /// The acting principal for policy checks.
    #[must_use]
    pub const fn principal(&self) -> Principal {
        Principal::new(self.id, self.is_admin)
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
