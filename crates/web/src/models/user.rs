//! CRM user accounts.

use chrono::{DateTime, Utc};

use crm_core::{Email, Principal, UserId};

use super::CurrentUser;

/// A user account (domain type). The password hash stays in the `db` layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<Email>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub const fn principal(&self) -> Principal {
        Principal::new(self.id, self.is_admin)
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}
