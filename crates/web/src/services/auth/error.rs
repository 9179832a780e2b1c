//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown username.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// Username is empty or malformed.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] crm_core::EmailError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
