//! User management commands.
//!
//! Accounts are created here rather than through the web UI.

use crm_core::Email;
use crm_web::db::{RepositoryError, UserRepository};
use crm_web::services::AuthError;
use crm_web::services::auth::{hash_password, validate_password, validate_username};
use thiserror::Error;

use super::{ConnectError, connect};

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] crm_core::EmailError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

/// Create a new user.
///
/// # Errors
///
/// Returns an error if the input is invalid, the username is taken or the
/// database operation fails.
pub async fn create(
    username: &str,
    email: Option<&str>,
    is_admin: bool,
    password: &str,
) -> Result<(), UserError> {
    let username = username.trim();
    validate_username(username)?;
    validate_password(password)?;
    let email = email.map(Email::parse).transpose()?;
    let password_hash = hash_password(password)?;

    let pool = connect().await?;
    let user = UserRepository::new(&pool)
        .create(username, email.as_ref(), &password_hash, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => UserError::UserExists(username.to_owned()),
            other => UserError::Repository(other),
        })?;

    tracing::info!("User created successfully!");
    tracing::info!("  ID: {}", user.id);
    tracing::info!("  Username: {}", user.username);
    tracing::info!(
        "  Email: {}",
        user.email.as_ref().map_or("(none)", Email::as_str)
    );
    tracing::info!("  Admin: {}", user.is_admin);

    Ok(())
}

/// Print every user.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn list() -> Result<(), UserError> {
    let pool = connect().await?;
    let users = UserRepository::new(&pool)
        .list()
        .await
        .map_err(UserError::Repository)?;

    tracing::info!("{} user(s)", users.len());
    for user in users {
        tracing::info!(
            "  {:>4}  {:<20} {:<30} {}",
            user.id,
            user.username,
            user.email.as_ref().map_or("-", Email::as_str),
            if user.is_admin { "admin" } else { "" }
        );
    }

    Ok(())
}
