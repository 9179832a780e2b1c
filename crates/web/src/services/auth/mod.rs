//! Authentication service.
//!
//! Username and password login against argon2id hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::db::UserStore;
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length, matching the column definition.
pub const MAX_USERNAME_LENGTH: usize = 150;

/// Authentication service.
pub struct AuthService<'a, S> {
    users: &'a S,
}

impl<'a, S: UserStore> AuthService<'a, S> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a S) -> Self {
        Self { users }
    }

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or
    /// the password does not match.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let (user, password_hash) = self
            .users
            .find_credentials(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }
}

/// Validate a username for account creation.
///
/// # Errors
///
/// Returns `AuthError::InvalidUsername` if the username is blank, too long or
/// contains whitespace.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::InvalidUsername("username cannot be empty".to_string()));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidUsername(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if username.chars().any(char::is_whitespace) {
        return Err(AuthError::InvalidUsername(
            "username cannot contain whitespace".to_string(),
        ));
    }
    Ok(())
}

/// Validate a password for account creation.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("battery staple", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_and_username_rules() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long enough").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("two words").is_err());
        assert!(validate_username("rep.one").is_ok());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = MemoryStore::new();
        let hash = hash_password("pipeline-2026").unwrap();
        let created = store.add_user("dana", None, &hash, false).unwrap();
        let auth = AuthService::new(&store);

        let user = auth.authenticate("dana", "pipeline-2026").await.unwrap();
        assert_eq!(user.id, created.id);

        assert!(matches!(
            auth.authenticate("dana", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.authenticate("nobody", "pipeline-2026").await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
