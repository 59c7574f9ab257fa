//! Password handling for storefront accounts.
//!
//! Passwords are stored as Argon2id PHC strings. Account state itself lives in
//! [`crate::stores::AuthStore`].

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// # Errors
///
/// `AuthError::WeakPassword` when `password` has fewer than
/// [`MIN_PASSWORD_LENGTH`] characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() >= MIN_PASSWORD_LENGTH {
        return Ok(());
    }
    Err(AuthError::WeakPassword(format!(
        "Password must be at least {MIN_PASSWORD_LENGTH} characters long."
    )))
}

/// Argon2id PHC string for `password`, with a fresh salt.
///
/// # Errors
///
/// `AuthError::PasswordHash` if Argon2 rejects its inputs.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(password.as_bytes(), &salt) {
        Ok(phc) => Ok(phc.to_string()),
        Err(_) => Err(AuthError::PasswordHash),
    }
}

/// # Errors
///
/// `AuthError::InvalidCredentials` when the password does not match or the
/// stored hash cannot be read. Both look the same to the caller.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let matches = PasswordHash::new(stored_hash).is_ok_and(|phc| {
        Argon2::default()
            .verify_password(password.as_bytes(), &phc)
            .is_ok()
    });
    if matches {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(validate_password("short"), Err(AuthError::WeakPassword(_))));
        assert!(validate_password("longenough").is_ok());
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("x", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
