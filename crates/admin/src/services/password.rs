//! Password hashing.
//!
//! Argon2 with a fresh random salt per call: hashing the same input twice
//! yields different digests, and both verify. Plaintext passwords travel as
//! `SecretString` and never reach a log line or response body.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Errors from hashing or verifying a password.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Hashing failed.
    #[error("failed to hash password: {0}")]
    Hash(String),
    /// The stored digest could not be parsed.
    #[error("invalid password digest: {0}")]
    InvalidDigest(String),
}

/// Hash a plaintext password into a salted argon2 digest.
///
/// # Errors
///
/// Returns [`PasswordError::Hash`] if the underlying hasher fails.
pub fn hash_password(password: &SecretString) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Verify a plaintext password against a stored digest.
///
/// # Errors
///
/// Returns [`PasswordError::InvalidDigest`] if the digest cannot be parsed.
pub fn verify_password(password: &SecretString, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest).map_err(|e| PasswordError::InvalidDigest(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = SecretString::from("correct horse battery staple");
        let digest = hash_password(&password).unwrap();

        assert!(verify_password(&password, &digest).unwrap());
        assert!(!verify_password(&SecretString::from("wrong"), &digest).unwrap());
    }

    #[test]
    fn test_identical_inputs_produce_unique_digests() {
        let password = SecretString::from("secret1");
        let first = hash_password(&password).unwrap();
        let second = hash_password(&password).unwrap();

        assert_ne!(first, second);
        assert!(verify_password(&password, &first).unwrap());
        assert!(verify_password(&password, &second).unwrap());
    }

    #[test]
    fn test_digest_is_not_plaintext() {
        let password = SecretString::from("secret1");
        let digest = hash_password(&password).unwrap();
        assert!(!digest.contains("secret1"));
        assert!(digest.starts_with("$argon2"));
    }

    #[test]
    fn test_invalid_digest() {
        let password = SecretString::from("secret1");
        assert!(matches!(
            verify_password(&password, "not-a-digest"),
            Err(PasswordError::InvalidDigest(_))
        ));
    }
}
