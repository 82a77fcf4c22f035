//! Password hashing and verification using argon2id.
//!
//! Both functions are CPU-bound; async callers run them on
//! the blocking pool.

use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use super::AuthError;

/// Hash a password using argon2id with a random salt.
///
/// Returns the PHC string, which embeds the salt and parameters.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored PHC hash.
///
/// A wrong password is `Ok(false)`; only an unparseable hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AuthError::Hashing(format!("malformed hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// PHC hash of a throwaway secret, computed once per process.
static UNKNOWN_USER_HASH: LazyLock<Result<String, AuthError>> =
    LazyLock::new(|| hash_password("fleetwatch-unknown-user"));

/// Spend the same argon2 effort as [`verify_password`] for a username that
/// has no stored credential. Always `Ok(false)`.
pub fn verify_unknown_user(password: &str) -> Result<bool, AuthError> {
    let hash = UNKNOWN_USER_HASH.as_ref().map_err(Clone::clone)?;
    verify_password(password, hash).map(|_| false)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("inspect-the-bus").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("inspect-the-bus", &hash).unwrap());
        assert!(!verify_password("wrongpassword", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently_and_both_verify() {
        let h1 = hash_password("same-password").unwrap();
        let h2 = hash_password("same-password").unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("same-password", &h1).unwrap());
        assert!(verify_password("same-password", &h2).unwrap());
    }

    #[test]
    fn empty_password_round_trips() {
        let hash = hash_password("").unwrap();
        assert!(verify_password("", &hash).unwrap());
        assert!(!verify_password(" ", &hash).unwrap());
    }

    #[test]
    fn unknown_user_never_verifies() {
        assert!(!verify_unknown_user("anything").unwrap());
        assert!(!verify_unknown_user("fleetwatch-unknown-user").unwrap());
        assert!(UNKNOWN_USER_HASH.as_ref().unwrap().starts_with("$argon2id$"));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let err = verify_password("password", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, AuthError::Hashing(_)));
    }
}
