//! Password hashing using argon2
//!
//! Provides secure password hashing and verification.
//!
//! # Performance Considerations
//!
//! Argon2 is intentionally CPU-intensive. Async callers should use the
//! `*_async` variants, which run on the blocking thread pool.

use argon2::{
    password_hash::{
        self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use identity_shared::HashError;

/// PHC prefixes written by bcrypt implementations
const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// Password hashing service
///
/// New hashes use Argon2id in PHC string format. Verification also accepts
/// bcrypt hashes so that accounts imported from the previous store keep
/// working.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using argon2 (blocking operation)
    pub fn hash(password: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HashError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(password: String) -> Result<String, HashError> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| HashError::Hashing(format!("Task join error: {}", e)))?
    }

    /// Verify a password against a hash (blocking operation)
    ///
    /// Returns `Ok(false)` on mismatch. Errors only when `hash` is not a
    /// hash this service can read.
    pub fn verify(password: &str, hash: &str) -> Result<bool, HashError> {
        if BCRYPT_PREFIXES.iter().any(|prefix| hash.starts_with(prefix)) {
            return bcrypt::verify(password, hash)
                .map_err(|e| HashError::MalformedHash(e.to_string()));
        }

        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| HashError::MalformedHash(e.to_string()))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::MalformedHash(e.to_string())),
        }
    }

    /// Verify a password on the blocking thread pool
    pub async fn verify_async(password: String, hash: String) -> Result<bool, HashError> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| HashError::Hashing(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "secure_password_123";
        let hash = PasswordService::hash(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(PasswordService::verify(password, &hash).unwrap());
        assert!(!PasswordService::verify("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let password = "test_password";
        let hash1 = PasswordService::hash(password).unwrap();
        let hash2 = PasswordService::hash(password).unwrap();

        // Fresh salt per call
        assert_ne!(hash1, hash2);

        assert!(PasswordService::verify(password, &hash1).unwrap());
        assert!(PasswordService::verify(password, &hash2).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_error_not_false() {
        let result = PasswordService::verify("password", "not-a-hash");
        assert!(matches!(result, Err(HashError::MalformedHash(_))));

        let result = PasswordService::verify("password", "");
        assert!(matches!(result, Err(HashError::MalformedHash(_))));
    }

    #[test]
    fn test_truncated_bcrypt_hash_is_malformed() {
        let result = PasswordService::verify("password", "$2b$10$tooshort");
        assert!(matches!(result, Err(HashError::MalformedHash(_))));
    }

    #[test]
    fn test_verifies_legacy_bcrypt_hash() {
        let legacy = bcrypt::hash("legacy_password", 4).unwrap();

        assert!(PasswordService::verify("legacy_password", &legacy).unwrap());
        assert!(!PasswordService::verify("other_password", &legacy).unwrap());
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let password = "async_test_password".to_string();
        let hash = PasswordService::hash_async(password.clone()).await.unwrap();

        assert!(PasswordService::verify_async(password.clone(), hash.clone()).await.unwrap());
        assert!(!PasswordService::verify_async("wrong".to_string(), hash).await.unwrap());
    }
}
