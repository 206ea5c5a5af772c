//! Credential hashing with Argon2id

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;

use crate::domain::DomainError;

/// One-way credential hashing used by signup, login and password reset
pub trait PasswordHasher: Send + Sync + Debug {
    /// Derive an opaque, salted hash from a plaintext password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Check a plaintext password against a previously derived hash
    fn matches(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id hasher producing PHC-formatted strings
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Create a hasher with the crate's default (OWASP-recommended) cost
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Create a hasher with explicit cost parameters
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, DomainError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| DomainError::configuration(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn matches(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        // Cost parameters are read from the PHC string, so older hashes still verify.
        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(8, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_match() {
        let hasher = fast_hasher();
        let hash = hasher.hash("my_secure_password").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.matches("my_secure_password", &hash));
        assert!(!hasher.matches("wrong_password", &hash));
    }

    #[test]
    fn test_hash_is_salted() {
        let hasher = fast_hasher();

        let hash1 = hasher.hash("my_secure_password").unwrap();
        let hash2 = hasher.hash("my_secure_password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.matches("my_secure_password", &hash1));
        assert!(hasher.matches("my_secure_password", &hash2));
    }

    #[test]
    fn test_default_hasher_verifies_cheaper_hash() {
        let hash = fast_hasher().hash("secret1").unwrap();

        assert!(Argon2Hasher::new().matches("secret1", &hash));
    }

    #[test]
    fn test_match_invalid_hash() {
        let hasher = fast_hasher();

        assert!(!hasher.matches("password", "invalid_hash_format"));
        assert!(!hasher.matches("password", ""));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = Argon2Hasher::with_params(0, 0, 0);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}
