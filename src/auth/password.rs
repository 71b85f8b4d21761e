// Password hashing and validation service

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use std::sync::OnceLock;
use tracing::error;

use crate::auth::error::AuthError;

/// Rules applied to a password before it is hashed
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 6,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

/// Password service for hashing and verification
#[derive(Debug, Clone, Default)]
pub struct PasswordService {
    policy: PasswordPolicy,
}

/// Hash verified on the unknown-email login path
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

impl PasswordService {
    /// Hash a password using Argon2id with a random salt
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!("argon2 hash_password error: {}", e);
                AuthError::PasswordHash(e.to_string())
            })
    }

    /// Verify a password against a stored PHC hash string
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!("argon2 parse hash error: {}", e);
            AuthError::PasswordHash(e.to_string())
        })?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Run a full verification against a fixed hash and discard the outcome.
    /// Always false.
    pub fn verify_against_dummy(&self, password: &str) -> bool {
        let dummy = DUMMY_HASH.get_or_init(|| self.hash_password("dummy-password").ok());
        if let Some(hash) = dummy {
            let _ = self.verify_password(password, hash);
        }
        false
    }

    /// Check password strength, returning one message per violated rule
    pub fn validate_password_strength(&self, password: &str) -> Vec<String> {
        let policy = &self.policy;
        let mut errors = Vec::new();

        if password.chars().count() < policy.min_length {
            errors.push(format!(
                "Passwords must be at least {} characters.",
                policy.min_length
            ));
        }
        if policy.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.push("Passwords must have at least one non alphanumeric character.".to_string());
        }
        if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push("Passwords must have at least one digit ('0'-'9').".to_string());
        }
        if policy.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push("Passwords must have at least one lowercase ('a'-'z').".to_string());
        }
        if policy.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push("Passwords must have at least one uppercase ('A'-'Z').".to_string());
        }

        errors
    }
}
