//! Password hashing and verification with Argon2

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use thiserror::Error;
use tracing::warn;

/// Errors raised while hashing
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
}

/// Salted one-way password hashing
#[derive(Clone)]
pub struct PasswordService {
    /// Hash verified against when the user does not exist, so that unknown
    /// usernames cost the same as wrong passwords.
    dummy_hash: Arc<str>,
}

impl PasswordService {
    /// Initialize the service, computing the dummy hash once
    pub fn new() -> Result<Self, PasswordError> {
        let dummy_hash = hash_password("not-a-real-password")?;
        Ok(Self {
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Hash `plaintext` with a fresh random salt
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        hash_password(plaintext)
    }

    /// Check `plaintext` against a stored PHC hash
    ///
    /// A stored value that is not a valid hash never verifies.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(parsed_hash) => parsed_hash,
            Err(e) => {
                warn!("Stored password hash cannot be parsed: {}", e);
                return false;
            }
        };

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Burn one verification for a login whose user does not exist
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.dummy_hash);
    }
}

fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| PasswordError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let service = PasswordService::new().unwrap();
        let hash = service.hash("pw1").unwrap();

        assert!(service.verify("pw1", &hash));
        assert!(!service.verify("pw2", &hash));
        assert!(!hash.contains("pw1"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let service = PasswordService::new().unwrap();
        let first = service.hash("same").unwrap();
        let second = service.hash("same").unwrap();

        assert_ne!(first, second);
        assert!(service.verify("same", &first));
        assert!(service.verify("same", &second));
    }

    #[test]
    fn test_unparseable_hash_never_verifies() {
        let service = PasswordService::new().unwrap();
        assert!(!service.verify("!locked", "!locked"));
        assert!(!service.verify("changeme", "changeme"));
    }
}
