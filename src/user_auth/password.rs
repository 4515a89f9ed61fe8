//! Salted Argon2id password hashing.
//!
//! Hashing is CPU-bound, so the async entry points move the work
//! onto tokio's blocking pool.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use super::error::AuthError;
use crate::config::PasswordHashConfig;

#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(config: PasswordHashConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::Hashing(format!("Invalid Argon2 params: {}", e)))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash with a fresh random salt; returns a PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Check `plaintext` against a stored PHC string. The cost parameters come
    /// from the stored hash, so hashes made under older settings still verify.
    /// An unparseable hash is a mismatch, never an error.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Stored password hash is not a valid PHC string: {}", e);
                return false;
            }
        };
        self.argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AuthError::Internal(format!("Hashing task failed: {}", e)))?
    }

    pub async fn verify_blocking(
        &self,
        plaintext: String,
        stored_hash: String,
    ) -> Result<bool, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &stored_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("Verification task failed: {}", e)))
    }
}

#[cfg(test)]
pub(crate) fn fast_params() -> PasswordHashConfig {
    PasswordHashConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    }
}
