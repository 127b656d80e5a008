//! Argon2id password hashing and verification.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tokio::sync::Semaphore;
use tracing::warn;

use keyward_core::config::AuthConfig;
use keyward_core::error::AppError;

/// Hashes and verifies passwords with Argon2id.
///
/// Digests are PHC strings carrying their own salt and cost parameters,
/// so verification keeps working after the configured costs change. The
/// async methods run the computation on the blocking pool, with at most
/// `hash_workers` computations in flight at once.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    workers: Arc<Semaphore>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("available_workers", &self.workers.available_permits())
            .finish()
    }
}

impl PasswordHasher {
    /// Creates a hasher with the cost parameters from auth configuration.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let params = Params::new(
            config.hash_memory_kib,
            config.hash_iterations,
            config.hash_parallelism,
            None,
        )
        .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            workers: Arc::new(Semaphore::new(config.hash_workers.max(1))),
        })
    }

    /// Hashes a plaintext password with a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored digest.
    ///
    /// A digest that cannot be parsed is treated as a mismatch.
    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                warn!(error = %e, "Password verification failed");
                false
            }
        }
    }

    /// Hashes on the blocking pool.
    pub async fn hash(&self, password: &str) -> Result<String, AppError> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|e| AppError::internal(format!("Hash worker pool closed: {e}")))?;

        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Hash worker failed: {e}")))?
    }

    /// Verifies on the blocking pool.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|e| AppError::internal(format!("Hash worker pool closed: {e}")))?;

        let hasher = self.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Hash worker failed: {e}")))
    }
}
