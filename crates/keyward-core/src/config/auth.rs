//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Longest accepted token lifetime: ten years.
pub const MAX_TOKEN_TTL_SECONDS: u64 = 10 * 365 * 24 * 60 * 60;

/// Credential hashing and token signing configuration.
///
/// Loaded once at startup and handed to the hasher and token codec by
/// value; nothing reads these settings from the environment afterwards.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    pub access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens. Must differ from `access_secret`.
    pub refresh_secret: String,
    /// Access token TTL in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: u64,
    /// Refresh token TTL in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_seconds: u64,
    /// Minimum password length accepted at sign-up.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_memory")]
    pub hash_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_hash_iterations")]
    pub hash_iterations: u32,
    /// Argon2 degree of parallelism.
    #[serde(default = "default_hash_parallelism")]
    pub hash_parallelism: u32,
    /// Maximum number of password hash computations running at once.
    #[serde(default = "default_hash_workers")]
    pub hash_workers: usize,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("password_min_length", &self.password_min_length)
            .field("hash_memory_kib", &self.hash_memory_kib)
            .field("hash_iterations", &self.hash_iterations)
            .field("hash_parallelism", &self.hash_parallelism)
            .field("hash_workers", &self.hash_workers)
            .finish()
    }
}

impl AuthConfig {
    /// Builds a configuration with the given secrets and default settings.
    pub fn with_secrets(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            access_ttl_seconds: default_access_ttl(),
            refresh_ttl_seconds: default_refresh_ttl(),
            password_min_length: default_password_min(),
            hash_memory_kib: default_hash_memory(),
            hash_iterations: default_hash_iterations(),
            hash_parallelism: default_hash_parallelism(),
            hash_workers: default_hash_workers(),
        }
    }

    /// Rejects settings that would break secret separation or produce
    /// tokens that are already expired when issued.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(AppError::configuration(
                "auth.access_secret and auth.refresh_secret must not be empty",
            ));
        }
        if self.access_secret == self.refresh_secret {
            return Err(AppError::configuration(
                "auth.access_secret and auth.refresh_secret must differ",
            ));
        }
        if self.access_ttl_seconds == 0 || self.refresh_ttl_seconds == 0 {
            return Err(AppError::configuration(
                "auth.access_ttl_seconds and auth.refresh_ttl_seconds must be positive",
            ));
        }
        if self.access_ttl_seconds > MAX_TOKEN_TTL_SECONDS
            || self.refresh_ttl_seconds > MAX_TOKEN_TTL_SECONDS
        {
            return Err(AppError::configuration(format!(
                "auth.access_ttl_seconds and auth.refresh_ttl_seconds must not exceed {MAX_TOKEN_TTL_SECONDS}"
            )));
        }
        if self.hash_workers == 0 {
            return Err(AppError::configuration("auth.hash_workers must be positive"));
        }
        Ok(())
    }
}

fn default_access_ttl() -> u64 {
    15 * 60
}

fn default_refresh_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_password_min() -> usize {
    8
}

fn default_hash_memory() -> u32 {
    19 * 1024
}

fn default_hash_iterations() -> u32 {
    2
}

fn default_hash_parallelism() -> u32 {
    1
}

fn default_hash_workers() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_secrets_accepted() {
        let config = AuthConfig::with_secrets("access-secret", "refresh-secret");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shared_secret_rejected() {
        let config = AuthConfig::with_secrets("same", "same");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = AuthConfig::with_secrets("a", "b");
        config.access_ttl_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ttl_upper_bound() {
        let mut config = AuthConfig::with_secrets("a", "b");
        config.refresh_ttl_seconds = MAX_TOKEN_TTL_SECONDS;
        assert!(config.validate().is_ok());

        config.refresh_ttl_seconds = 10_000_000_000_000;
        assert!(config.validate().is_err());

        config.refresh_ttl_seconds = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig::with_secrets("top-secret-a", "top-secret-b");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret"));
    }
}
