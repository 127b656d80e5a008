//! Session management configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Upper bound for a single repository round-trip, in milliseconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
    /// Interval between expired refresh token sweeps, in minutes.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_minutes: u64,
}

impl SessionConfig {
    /// Repository round-trip timeout as a [`Duration`].
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Cleanup sweep interval as a [`Duration`].
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_minutes.saturating_mul(60))
    }

    /// Rejects zero durations; a zero timeout fails every repository call
    /// and a zero interval cannot drive a timer.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.store_timeout_ms == 0 {
            return Err(AppError::configuration(
                "session.store_timeout_ms must be positive",
            ));
        }
        if self.cleanup_interval_minutes == 0 {
            return Err(AppError::configuration(
                "session.cleanup_interval_minutes must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_timeout_ms: default_store_timeout(),
            cleanup_interval_minutes: default_cleanup_interval(),
        }
    }
}

fn default_store_timeout() -> u64 {
    5_000
}

fn default_cleanup_interval() -> u64 {
    60
}
