//! Expired refresh token cleanup.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{AuthError, AuthResult};
use crate::jwt::JwtDecoder;

use super::store::SessionStore;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Prunes refresh tokens that can no longer be honoured from every
/// user's set.
///
/// Stored tokens that fail verification (expired, or signed with a
/// secret that has since been rotated) would otherwise accumulate until
/// the user signs out of each session explicitly.
#[derive(Clone)]
pub struct SessionCleanup {
    /// Session store for reading and pruning token sets.
    session_store: Arc<SessionStore>,
    /// JWT decoder for checking each stored token.
    jwt_decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for SessionCleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCleanup").finish()
    }
}

impl SessionCleanup {
    /// Creates a new session cleanup handler.
    pub fn new(session_store: Arc<SessionStore>, jwt_decoder: Arc<JwtDecoder>) -> Self {
        Self {
            session_store,
            jwt_decoder,
        }
    }

    /// Runs a cleanup cycle over all users.
    ///
    /// Returns the number of refresh tokens removed. A failure on one user
    /// is logged and skipped.
    pub async fn run_cleanup(&self) -> AuthResult<u32> {
        let emails = self.session_store.subjects().await?;
        let mut cleaned = 0u32;

        for email in &emails {
            let tokens = match self.session_store.active_tokens(email).await {
                Ok(tokens) => tokens,
                // Deleted between listing and reading.
                Err(AuthError::UserNotFound) => continue,
                Err(e) => {
                    error!(email = %email, error = %e, "Failed to read refresh tokens");
                    continue;
                }
            };

            let stale: Vec<String> = tokens
                .into_iter()
                .filter(|token| self.jwt_decoder.verify_refresh(token).is_err())
                .collect();

            if stale.is_empty() {
                continue;
            }

            match self.session_store.revoke_many(email, &stale).await {
                Ok(()) => {
                    debug!(email = %email, count = stale.len(), "Pruned stale refresh tokens");
                    cleaned += stale.len() as u32;
                }
                Err(AuthError::UserNotFound) => {
                    debug!(email = %email, "User removed before pruning");
                }
                Err(e) => {
                    error!(email = %email, error = %e, "Failed to prune refresh tokens");
                }
            }
        }

        info!(users = emails.len(), cleaned = cleaned, "Session cleanup completed");

        Ok(cleaned)
    }

    /// Runs [`Self::run_cleanup`] every `interval` until the task is
    /// aborted. The first cycle runs immediately. Intervals shorter than
    /// one second are raised to one second.
    pub fn spawn_periodic(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let interval = interval.max(MIN_INTERVAL);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_cleanup().await {
                    error!(error = %e, "Session cleanup cycle failed");
                }
            }
        })
    }
}
