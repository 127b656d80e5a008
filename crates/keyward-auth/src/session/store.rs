//! Refresh token set operations wrapping the user repository.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use keyward_core::config::SessionConfig;
use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_database::repositories::UserRepository;

use crate::error::{AuthError, AuthResult};

/// Runs one repository round-trip, failing with a transient error if it
/// does not finish within `timeout`.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    operation: &'static str,
    fut: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::service_unavailable(format!(
            "{operation} timed out after {}ms",
            timeout.as_millis()
        ))),
    }
}

/// The set of refresh tokens each user currently holds.
///
/// A refresh token is only honoured while it is a member of its
/// subject's set; removing it revokes that one session. Every method is a
/// single atomic repository update.
#[derive(Clone)]
pub struct SessionStore {
    /// User repository holding the sets.
    repo: Arc<dyn UserRepository>,
    /// Per-call repository timeout.
    timeout: Duration,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SessionStore {
    /// Creates a new session store.
    pub fn new(repo: Arc<dyn UserRepository>, config: &SessionConfig) -> Self {
        Self {
            repo,
            timeout: config.store_timeout(),
        }
    }

    /// Adds a refresh token to the user's set.
    ///
    /// Fails with [`AuthError::UserNotFound`] if the email has no record.
    pub async fn add_refresh_token(&self, email: &str, token: &str) -> AuthResult<()> {
        let found = bounded(
            self.timeout,
            "add_refresh_token",
            self.repo.add_refresh_token(email, token),
        )
        .await?;

        if found { Ok(()) } else { Err(AuthError::UserNotFound) }
    }

    /// Whether the token is in the user's set.
    ///
    /// Fails with [`AuthError::UserNotFound`] if the email has no record.
    pub async fn is_active(&self, email: &str, token: &str) -> AuthResult<bool> {
        let user = bounded(self.timeout, "find_by_email", self.repo.find_by_email(email))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.has_refresh_token(token))
    }

    /// Removes the token from the user's set. Removing a token that is not
    /// there succeeds.
    ///
    /// Fails with [`AuthError::UserNotFound`] if the email has no record.
    pub async fn revoke(&self, email: &str, token: &str) -> AuthResult<()> {
        let found = bounded(
            self.timeout,
            "remove_refresh_token",
            self.repo.remove_refresh_token(email, token),
        )
        .await?;

        if found { Ok(()) } else { Err(AuthError::UserNotFound) }
    }

    /// Replaces `old` with `new` in one step.
    ///
    /// Returns `false` without storing `new` when `old` is no longer in
    /// the set or the user is gone.
    pub async fn rotate(&self, email: &str, old: &str, new: &str) -> AuthResult<bool> {
        Ok(bounded(
            self.timeout,
            "replace_refresh_token",
            self.repo.replace_refresh_token(email, old, new),
        )
        .await?)
    }

    /// Removes several tokens at once.
    pub async fn revoke_many(&self, email: &str, tokens: &[String]) -> AuthResult<()> {
        if tokens.is_empty() {
            return Ok(());
        }

        let found = bounded(
            self.timeout,
            "remove_refresh_tokens",
            self.repo.remove_refresh_tokens(email, tokens),
        )
        .await?;

        if found { Ok(()) } else { Err(AuthError::UserNotFound) }
    }

    /// Emails of every user that could hold a token set.
    pub async fn subjects(&self) -> AuthResult<Vec<String>> {
        Ok(bounded(self.timeout, "list_emails", self.repo.list_emails()).await?)
    }

    /// Lists the user's refresh tokens.
    pub async fn active_tokens(&self, email: &str) -> AuthResult<Vec<String>> {
        let user = bounded(self.timeout, "find_by_email", self.repo.find_by_email(email))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(user.refresh_tokens)
    }
}
