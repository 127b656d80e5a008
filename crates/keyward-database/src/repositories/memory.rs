//! In-memory user repository backed by a sharded concurrent map.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use keyward_core::error::AppError;
use keyward_core::result::AppResult;
use keyward_entity::user::{CreateUser, User};

use super::UserRepository;

/// Process-local user repository.
///
/// Every mutation runs under the shard write lock of the user's entry,
/// which makes each refresh set update atomic with respect to the
/// membership check it performs. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<DashMap<String, User>>,
}

impl MemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.users.get(email).map(|u| u.value().clone()))
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        match self.users.entry(data.email.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Email '{}' is already registered",
                data.email
            ))),
            Entry::Vacant(slot) => {
                let user = User::from_create(data.clone());
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.users.len() as u64)
    }

    async fn list_emails(&self) -> AppResult<Vec<String>> {
        let mut emails: Vec<String> = self.users.iter().map(|e| e.key().clone()).collect();
        emails.sort();
        Ok(emails)
    }

    async fn add_refresh_token(&self, email: &str, token: &str) -> AppResult<bool> {
        let Some(mut user) = self.users.get_mut(email) else {
            return Ok(false);
        };
        if !user.has_refresh_token(token) {
            user.refresh_tokens.push(token.to_string());
        }
        Ok(true)
    }

    async fn remove_refresh_token(&self, email: &str, token: &str) -> AppResult<bool> {
        let Some(mut user) = self.users.get_mut(email) else {
            return Ok(false);
        };
        user.refresh_tokens.retain(|t| t != token);
        Ok(true)
    }

    async fn replace_refresh_token(&self, email: &str, old: &str, new: &str) -> AppResult<bool> {
        let Some(mut user) = self.users.get_mut(email) else {
            return Ok(false);
        };
        let Some(pos) = user.refresh_tokens.iter().position(|t| t == old) else {
            return Ok(false);
        };
        user.refresh_tokens.remove(pos);
        if !user.has_refresh_token(new) {
            user.refresh_tokens.push(new.to_string());
        }
        Ok(true)
    }

    async fn remove_refresh_tokens(&self, email: &str, tokens: &[String]) -> AppResult<bool> {
        let Some(mut user) = self.users.get_mut(email) else {
            return Ok(false);
        };
        user.refresh_tokens.retain(|t| !tokens.contains(t));
        Ok(true)
    }
}
