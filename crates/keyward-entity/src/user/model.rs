//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user together with the refresh tokens of its open sessions.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique email address; the record key.
    pub email: String,
    /// Human-readable display name.
    pub name: String,
    /// Argon2 password hash in PHC string format.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Refresh tokens that are currently valid for this user. Never
    /// contains duplicates.
    #[serde(skip_serializing)]
    pub refresh_tokens: Vec<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh record with an empty refresh token set.
    pub fn from_create(data: CreateUser) -> Self {
        Self {
            email: data.email,
            name: data.name,
            password_hash: data.password_hash,
            refresh_tokens: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether the given refresh token belongs to an open session.
    pub fn has_refresh_token(&self, token: &str) -> bool {
        self.refresh_tokens.iter().any(|t| t == token)
    }

    /// Number of open sessions.
    pub fn session_count(&self) -> usize {
        self.refresh_tokens.len()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Pre-hashed password.
    #[serde(skip_serializing)]
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_has_no_sessions() {
        let user = User::from_create(CreateUser {
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            password_hash: "$argon2id$...".to_string(),
        });
        assert_eq!(user.session_count(), 0);
        assert!(!user.has_refresh_token("anything"));
    }

    #[test]
    fn test_serialization_hides_credentials() {
        let mut user = User::from_create(CreateUser {
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            password_hash: "digest".to_string(),
        });
        user.refresh_tokens.push("token".to_string());

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("digest"));
        assert!(!json.contains("token"));
    }
}
