//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use keyward_auth::jwt::{AccessClaims, RefreshClaims, TokenType};
use keyward_auth::{SessionCleanup, SessionManager, TokenPair};
use keyward_core::config::{
    AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, RepositoryBackend, SessionConfig,
};
use keyward_database::MemoryUserRepository;

pub const ACCESS_SECRET: &str = "integration-access-secret";
pub const REFRESH_SECRET: &str = "integration-refresh-secret";
pub const PASSWORD: &str = "longenough1!";

/// Test application context
pub struct TestApp {
    /// The manager under test
    pub manager: SessionManager,
    /// Direct handle on the records the manager writes
    pub repo: MemoryUserRepository,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application over an empty in-memory repository
    pub fn new() -> Self {
        let mut auth = AuthConfig::with_secrets(ACCESS_SECRET, REFRESH_SECRET);
        auth.hash_memory_kib = 1024;
        auth.hash_iterations = 1;

        let config = AppConfig {
            auth,
            session: SessionConfig::default(),
            database: DatabaseConfig {
                backend: RepositoryBackend::Memory,
                ..DatabaseConfig::default()
            },
            logging: LoggingConfig::default(),
        };

        let repo = MemoryUserRepository::new();
        let manager =
            SessionManager::from_config(&config.auth, &config.session, Arc::new(repo.clone()))
                .expect("Failed to build session manager");

        Self {
            manager,
            repo,
            config,
        }
    }

    /// Register a user with the shared test password
    pub async fn create_test_user(&self, email: &str, name: &str) {
        self.manager
            .sign_up(email, name, PASSWORD)
            .await
            .expect("Failed to create test user");
    }

    /// Register a user and sign in once
    pub async fn signed_in_user(&self, email: &str, name: &str) -> TokenPair {
        self.create_test_user(email, name).await;
        self.manager
            .sign_in(email, PASSWORD)
            .await
            .expect("Failed to sign in test user")
    }

    /// Cleanup task sharing the manager's store and decoder
    pub fn cleanup(&self) -> SessionCleanup {
        SessionCleanup::new(self.manager.session_store(), self.manager.jwt_decoder())
    }

    /// Stored refresh tokens for a user
    pub async fn stored_tokens(&self, email: &str) -> Vec<String> {
        use keyward_database::UserRepository;

        self.repo
            .find_by_email(email)
            .await
            .expect("Repository lookup failed")
            .map(|u| u.refresh_tokens)
            .unwrap_or_default()
    }
}

/// Sign access claims with an arbitrary secret and expiry offset from now
pub fn forge_access(secret: &str, email: &str, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = AccessClaims {
        sub: email.to_string(),
        name: "Forged".to_string(),
        iat: now,
        exp: now + exp_offset_secs,
        jti: Uuid::new_v4(),
        token_type: TokenType::Access,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("Failed to encode token")
}

/// Sign refresh claims with an arbitrary secret and expiry offset from now
pub fn forge_refresh(secret: &str, email: &str, exp_offset_secs: i64) -> String {
    let now = Utc::now().timestamp();
    let claims = RefreshClaims {
        sub: email.to_string(),
        iat: now,
        exp: now + exp_offset_secs,
        jti: Uuid::new_v4(),
        token_type: TokenType::Refresh,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("Failed to encode token")
}

/// Flip one character inside the payload segment of a compact JWT
pub fn tamper(token: &str) -> String {
    let payload_start = token.find('.').expect("not a JWT") + 1;
    let mut bytes = token.as_bytes().to_vec();
    let i = payload_start + 10;
    bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
    String::from_utf8(bytes).expect("JWT is ASCII")
}
