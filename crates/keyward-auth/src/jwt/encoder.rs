//! JWT token creation with separate access and refresh signing keys.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use keyward_core::config::AuthConfig;
use keyward_core::error::AppError;

use super::claims::{AccessClaims, RefreshClaims, TokenType};

/// Creates signed access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC key for access tokens.
    access_key: EncodingKey,
    /// HMAC key for refresh tokens.
    refresh_key: EncodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// A signed token together with its expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Compact JWT.
    pub token: String,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Result of a successful token pair generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_key: EncodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_key: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl: ttl(config.access_ttl_seconds),
            refresh_ttl: ttl(config.refresh_ttl_seconds),
        }
    }

    /// Issues an access token carrying the user's email and display name.
    pub fn issue_access(&self, email: &str, name: &str) -> Result<IssuedToken, AppError> {
        self.issue_access_at(email, name, Utc::now())
    }

    /// Issues a refresh token for the user's email.
    pub fn issue_refresh(&self, email: &str) -> Result<IssuedToken, AppError> {
        self.issue_refresh_at(email, Utc::now())
    }

    /// Issues an access + refresh token pair with a shared issue time.
    pub fn issue_pair(&self, email: &str, name: &str) -> Result<TokenPair, AppError> {
        let now = Utc::now();
        let access = self.issue_access_at(email, name, now)?;
        let refresh = self.issue_refresh_at(email, now)?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            access_expires_at: access.expires_at,
            refresh_expires_at: refresh.expires_at,
        })
    }

    pub(crate) fn issue_access_at(
        &self,
        email: &str,
        name: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let expires_at = expiry(issued_at, self.access_ttl)?;
        let claims = AccessClaims {
            sub: email.to_string(),
            name: name.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Access,
        };

        let token = encode(&Header::default(), &claims, &self.access_key)
            .map_err(|e| AppError::internal(format!("Failed to encode access token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    pub(crate) fn issue_refresh_at(
        &self,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let expires_at = expiry(issued_at, self.refresh_ttl)?;
        let claims = RefreshClaims {
            sub: email.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
            token_type: TokenType::Refresh,
        };

        let token = encode(&Header::default(), &claims, &self.refresh_key)
            .map_err(|e| AppError::internal(format!("Failed to encode refresh token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }
}

/// Saturates instead of wrapping; [`expiry`] rejects what does not fit.
fn ttl(seconds: u64) -> Duration {
    i64::try_from(seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

fn expiry(issued_at: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AppError> {
    issued_at.checked_add_signed(ttl).ok_or_else(|| {
        AppError::configuration(format!(
            "Token lifetime of {}s is out of range",
            ttl.num_seconds()
        ))
    })
}
