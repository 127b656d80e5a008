//! JWT claims carried by access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived bearer token for authenticated requests.
    Access,
    /// Long-lived token used to mint access tokens and to sign out.
    Refresh,
}

/// Claims payload of an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject: the user's email.
    pub sub: String,
    /// Display name at issuance.
    pub name: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
    /// Always [`TokenType::Access`].
    pub token_type: TokenType,
}

/// Claims payload of a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    /// Subject: the user's email.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID; keeps same-second tokens for one user distinct.
    pub jti: Uuid,
    /// Always [`TokenType::Refresh`].
    pub token_type: TokenType,
}

/// Behaviour shared by both claim sets, used by the generic decoder.
pub trait TokenClaims: DeserializeOwned {
    /// The token type this claim set must declare.
    const KIND: TokenType;

    /// Declared token type.
    fn token_type(&self) -> TokenType;

    /// Expiration timestamp (seconds since epoch).
    fn exp(&self) -> i64;

    /// Returns the expiration as a `DateTime<Utc>`.
    fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp(), 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Checks whether the token has expired at `now`.
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp()
    }
}

impl TokenClaims for AccessClaims {
    const KIND: TokenType = TokenType::Access;

    fn token_type(&self) -> TokenType {
        self.token_type
    }

    fn exp(&self) -> i64 {
        self.exp
    }
}

impl TokenClaims for RefreshClaims {
    const KIND: TokenType = TokenType::Refresh;

    fn token_type(&self) -> TokenType {
        self.token_type
    }

    fn exp(&self) -> i64 {
        self.exp
    }
}
