//! Authentication error taxonomy.
//!
//! Variants stay distinct inside the process so logs can say exactly why
//! a request was refused. Converting into [`AppError`] is the boundary
//! where that detail is dropped.

use thiserror::Error;

use keyward_core::error::AppError;

/// Message returned for every rejected sign-in.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Message returned for every rejected token.
pub const UNAUTHENTICATED_MESSAGE: &str = "Unauthenticated";

/// Why a token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a decodable token, or required claims are missing.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the expected secret.
    #[error("token signature does not verify")]
    Forged,
    /// The token is past its expiry.
    #[error("token has expired")]
    Expired,
    /// Cryptographically valid, but no longer in the subject's active set.
    #[error("token has been revoked")]
    Revoked,
}

/// Failures of the credential and session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input broke a sign-up rule; the message names the first rule broken.
    #[error("{0}")]
    Validation(String),
    /// The email is already registered.
    #[error("Email '{0}' is already registered")]
    Conflict(String),
    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// A presented token was rejected.
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),
    /// The session store found no user for the email.
    #[error("User not found")]
    UserNotFound,
    /// Repository, timeout, or other infrastructure failure, unmodified.
    #[error(transparent)]
    Internal(#[from] AppError),
}

/// Result alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Whether the caller should be treated as unauthenticated.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::InvalidToken(_) | Self::UserNotFound
        )
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(message) => AppError::validation(message),
            AuthError::Conflict(email) => {
                AppError::conflict(format!("Email '{email}' is already registered"))
            }
            AuthError::InvalidCredentials | AuthError::UserNotFound => {
                AppError::authentication(INVALID_CREDENTIALS_MESSAGE)
            }
            AuthError::InvalidToken(_) => {
                AppError::authentication(UNAUTHENTICATED_MESSAGE)
            }
            AuthError::Internal(err) => err,
        }
    }
}
