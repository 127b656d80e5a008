//! # keyward-auth
//!
//! Credential and session lifecycle management for Keyward.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing on a bounded blocking pool, sign-up policy checks
//! - `jwt`: access and refresh token issuance and verification with separate secrets
//! - `session`: the per-user refresh token set, the manager flows and cleanup
//! - `error`: the authentication error taxonomy and its collapse into `AppError`

pub mod error;
pub mod jwt;
pub mod password;
pub mod session;

pub use error::{AuthError, AuthResult, TokenError};
pub use jwt::{AccessClaims, IssuedToken, JwtDecoder, JwtEncoder, RefreshClaims, TokenPair};
pub use password::{CredentialValidator, PasswordHasher};
pub use session::{SessionCleanup, SessionManager, SessionStore};
