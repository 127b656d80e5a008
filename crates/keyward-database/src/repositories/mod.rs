//! The keyed user repository and its implementations.
//!
//! Every refresh token mutation is a single atomic update of one user
//! record. Implementations must never emulate them with a read followed
//! by a write, or concurrent sign-in and sign-out on the same account
//! would lose updates.

pub mod memory;
pub mod user;

use async_trait::async_trait;

use keyward_core::result::AppResult;
use keyward_entity::user::{CreateUser, User};

pub use memory::MemoryUserRepository;
pub use user::PgUserRepository;

/// User records keyed by email.
///
/// Methods that touch the refresh token set return `Ok(false)` when no
/// user has the given email, leaving it to the caller to decide whether
/// that is an error.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Find a user by email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user. Fails with `ErrorKind::Conflict` when the email
    /// is already registered.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Count registered users.
    async fn count(&self) -> AppResult<u64>;

    /// List every registered email.
    async fn list_emails(&self) -> AppResult<Vec<String>>;

    /// Add `token` to the user's refresh set unless it is already there.
    async fn add_refresh_token(&self, email: &str, token: &str) -> AppResult<bool>;

    /// Remove `token` from the user's refresh set if present.
    async fn remove_refresh_token(&self, email: &str, token: &str) -> AppResult<bool>;

    /// Swap `old` for `new` in one step. Returns `Ok(false)` when the user
    /// is missing or `old` is no longer in the set, in which case nothing
    /// is written.
    async fn replace_refresh_token(&self, email: &str, old: &str, new: &str) -> AppResult<bool>;

    /// Remove every token in `tokens` from the user's refresh set.
    async fn remove_refresh_tokens(&self, email: &str, tokens: &[String]) -> AppResult<bool>;
}
