//! Refresh session lifecycle built on the per-user active token set.

pub mod cleanup;
pub mod manager;
pub mod store;

pub use cleanup::SessionCleanup;
pub use manager::SessionManager;
pub use store::SessionStore;
