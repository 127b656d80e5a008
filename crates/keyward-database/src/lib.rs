//! # keyward-database
//!
//! The keyed user repository Keyward is written against, with a
//! PostgreSQL implementation for deployments and an in-memory one for
//! tests and single-process use.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::{MemoryUserRepository, PgUserRepository, UserRepository};
