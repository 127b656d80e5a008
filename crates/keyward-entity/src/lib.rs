//! # keyward-entity
//!
//! Domain entity models for Keyward. Every struct in this crate derives
//! `Debug`, `Clone`, `Serialize`, `Deserialize`, and persisted rows
//! additionally derive `sqlx::FromRow`.

pub mod user;
