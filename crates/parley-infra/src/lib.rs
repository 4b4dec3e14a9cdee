//! Infrastructure implementations for Parley.
//!
//! SQLite-backed repositories (implementing the parley-core traits),
//! the split read/write database pool, the config loader, and data
//! directory resolution.

pub mod config;
pub mod data_dir;
pub mod sqlite;
