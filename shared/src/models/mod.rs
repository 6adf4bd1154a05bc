//! Data models
//!
//! Shared between the catalog core, storage adapters and the HTTP layer.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! Timestamps are Unix milliseconds.

pub mod assoc;
pub mod catalog;
pub mod product;

// Re-exports
pub use assoc::*;
pub use catalog::*;
pub use product::*;
