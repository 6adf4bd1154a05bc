//! Shared types for the catalog service
//!
//! Error codes, API response envelope and the wire models exchanged between
//! the HTTP layer, the catalog core and storage.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
