//! catalog-cloud: product catalog hierarchy service
//!
//! - [`catalog`]: category tree and its nested-set encoding
//! - [`db`]: storage ports with PostgreSQL and in-memory adapters
//! - [`service`]: publish / query orchestration over the ports
//! - [`api`]: axum router (reads public, writes behind bearer JWT)

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod service;
pub mod state;

pub use error::{CatalogError, CatalogResult, ErrorKind};
pub use service::{CatalogService, OpContext};
pub use state::AppState;
