//! Persistence ports
//!
//! The catalog service talks to storage only through these traits. Two
//! adapters implement all of them:
//! - [`postgres::PgStore`]: production, parameterized SQL over `PgPool`
//! - [`memory::MemoryStore`]: in-process, used by tests and keyless dev runs
//!
//! Every `replace_*` / `purge_*` is atomic: on error the previous state stays.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use shared::models::{
    AssocEntry, AssocMapping, AssocRecord, CatalogRecord, CategoryProduct, NestedSetEntry,
    Product, ProductUpsert,
};
use thiserror::Error;

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rows still referenced by other rows (foreign key)
    #[error("In use: {0}")]
    InUse(String),

    /// Unique constraint or optimistic concurrency violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Retriable failure (serialization, deadlock, pool exhaustion, I/O)
    #[error("Transient: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound(err.to_string()),
            sqlx::Error::Database(db) => match db.code().as_deref() {
                Some("23505") => StoreError::Conflict(db.message().to_string()),
                Some("23503") => StoreError::InUse(db.message().to_string()),
                Some("40001") | Some("40P01") => StoreError::Transient(db.message().to_string()),
                _ => StoreError::Database(err.to_string()),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Transient(err.to_string())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Nested-set catalog persistence
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// At least one node is persisted
    async fn has_catalog(&self) -> StoreResult<bool>;

    /// Whole listing ordered by `lft`
    async fn get_catalog(&self) -> StoreResult<Vec<CatalogRecord>>;

    async fn get_by_path(&self, path: &str) -> StoreResult<Option<CatalogRecord>>;

    /// The node at `path` and all its descendants, ordered by `lft`
    async fn get_subtree(&self, path: &str) -> StoreResult<Vec<CatalogRecord>>;

    /// Strict ancestors of the node at `path`, root first
    async fn get_ancestors(&self, path: &str) -> StoreResult<Vec<CatalogRecord>>;

    /// Delete every node and insert `listing` in one transaction
    async fn replace_catalog(&self, listing: &[NestedSetEntry]) -> StoreResult<()>;

    /// Delete every node; fails with [`StoreError::InUse`] while associations exist
    async fn purge_catalog(&self) -> StoreResult<()>;
}

/// Catalog-product association persistence
#[async_trait]
pub trait AssocStore: Send + Sync {
    async fn has_assocs(&self) -> StoreResult<bool>;

    /// All associations sorted by `(path, pri)`
    async fn get_assocs(&self) -> StoreResult<Vec<AssocRecord>>;

    /// Distinct paths that carry at least one association
    async fn associated_paths(&self) -> StoreResult<Vec<String>>;

    /// Append `sku` at `path` with `pri = max(pri at path) + 10`.
    ///
    /// Returns the existing row untouched when the pair is already bound.
    async fn create_assoc(&self, path: &str, sku: &str) -> StoreResult<AssocRecord>;

    /// Idempotent
    async fn delete_assoc(&self, path: &str, sku: &str) -> StoreResult<()>;

    /// Truncate, then insert each path's SKUs with `pri = 10, 20, ...`
    async fn replace_assocs(&self, mapping: &AssocMapping) -> StoreResult<()>;

    /// Truncate, then insert `entries` with their priorities verbatim
    async fn batch_update_assocs(&self, entries: &[AssocEntry]) -> StoreResult<()>;

    async fn purge_assocs(&self) -> StoreResult<()>;

    /// Products bound to any leaf under `path`, by category `lft` then `pri`
    async fn products_in_subtree(&self, path: &str) -> StoreResult<Vec<CategoryProduct>>;
}

/// Minimal product persistence backing SKU checks
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn list_products(&self) -> StoreResult<Vec<Product>>;

    async fn get_product(&self, sku: &str) -> StoreResult<Option<Product>>;

    async fn upsert_product(&self, sku: &str, data: &ProductUpsert) -> StoreResult<Product>;

    /// Fails with [`StoreError::InUse`] while the product is associated.
    /// Returns whether a row was deleted.
    async fn delete_product(&self, sku: &str) -> StoreResult<bool>;

    /// Subset of `skus` with no product row, in input order
    async fn missing_skus(&self, skus: &[String]) -> StoreResult<Vec<String>>;
}
