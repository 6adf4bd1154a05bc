//! Catalog service error type
//!
//! `CatalogError` sits between the storage ports (`StoreError`) and the API
//! layer (`AppError`). Handlers propagate it with `?`; the `From` impl picks
//! the wire code and logs infrastructure failures once.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

use crate::catalog::{NestedSetError, ValidationError};
use crate::db::StoreError;

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    NotLeaf,
    Malformed,
    CategoriesInUse,
    Conflict,
    Transient,
    Cancelled,
    Internal,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No catalog has been published")]
    CatalogNotFound,

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Category is not a leaf: {0}")]
    NotLeaf(String),

    #[error("Malformed input: {0}")]
    Malformed(String),

    #[error("Categories in use: {0}")]
    CategoriesInUse(String),

    #[error("Product in use: {0}")]
    ProductInUse(String),

    #[error("{op} cancelled")]
    Cancelled { op: &'static str },

    #[error("{op} failed: {source}")]
    Store {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CatalogNotFound | Self::CategoryNotFound(_) | Self::ProductNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::NotLeaf(_) => ErrorKind::NotLeaf,
            Self::Malformed(_) => ErrorKind::Malformed,
            Self::CategoriesInUse(_) | Self::ProductInUse(_) => ErrorKind::CategoriesInUse,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Store { source, .. } => match source {
                StoreError::NotFound(_) => ErrorKind::NotFound,
                StoreError::InUse(_) => ErrorKind::CategoriesInUse,
                StoreError::Conflict(_) => ErrorKind::Conflict,
                StoreError::Transient(_) => ErrorKind::Transient,
                StoreError::Database(_) => ErrorKind::Internal,
            },
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            Self::CatalogNotFound => ErrorCode::CatalogNotFound,
            Self::CategoryNotFound(_) => ErrorCode::CategoryNotFound,
            Self::ProductNotFound(_) => ErrorCode::ProductNotFound,
            Self::NotLeaf(_) => ErrorCode::CategoryNotLeaf,
            Self::Malformed(_) => ErrorCode::CatalogMalformed,
            Self::CategoriesInUse(_) => ErrorCode::CategoriesInUse,
            Self::ProductInUse(_) => ErrorCode::ProductInUse,
            Self::Cancelled { .. } => ErrorCode::RequestCancelled,
            Self::Store { source, .. } => match source {
                StoreError::NotFound(_) => ErrorCode::NotFound,
                StoreError::InUse(_) => ErrorCode::CategoriesInUse,
                StoreError::Conflict(_) => ErrorCode::ConcurrentModification,
                StoreError::Transient(_) => ErrorCode::SystemBusy,
                StoreError::Database(_) => ErrorCode::DatabaseError,
            },
        }
    }
}

impl From<NestedSetError> for CatalogError {
    fn from(e: NestedSetError) -> Self {
        CatalogError::Malformed(e.to_string())
    }
}

impl From<ValidationError> for CatalogError {
    fn from(e: ValidationError) -> Self {
        CatalogError::Malformed(e.to_string())
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        let code = e.code();
        match e {
            // Driver messages stay in the log
            CatalogError::Store {
                op,
                source: ref source @ StoreError::Database(_),
            } => {
                tracing::error!(op, error = %source, "Catalog store failure");
                AppError::new(code)
            }
            CatalogError::CategoryNotFound(ref path) | CatalogError::NotLeaf(ref path) => {
                let path = path.clone();
                AppError::with_message(code, e.to_string()).with_detail("path", path)
            }
            CatalogError::ProductNotFound(ref sku) | CatalogError::ProductInUse(ref sku) => {
                let sku = sku.clone();
                AppError::with_message(code, e.to_string()).with_detail("sku", sku)
            }
            _ => AppError::with_message(code, e.to_string()),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
