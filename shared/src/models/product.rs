//! Product Model
//!
//! Only the fields the catalog needs to bind a SKU to categories.

use serde::{Deserialize, Serialize};

/// Product entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create or replace product payload (the SKU comes from the URL)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductUpsert {
    pub name: String,
}
