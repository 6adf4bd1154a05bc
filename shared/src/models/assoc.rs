//! Catalog-product association Model
//!
//! An association binds a product SKU to a leaf category path. `pri` orders
//! products inside the category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Associations publish payload: `{ "<path>": ["<sku>", ...] }`
///
/// Array order defines priority (10, 20, ...).
pub type AssocMapping = BTreeMap<String, Vec<String>>;

/// Priority step between consecutive products of one path
pub const PRI_STEP: i32 = 10;

/// Association as exchanged over the API: `{path, sku, pri}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssocEntry {
    pub path: String,
    pub sku: String,
    pub pri: i32,
}

/// Identifies a single association
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssocKey {
    pub path: String,
    pub sku: String,
}

/// Persisted association row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AssocRecord {
    pub id: i64,
    pub catalog_id: i64,
    pub product_id: i64,
    pub path: String,
    pub sku: String,
    pub pri: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<AssocRecord> for AssocEntry {
    fn from(r: AssocRecord) -> Self {
        Self {
            path: r.path,
            sku: r.sku,
            pri: r.pri,
        }
    }
}

/// Product listed under a category subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CategoryProduct {
    pub path: String,
    pub sku: String,
    pub name: String,
    pub pri: i32,
}
