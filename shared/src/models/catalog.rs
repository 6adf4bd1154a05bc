//! Catalog Model
//!
//! The catalog is a category tree. Clients publish it as nested JSON
//! ([`CatalogNodeInput`]); storage keeps it as a nested-set listing
//! ([`NestedSetEntry`] rows ordered by `lft`).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category node as supplied by a catalog publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogNodeInput {
    pub segment: String,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<CatalogNodeInput>,
}

impl CatalogNodeInput {
    pub fn new(segment: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Builder-style child append, handy for fixtures
    pub fn with_child(mut self, child: CatalogNodeInput) -> Self {
        self.nodes.push(child);
        self
    }
}

/// Category node as returned by a catalog fetch
///
/// `path`, `lft`, `rgt` and `depth` are server-assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogNodeView {
    pub segment: String,
    pub name: String,
    pub path: String,
    pub lft: i32,
    pub rgt: i32,
    pub depth: i32,
    #[serde(default)]
    pub nodes: Vec<CatalogNodeView>,
}

/// One row of a nested-set listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct NestedSetEntry {
    pub segment: String,
    /// Slash-joined segments from the root
    pub path: String,
    pub name: String,
    pub lft: i32,
    pub rgt: i32,
    pub depth: i32,
}

impl NestedSetEntry {
    /// A node is a leaf iff its interval holds nothing but itself
    pub fn is_leaf(&self) -> bool {
        self.rgt == self.lft + 1
    }

    /// Strict interval containment: `self` is an ancestor of `other`
    pub fn is_ancestor_of(&self, other: &NestedSetEntry) -> bool {
        self.lft < other.lft && self.rgt > other.rgt
    }

    /// Number of descendants encoded by the interval width
    pub fn descendant_count(&self) -> i32 {
        (self.rgt - self.lft - 1) / 2
    }
}

/// Persisted catalog row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CatalogRecord {
    pub id: i64,
    pub uuid: Uuid,
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub entry: NestedSetEntry,
    pub created_at: i64,
    pub updated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, lft: i32, rgt: i32, depth: i32) -> NestedSetEntry {
        NestedSetEntry {
            segment: path.rsplit('/').next().unwrap_or_default().to_string(),
            path: path.to_string(),
            name: path.to_uppercase(),
            lft,
            rgt,
            depth,
        }
    }

    #[test]
    fn test_leaf_and_containment() {
        let root = entry("a", 1, 28, 0);
        let c = entry("a/c", 6, 19, 1);
        let m = entry("a/c/f/j/m", 11, 12, 4);

        assert!(m.is_leaf());
        assert!(!c.is_leaf());
        assert!(root.is_ancestor_of(&c));
        assert!(c.is_ancestor_of(&m));
        assert!(!m.is_ancestor_of(&c));
        assert!(!c.is_ancestor_of(&c));
        assert_eq!(root.descendant_count(), 13);
        assert_eq!(m.descendant_count(), 0);
    }

    #[test]
    fn test_node_input_deserialize_without_children() {
        let json = r#"{"segment":"a","name":"Root"}"#;
        let node: CatalogNodeInput = serde_json::from_str(json).unwrap();
        assert_eq!(node, CatalogNodeInput::new("a", "Root"));
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = CatalogRecord {
            id: 7,
            uuid: Uuid::nil(),
            entry: entry("a/b", 2, 5, 1),
            created_at: 1,
            updated_at: 2,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["path"], "a/b");
        assert_eq!(value["lft"], 2);
        assert_eq!(value["rgt"], 5);
    }
}
