//! Catalog hierarchy engine
//!
//! - [`node`]: arena-backed category tree
//! - [`nested_set`]: tree ⇄ nested-set listing
//! - [`validate`]: publish-time checks the encoder relies on

pub mod nested_set;
pub mod node;
pub mod validate;

pub use nested_set::{NestedSetError, build_subtree, build_tree, join_path};
pub use node::{CategoryTree, Node, NodeId, Position};
pub use validate::{ValidationError, is_valid_segment, validate_tree};
