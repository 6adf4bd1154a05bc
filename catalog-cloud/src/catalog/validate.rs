//! Publish-time validation of a catalog tree
//!
//! The encoder trusts its input, so everything it relies on is checked here:
//! segment charset, non-empty segments and sibling uniqueness.

use std::collections::HashSet;

use shared::models::catalog::CatalogNodeInput;
use thiserror::Error;

use super::nested_set::join_path;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty segment under '{parent}'")]
    EmptySegment { parent: String },

    #[error("illegal segment '{segment}' under '{parent}': only [A-Za-z0-9._-] allowed")]
    IllegalSegment { parent: String, segment: String },

    #[error("duplicate segment '{segment}' under '{parent}'")]
    DuplicateSibling { parent: String, segment: String },
}

/// `[A-Za-z0-9._-]+`
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// Validate a publish payload.
///
/// The root may carry an empty segment (an implicit anonymous root); every
/// other node needs a legal, sibling-unique segment.
pub fn validate_tree(root: &CatalogNodeInput) -> Result<(), ValidationError> {
    if !root.segment.is_empty() && !is_valid_segment(&root.segment) {
        return Err(ValidationError::IllegalSegment {
            parent: String::new(),
            segment: root.segment.clone(),
        });
    }

    let mut stack: Vec<(String, &CatalogNodeInput)> = vec![(root.segment.clone(), root)];
    while let Some((path, node)) = stack.pop() {
        let mut seen = HashSet::with_capacity(node.nodes.len());
        for child in &node.nodes {
            if child.segment.is_empty() {
                return Err(ValidationError::EmptySegment { parent: path });
            }
            if !is_valid_segment(&child.segment) {
                return Err(ValidationError::IllegalSegment {
                    parent: path,
                    segment: child.segment.clone(),
                });
            }
            if !seen.insert(child.segment.as_str()) {
                return Err(ValidationError::DuplicateSibling {
                    parent: path,
                    segment: child.segment.clone(),
                });
            }
            stack.push((join_path(&path, &child.segment), child));
        }
    }
    Ok(())
}
