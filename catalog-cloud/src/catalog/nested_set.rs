//! Nested-set codec
//!
//! Encoding walks the tree depth-first and hands out `lft` on the way down and
//! `rgt` on the way up, so a node's interval strictly contains the intervals
//! of all its descendants. Decoding replays a listing sorted by `lft` with a
//! cursor that tracks the node currently expecting children.

use shared::models::catalog::NestedSetEntry;
use thiserror::Error;

use super::node::{CategoryTree, Node, NodeId, Position};

/// Listing rejected by the tree builder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NestedSetError {
    #[error("listing is empty")]
    Empty,

    #[error("first record must have lft = 1, found {lft}")]
    RootNotFirst { lft: i32 },

    #[error("root record must have depth 0, found {depth}")]
    RootDepth { depth: i32 },

    #[error("record '{path}' has lft {lft} >= rgt {rgt}")]
    InvalidInterval { path: String, lft: i32, rgt: i32 },

    #[error("record '{path}' has no enclosing parent in the listing")]
    Orphan { path: String },

    #[error("record '{path}' expected lft {expected}, found {found}")]
    Gap {
        path: String,
        expected: i32,
        found: i32,
    },

    #[error("record '{path}' expected depth {expected}, found {found}")]
    DepthMismatch {
        path: String,
        expected: i32,
        found: i32,
    },

    #[error("record '{path}' expected path '{expected}'")]
    PathMismatch { path: String, expected: String },

    #[error("listing is incomplete: root rgt {rgt} does not cover {nodes} nodes")]
    Incomplete { rgt: i32, nodes: usize },
}

/// Join a parent path and a segment; an empty parent path yields the bare segment
pub fn join_path(parent_path: &str, segment: &str) -> String {
    if parent_path.is_empty() {
        segment.to_string()
    } else {
        format!("{parent_path}/{segment}")
    }
}

impl CategoryTree {
    /// Assign nested-set positions to every node and return the listing in
    /// pre-order (equivalently, sorted by `lft`).
    pub fn encode(&mut self) -> Vec<NestedSetEntry> {
        let mut listing = Vec::with_capacity(self.node_count());
        let root = self.root();
        self.generate_nested_set(root, 1, 0, "", &mut listing);
        listing
    }

    /// Encode the subtree at `id` starting from `lft`; returns `rgt + 1`.
    pub fn generate_nested_set(
        &mut self,
        id: NodeId,
        lft: i32,
        depth: i32,
        parent_path: &str,
        out: &mut Vec<NestedSetEntry>,
    ) -> i32 {
        let path = join_path(parent_path, &self.node(id).segment);

        // Reserve the pre-order slot; rgt is only known after the children
        let slot = out.len();
        out.push(NestedSetEntry {
            segment: self.node(id).segment.clone(),
            path: path.clone(),
            name: self.node(id).name.clone(),
            lft,
            rgt: 0,
            depth,
        });

        let mut rgt = lft + 1;
        let children = self.node(id).children().to_vec();
        for child in children {
            rgt = self.generate_nested_set(child, rgt, depth + 1, &path, out);
        }

        out[slot].rgt = rgt;
        self.node_mut(id).set_position(Position {
            path,
            lft,
            rgt,
            depth,
        });
        rgt + 1
    }
}

/// Rebuild a whole catalog from its listing.
///
/// The first record (by `lft`) is the root and must start at `lft = 1` with
/// depth 0.
pub fn build_tree(listing: Vec<NestedSetEntry>) -> Result<CategoryTree, NestedSetError> {
    assemble(listing, true)
}

/// Rebuild the subtree anchored at the first record of `listing`, as returned
/// by a `lft BETWEEN` range query. Numbering and depth are kept as stored.
pub fn build_subtree(listing: Vec<NestedSetEntry>) -> Result<CategoryTree, NestedSetError> {
    assemble(listing, false)
}

fn assemble(
    mut listing: Vec<NestedSetEntry>,
    whole_catalog: bool,
) -> Result<CategoryTree, NestedSetError> {
    if !listing.is_sorted_by_key(|e| e.lft) {
        listing.sort_by_key(|e| e.lft);
    }

    let mut records = listing.into_iter();
    let first = records.next().ok_or(NestedSetError::Empty)?;
    if whole_catalog {
        if first.lft != 1 {
            return Err(NestedSetError::RootNotFirst { lft: first.lft });
        }
        if first.depth != 0 {
            return Err(NestedSetError::RootDepth { depth: first.depth });
        }
    }
    check_interval(&first)?;

    let anchor_lft = first.lft;
    let mut tree = CategoryTree::new(node_from_entry(first));
    let mut context = Some(tree.root());
    let mut next_lft = anchor_lft + 1;

    for entry in records {
        check_interval(&entry)?;
        let ctx = context.ok_or_else(|| NestedSetError::Orphan {
            path: entry.path.clone(),
        })?;
        let parent = span(&tree, ctx).clone();

        if entry.lft != next_lft {
            return Err(NestedSetError::Gap {
                path: entry.path,
                expected: next_lft,
                found: entry.lft,
            });
        }
        if entry.rgt >= parent.rgt {
            return Err(NestedSetError::Orphan { path: entry.path });
        }
        if entry.depth != parent.depth + 1 {
            return Err(NestedSetError::DepthMismatch {
                path: entry.path,
                expected: parent.depth + 1,
                found: entry.depth,
            });
        }
        let expected_path = join_path(&parent.path, &entry.segment);
        if entry.path != expected_path {
            return Err(NestedSetError::PathMismatch {
                path: entry.path,
                expected: expected_path,
            });
        }

        let is_leaf = entry.is_leaf();
        let (lft, rgt) = (entry.lft, entry.rgt);
        let child = tree.add_child(ctx, node_from_entry(entry));

        if !is_leaf {
            context = Some(child);
            next_lft = lft + 1;
        } else if rgt == parent.rgt - 1 {
            // Last child of the context: climb until an ancestor still has room
            let mut closed = ctx;
            context = loop {
                match tree.node(closed).parent() {
                    Some(up) if span(&tree, closed).rgt == span(&tree, up).rgt - 1 => closed = up,
                    up => break up,
                }
            };
            next_lft = span(&tree, closed).rgt + 1;
        } else {
            next_lft = rgt + 1;
        }
    }

    let root = span(&tree, tree.root());
    let covered = (root.rgt - root.lft + 1) as usize;
    if covered != 2 * tree.node_count() || (tree.node_count() > 1 && context.is_some()) {
        return Err(NestedSetError::Incomplete {
            rgt: root.rgt,
            nodes: tree.node_count(),
        });
    }
    Ok(tree)
}

fn check_interval(entry: &NestedSetEntry) -> Result<(), NestedSetError> {
    if entry.lft >= entry.rgt || entry.lft < 1 {
        return Err(NestedSetError::InvalidInterval {
            path: entry.path.clone(),
            lft: entry.lft,
            rgt: entry.rgt,
        });
    }
    Ok(())
}

fn node_from_entry(entry: NestedSetEntry) -> Node {
    Node::new(entry.segment, entry.name).with_position(Position {
        path: entry.path,
        lft: entry.lft,
        rgt: entry.rgt,
        depth: entry.depth,
    })
}

// Every node added by the builder carries a position
fn span(tree: &CategoryTree, id: NodeId) -> &Position {
    static UNPLACED: Position = Position {
        path: String::new(),
        lft: 0,
        rgt: 0,
        depth: 0,
    };
    tree.node(id).position().unwrap_or(&UNPLACED)
}
