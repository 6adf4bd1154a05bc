//! In-memory category tree
//!
//! Nodes live in an arena owned by [`CategoryTree`]. A parent owns its
//! children as an ordered list of [`NodeId`] handles; the child's parent link
//! is a handle back into the same arena, so it can never outlive the tree.

use shared::models::catalog::{CatalogNodeInput, CatalogNodeView};

/// Handle to a node inside one [`CategoryTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Nested-set position, assigned by the encoder or read back from storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    pub path: String,
    pub lft: i32,
    pub rgt: i32,
    pub depth: i32,
}

/// Category node
#[derive(Debug, Clone)]
pub struct Node {
    pub segment: String,
    pub name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    position: Option<Position>,
}

impl Node {
    /// Detached node: no parent, no children, no position
    pub fn new(segment: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            name: name.into(),
            parent: None,
            children: Vec::new(),
            position: None,
        }
    }

    pub(crate) fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Arena-backed category tree, root at [`CategoryTree::root`]
#[derive(Debug, Clone)]
pub struct CategoryTree {
    nodes: Vec<Node>,
}

impl CategoryTree {
    pub fn new(mut root: Node) -> Self {
        root.parent = None;
        root.children.clear();
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Never zero: the root is always present
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Append `child` as the last child of `parent` and link it back.
    ///
    /// Only the node itself is attached; any children or position it carried
    /// are dropped.
    pub fn add_child(&mut self, parent: NodeId, mut child: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        child.parent = Some(parent);
        child.children.clear();
        self.nodes.push(child);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.node(id).is_root()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).is_leaf()
    }

    pub fn find_child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).segment == segment)
    }

    /// Resolve a slash-joined path by walking child segments from the root.
    ///
    /// The path includes the root segment, except for an implicit root with
    /// an empty segment whose own path is `""`.
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        let segments: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };

        let root = self.root();
        let rest = if self.node(root).segment.is_empty() {
            &segments[..]
        } else {
            match segments.split_first() {
                Some((first, rest)) if *first == self.node(root).segment => rest,
                _ => return None,
            }
        };

        let mut cur = root;
        for segment in rest {
            cur = self.find_child(cur, segment)?;
        }
        Some(cur)
    }

    /// Node handles in pre-order (parent before children, siblings in order)
    pub fn pre_order(&self) -> Vec<NodeId> {
        self.subtree(self.root())
    }

    /// `id` followed by all of its descendants, in pre-order
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    /// Ancestors of `id`, root first, excluding `id` itself
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = self.node(id).parent;
        while let Some(p) = cur {
            out.push(p);
            cur = self.node(p).parent;
        }
        out.reverse();
        out
    }

    /// Build a tree from the publish payload, preserving child order
    pub fn from_input(input: &CatalogNodeInput) -> Self {
        let mut tree = Self::new(Node::new(&input.segment, &input.name));
        let mut stack: Vec<(NodeId, &CatalogNodeInput)> = vec![(tree.root(), input)];
        while let Some((id, src)) = stack.pop() {
            for child in &src.nodes {
                let child_id = tree.add_child(id, Node::new(&child.segment, &child.name));
                stack.push((child_id, child));
            }
        }
        tree
    }

    /// Convert back to the publish shape (positions dropped)
    pub fn to_input(&self) -> CatalogNodeInput {
        self.input_at(self.root())
    }

    fn input_at(&self, id: NodeId) -> CatalogNodeInput {
        let node = self.node(id);
        CatalogNodeInput {
            segment: node.segment.clone(),
            name: node.name.clone(),
            nodes: node.children.iter().map(|&c| self.input_at(c)).collect(),
        }
    }

    /// Fetch shape of the subtree rooted at `id`
    pub fn view(&self, id: NodeId) -> CatalogNodeView {
        let node = self.node(id);
        let position = node.position.clone().unwrap_or_default();
        CatalogNodeView {
            segment: node.segment.clone(),
            name: node.name.clone(),
            path: position.path,
            lft: position.lft,
            rgt: position.rgt,
            depth: position.depth,
            nodes: node.children.iter().map(|&c| self.view(c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CategoryTree {
        let mut tree = CategoryTree::new(Node::new("a", "A"));
        let root = tree.root();
        let b = tree.add_child(root, Node::new("b", "B"));
        tree.add_child(b, Node::new("e", "E"));
        let c = tree.add_child(root, Node::new("c", "C"));
        tree.add_child(c, Node::new("f", "F"));
        tree.add_child(c, Node::new("g", "G"));
        tree
    }

    #[test]
    fn test_new_node_is_detached() {
        let node = Node::new("a", "A");
        assert!(node.is_root());
        assert!(node.is_leaf());
        assert!(node.position().is_none());
    }

    #[test]
    fn test_add_child_links_parent() {
        let tree = sample();
        let root = tree.root();
        let b = tree.find_child(root, "b").unwrap();

        assert!(tree.is_root(root));
        assert!(!tree.is_root(b));
        assert_eq!(tree.node(b).parent(), Some(root));
        assert!(!tree.is_leaf(b));
        assert_eq!(tree.node_count(), 6);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let tree = sample();
        let segments: Vec<&str> = tree
            .node(tree.root())
            .children()
            .iter()
            .map(|&c| tree.node(c).segment.as_str())
            .collect();
        assert_eq!(segments, vec!["b", "c"]);
    }

    #[test]
    fn test_find_by_path() {
        let tree = sample();
        let g = tree.find_by_path("a/c/g").unwrap();
        assert_eq!(tree.node(g).segment, "g");
        assert_eq!(tree.find_by_path("a"), Some(tree.root()));
        assert!(tree.find_by_path("a/c/x").is_none());
        assert!(tree.find_by_path("z/c").is_none());
        assert!(tree.find_by_path("").is_none());
    }

    #[test]
    fn test_find_by_path_with_implicit_root() {
        let mut tree = CategoryTree::new(Node::new("", "Catalog"));
        let root = tree.root();
        let shoes = tree.add_child(root, Node::new("shoes", "Shoes"));
        let boots = tree.add_child(shoes, Node::new("boots", "Boots"));

        assert_eq!(tree.find_by_path(""), Some(root));
        assert_eq!(tree.find_by_path("shoes/boots"), Some(boots));
    }

    #[test]
    fn test_pre_order_and_ancestors() {
        let tree = sample();
        let order: Vec<&str> = tree
            .pre_order()
            .into_iter()
            .map(|id| tree.node(id).segment.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "e", "c", "f", "g"]);

        let f = tree.find_by_path("a/c/f").unwrap();
        let ancestors: Vec<&str> = tree
            .ancestors(f)
            .into_iter()
            .map(|id| tree.node(id).segment.as_str())
            .collect();
        assert_eq!(ancestors, vec!["a", "c"]);

        let c = tree.find_by_path("a/c").unwrap();
        let below: Vec<&str> = tree
            .subtree(c)
            .into_iter()
            .map(|id| tree.node(id).segment.as_str())
            .collect();
        assert_eq!(below, vec!["c", "f", "g"]);
    }

    #[test]
    fn test_input_round_trip() {
        let input = CatalogNodeInput::new("a", "A")
            .with_child(CatalogNodeInput::new("b", "B").with_child(CatalogNodeInput::new("e", "E")))
            .with_child(CatalogNodeInput::new("c", "C"));
        let tree = CategoryTree::from_input(&input);
        assert_eq!(tree.to_input(), input);
    }
}
