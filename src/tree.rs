//! Deep-syntax dependency tree model.
//!
//! Trees are arenas of nodes indexed by [`NodeId`]. Node 0 is always the
//! technical root (sentinel label, no parent); child order is left-to-right
//! surface order and is preserved by every operation. The search planners
//! never mutate a tree referenced by another search state: expansion goes
//! through [`SyntaxTree::with_child`], which clones and then attaches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a node within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[must_use]
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> usize {
        self.0
    }
}

/// Lexical/morphological label bundle of a node.
///
/// Opaque to the planners beyond equality, hashing and ordering; `lemma`
/// carries the content-word identity, `formeme` the surface-syntactic slot
/// (e.g. `n:subj`, `v:fin`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeLabel {
    pub lemma: String,
    pub formeme: String,
}

impl NodeLabel {
    pub fn new(lemma: impl Into<String>, formeme: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            formeme: formeme.into(),
        }
    }

    /// Sentinel label of the technical root.
    #[must_use]
    pub fn root() -> Self {
        Self {
            lemma: String::new(),
            formeme: String::new(),
        }
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.lemma.is_empty() && self.formeme.is_empty()
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.lemma, self.formeme)
    }
}

/// Which side of the existing siblings a new child is attached on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttachSide {
    /// Insert as the leftmost child.
    Left,
    /// Append as the rightmost child.
    Right,
}

/// One node of a syntax tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeNode {
    pub id: NodeId,
    /// `None` only for the technical root.
    pub parent: Option<NodeId>,
    /// Ordered left-to-right.
    pub children: Vec<NodeId>,
    pub label: NodeLabel,
}

/// A rooted ordered dependency tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyntaxTree {
    nodes: Vec<TreeNode>,
}

impl SyntaxTree {
    /// A tree containing only the technical root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode {
                id: NodeId::new(0),
                parent: None,
                children: Vec::new(),
                label: NodeLabel::root(),
            }],
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::new(0)
    }

    /// Total node count including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false // a tree always has its root
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// All node ids except the technical root.
    pub fn non_root_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().skip(1).map(|n| n.id)
    }

    /// Attach a new child under `parent`, on the given side of its existing
    /// children. Returns the new node's id.
    pub fn add_child(&mut self, parent: NodeId, side: AttachSide, label: NodeLabel) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(TreeNode {
            id,
            parent: Some(parent),
            children: Vec::new(),
            label,
        });
        let siblings = &mut self.nodes[parent.0].children;
        match side {
            AttachSide::Left => siblings.insert(0, id),
            AttachSide::Right => siblings.push(id),
        }
        id
    }

    /// Copy-on-expand: clone this tree and attach one new child. The clone's
    /// new node id is returned alongside the clone.
    #[must_use]
    pub fn with_child(
        &self,
        parent: NodeId,
        side: AttachSide,
        label: NodeLabel,
    ) -> (SyntaxTree, NodeId) {
        let mut next = self.clone();
        let id = next.add_child(parent, side, label);
        (next, id)
    }

    /// Depth of a node; the root has depth 0.
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.node(id).parent;
        while let Some(p) = current {
            depth += 1;
            current = self.node(p).parent;
        }
        depth
    }

    /// Number of siblings of a node (children of its parent, minus itself).
    #[must_use]
    pub fn sibling_count(&self, id: NodeId) -> usize {
        match self.node(id).parent {
            Some(p) => self.node(p).children.len().saturating_sub(1),
            None => 0,
        }
    }

    /// Label of a node's parent; the sentinel root label for depth-1 nodes.
    #[must_use]
    pub fn parent_label(&self, id: NodeId) -> NodeLabel {
        match self.node(id).parent {
            Some(p) => self.node(p).label.clone(),
            None => NodeLabel::root(),
        }
    }

    /// (parent label, child label, side) triples for every non-root node,
    /// in attachment order. Side is derived from the child's final position
    /// among its ordered siblings: the first half counts as left-attached.
    #[must_use]
    pub fn attachments(&self) -> Vec<(NodeLabel, NodeLabel, AttachSide)> {
        let mut out = Vec::with_capacity(self.nodes.len().saturating_sub(1));
        for node in self.nodes.iter().skip(1) {
            let parent = node.parent.expect("non-root node has a parent");
            let siblings = &self.node(parent).children;
            let pos = siblings
                .iter()
                .position(|&c| c == node.id)
                .expect("child listed under its parent");
            let side = if pos < siblings.len() / 2 {
                AttachSide::Left
            } else {
                AttachSide::Right
            };
            out.push((self.node(parent).label.clone(), node.label.clone(), side));
        }
        out
    }

    /// Canonical structural signature: the sorted multiset of
    /// (parent label, child label) pairs. Two partial trees with equal
    /// signatures are interchangeable for search purposes.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut pairs: Vec<String> = self
            .nodes
            .iter()
            .skip(1)
            .map(|n| format!("{}<{}", self.parent_label(n.id), n.label))
            .collect();
        pairs.sort();
        pairs.join("|")
    }
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}
