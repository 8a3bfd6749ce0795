//! Index-addressed syntax tree.
//!
//! Nodes live in one arena owned by [`SyntaxTree`]; a node refers to its
//! parent and children by [`NodeId`]. Parent links are plain indices, so the
//! tree has no reference cycles and can be shared across threads behind an
//! `Arc`.

use rowan::SyntaxKind;
use text_size::{TextRange, TextSize};
use thiserror::Error;

/// Index of a node inside a [`SyntaxTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Position of the node inside the arena (pre-order index).
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Violations of the tree invariants detected while building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A child range is not contained in its parent's range.
    #[error("child {child:?} is outside parent {parent:?}")]
    ChildOutsideParent { parent: TextRange, child: TextRange },

    /// Siblings overlap or are not ordered by start offset.
    #[error("sibling {next:?} overlaps or precedes {previous:?}")]
    UnorderedSiblings { previous: TextRange, next: TextRange },

    /// `finish_node` without a matching `start_node`, or nodes left open.
    #[error("unbalanced builder events")]
    Unbalanced,

    /// The builder produced no root node, or more than one.
    #[error("tree must have exactly one root")]
    NoSingleRoot,
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: SyntaxKind,
    range: TextRange,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    index_in_parent: u32,
    depth: u32,
    is_error: bool,
}

/// Arena of syntax nodes with one root.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

/// Borrowed view of one node, handed to visitors.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a SyntaxTree,
    id: NodeId,
}

impl SyntaxTree {
    /// The root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node as a [`NodeRef`].
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.nodes[id.index()].kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id.index()].range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        !self.children(id).is_empty()
    }

    /// Sibling following `id` under the same parent.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let data = &self.nodes[id.index()];
        let parent = data.parent?;
        self.children(parent)
            .get(data.index_in_parent as usize + 1)
            .copied()
    }

    pub fn depth(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].depth
    }

    /// True if the parser marked this node as an error element.
    pub fn is_error(&self, id: NodeId) -> bool {
        self.nodes[id.index()].is_error
    }

    /// Iterate from `id` (inclusive) up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&node| self.parent(node))
    }

    /// Find the deepest node whose range contains `offset`.
    ///
    /// Returns `None` when the offset is outside the root range. Empty nodes
    /// never contain an offset.
    pub fn find_leaf_at(&self, offset: TextSize) -> Option<NodeId> {
        let mut current = self.root();
        if !self.range(current).contains(offset) {
            return None;
        }
        loop {
            let children = self.children(current);
            let idx = children.partition_point(|&child| self.range(child).end() <= offset);
            match children.get(idx) {
                Some(&child) if self.range(child).contains(offset) => current = child,
                _ => return Some(current),
            }
        }
    }

    /// Lowest common ancestor of two nodes.
    pub fn common_ancestor(&self, mut a: NodeId, mut b: NodeId) -> NodeId {
        while self.depth(a) > self.depth(b) {
            a = self.parent(a).unwrap_or(a);
        }
        while self.depth(b) > self.depth(a) {
            b = self.parent(b).unwrap_or(b);
        }
        while a != b {
            match (self.parent(a), self.parent(b)) {
                (Some(pa), Some(pb)) => {
                    a = pa;
                    b = pb;
                }
                _ => return self.root(),
            }
        }
        a
    }

    /// All node ids in pre-order.
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::from_index)
    }
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    pub fn kind(&self) -> SyntaxKind {
        self.tree.kind(self.id)
    }

    pub fn range(&self) -> TextRange {
        self.tree.range(self.id)
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.tree.parent(self.id).map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let tree = self.tree;
        tree.children(self.id).iter().map(move |&id| tree.node(id))
    }

    pub fn is_error(&self) -> bool {
        self.tree.is_error(self.id)
    }

    pub fn is_leaf(&self) -> bool {
        !self.tree.has_children(self.id)
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.range())
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builds a [`SyntaxTree`] from nested start/finish events.
///
/// Invariants are checked as nodes are attached: a child must lie inside its
/// parent and siblings must be disjoint and ordered.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
    error: Option<TreeError>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a composite node; children follow until [`finish_node`](Self::finish_node).
    pub fn start_node(&mut self, kind: SyntaxKind, range: TextRange) -> NodeId {
        self.push(kind, range, false, true)
    }

    /// Open a composite node flagged as a parse error.
    pub fn start_error_node(&mut self, kind: SyntaxKind, range: TextRange) -> NodeId {
        self.push(kind, range, true, true)
    }

    pub fn finish_node(&mut self) {
        if self.open.pop().is_none() {
            self.error.get_or_insert(TreeError::Unbalanced);
        }
    }

    /// Add a childless node.
    pub fn leaf(&mut self, kind: SyntaxKind, range: TextRange) -> NodeId {
        self.push(kind, range, false, false)
    }

    pub fn error_leaf(&mut self, kind: SyntaxKind, range: TextRange) -> NodeId {
        self.push(kind, range, true, false)
    }

    pub fn finish(self) -> Result<SyntaxTree, TreeError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.open.is_empty() {
            return Err(TreeError::Unbalanced);
        }
        if self.nodes.is_empty() {
            return Err(TreeError::NoSingleRoot);
        }
        Ok(SyntaxTree { nodes: self.nodes })
    }

    fn push(&mut self, kind: SyntaxKind, range: TextRange, is_error: bool, open: bool) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        let parent = self.open.last().copied();

        let (index_in_parent, depth) = match parent {
            Some(parent) => {
                self.check_child(parent, range);
                let data = &mut self.nodes[parent.index()];
                data.children.push(id);
                ((data.children.len() - 1) as u32, data.depth + 1)
            }
            None => {
                if !self.nodes.is_empty() {
                    self.error.get_or_insert(TreeError::NoSingleRoot);
                }
                (0, 0)
            }
        };

        self.nodes.push(NodeData {
            kind,
            range,
            parent,
            children: Vec::new(),
            index_in_parent,
            depth,
            is_error,
        });
        if open {
            self.open.push(id);
        }
        id
    }

    fn check_child(&mut self, parent: NodeId, range: TextRange) {
        let data = &self.nodes[parent.index()];
        if !data.range.contains_range(range) {
            self.error.get_or_insert(TreeError::ChildOutsideParent {
                parent: data.range,
                child: range,
            });
            return;
        }
        if let Some(&previous) = data.children.last() {
            let previous = self.nodes[previous.index()].range;
            if previous.end() > range.start() {
                self.error.get_or_insert(TreeError::UnorderedSiblings {
                    previous,
                    next: range,
                });
            }
        }
    }
}
