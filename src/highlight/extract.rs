//! Node extraction: the nodes relevant to a sub-range of a tree.
//!
//! The traversal is iterative. Three parallel stacks hold the element being
//! visited, the sibling to resume with, and the start offset recorded when a
//! composite was entered, so pathological nesting cannot overflow the call
//! stack. Nodes are emitted in post-order: children before their parents.

use std::sync::Arc;

use text_size::{TextRange, TextSize};

use crate::progress::{Cancellable, ProgressToken};
use crate::syntax::{NodeId, SyntaxTree};

/// Decides whether a node's children are worth visiting.
///
/// A rejected node is treated as a leaf: its subtree is skipped but the node
/// itself is still considered for inclusion.
pub trait ElementFilter: Send + Sync {
    fn accepts(&self, tree: &SyntaxTree, node: NodeId) -> bool;
}

impl<F> ElementFilter for F
where
    F: Fn(&SyntaxTree, NodeId) -> bool + Send + Sync,
{
    fn accepts(&self, tree: &SyntaxTree, node: NodeId) -> bool {
        self(tree, node)
    }
}

/// Collect the nodes of `tree` relevant to `range`.
///
/// Returns every node under the common parent of the range whose whole span
/// lies inside `range`, followed by the ancestor chain: every ancestor from
/// the common parent up to the root when `include_all_ancestors` is set,
/// otherwise only the root.
///
/// An empty range, or one that falls outside the tree, yields nothing.
pub fn elements_in_range(
    tree: &SyntaxTree,
    range: TextRange,
    include_all_ancestors: bool,
    filters: &[Arc<dyn ElementFilter>],
    progress: &ProgressToken,
) -> Cancellable<Vec<NodeId>> {
    let Some(common) = find_common_parent(tree, range) else {
        return Ok(Vec::new());
    };

    let mut result = elements_to_highlight(tree, common, range, filters, progress)?;

    // Only the common parent itself can already be in the result: every
    // strict ancestor is wider than the range.
    let common_included = range.contains_range(tree.range(common));
    let root = tree.root();
    if include_all_ancestors {
        let chain = tree.ancestors(common).take_while(|&node| node != root);
        for node in chain {
            if node != common || !common_included {
                result.push(node);
            }
        }
    }
    if common != root || !common_included {
        result.push(root);
    }

    Ok(result)
}

/// Lowest node spanning both ends of `range`, widened to the outermost node
/// with the same span.
pub fn find_common_parent(tree: &SyntaxTree, range: TextRange) -> Option<NodeId> {
    if range.is_empty() {
        return None;
    }
    let first = tree.find_leaf_at(range.start())?;
    let last = tree.find_leaf_at(range.end() - TextSize::from(1))?;

    let mut common = tree.common_ancestor(first, last);
    while let Some(parent) = tree.parent(common) {
        if tree.range(parent) != tree.range(common) {
            break;
        }
        common = parent;
    }
    Some(common)
}

enum Cursor {
    /// First visit of the current element.
    Enter,
    /// Back from a child; continue with this sibling.
    Resume(Option<NodeId>),
}

fn elements_to_highlight(
    tree: &SyntaxTree,
    common: NodeId,
    range: TextRange,
    filters: &[Arc<dyn ElementFilter>],
    progress: &ProgressToken,
) -> Cancellable<Vec<NodeId>> {
    let mut result = Vec::new();

    let mut elements: Vec<NodeId> = Vec::new();
    let mut siblings: Vec<Option<NodeId>> = Vec::new();
    let mut starts: Vec<TextSize> = Vec::new();

    let mut offset = tree.range(common).start();
    let mut element = common;
    let mut cursor = Cursor::Enter;

    loop {
        progress.check_canceled()?;

        let next = match cursor {
            Cursor::Enter => {
                offset = offset.max(tree.range(element).start());
                starts.push(offset);
                if filters.iter().all(|filter| filter.accepts(tree, element)) {
                    tree.first_child(element)
                } else {
                    None
                }
            }
            Cursor::Resume(next) => next,
        };

        match next {
            Some(child) if !tree.range(element).contains_range(tree.range(child)) => {
                debug_assert!(false, "child {child:?} escapes its parent {element:?}");
                tracing::warn!(
                    "[EXTRACT] skipping malformed subtree {:?} under {:?}",
                    tree.range(child),
                    tree.range(element)
                );
                cursor = Cursor::Resume(tree.next_sibling(child));
            }
            Some(child) => {
                elements.push(element);
                siblings.push(tree.next_sibling(child));
                element = child;
                cursor = Cursor::Enter;
            }
            None => {
                offset = offset.max(tree.range(element).end());
                let start = starts.pop().unwrap_or(offset);
                if range.start() <= start && offset <= range.end() {
                    result.push(element);
                }

                let Some(parent) = elements.pop() else {
                    break;
                };
                element = parent;
                cursor = Cursor::Resume(siblings.pop().flatten());
            }
        }
    }

    Ok(result)
}
