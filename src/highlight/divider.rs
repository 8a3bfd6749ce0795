//! Priority splitting: which work is visible now and which can wait.

use std::sync::Arc;

use text_size::TextRange;

use super::extract::{ElementFilter, elements_in_range};
use super::injection::{InjectedDocument, InjectionProvider, injected_documents};
use crate::progress::{Cancellable, ProgressToken};
use crate::syntax::{Document, NodeId};

/// Nodes and injected documents of one run, split by the priority range.
#[derive(Debug, Default, Clone)]
pub struct Divided {
    pub inside: Vec<NodeId>,
    pub outside: Vec<NodeId>,
    pub inside_injected: Vec<Arc<InjectedDocument>>,
    pub outside_injected: Vec<Arc<InjectedDocument>>,
}

impl Divided {
    /// Total number of host nodes to visit.
    pub fn node_count(&self) -> usize {
        self.inside.len() + self.outside.len()
    }
}

/// Inputs of [`divide`] besides the document and ranges.
pub struct DivideOptions<'a> {
    pub include_all_ancestors: bool,
    pub filters: &'a [Arc<dyn ElementFilter>],
    pub injections: &'a dyn InjectionProvider,
}

/// Split the nodes of `full_range` into those inside `priority` and the rest.
///
/// A host node is inside iff its range is contained in `priority`. An
/// injected document is inside iff every one of its host anchors is; a
/// document with no anchors counts as outside. Relative order of nodes is
/// preserved within each set. When extraction yields nothing the root is
/// used, so visitors always see at least the document node.
pub fn divide(
    document: &Document,
    priority: TextRange,
    full_range: TextRange,
    options: &DivideOptions<'_>,
    progress: &ProgressToken,
) -> Cancellable<Divided> {
    let tree = document.tree();
    let mut nodes = elements_in_range(
        tree,
        full_range,
        options.include_all_ancestors,
        options.filters,
        progress,
    )?;
    // Nothing under the range (e.g. an empty document): still analyze the root.
    if nodes.is_empty() && !tree.is_empty() {
        nodes.push(tree.root());
    }

    let (inside, outside): (Vec<NodeId>, Vec<NodeId>) = nodes
        .iter()
        .partition(|&&node| priority.contains_range(tree.range(node)));

    let injected = injected_documents(document, &nodes, options.injections, progress)?;
    let (inside_injected, outside_injected) = injected.into_iter().partition(|injected| {
        !injected.anchors().is_empty()
            && injected
                .host_ranges()
                .all(|host| priority.contains_range(host))
    });

    Ok(Divided {
        inside,
        outside,
        inside_injected,
        outside_injected,
    })
}
