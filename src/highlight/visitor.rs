//! Visitors: pluggable analyzers run by the pass.
//!
//! A visitor is created fresh for every run (the registry hands out new
//! instances), so it may keep per-run state but never state across runs.

use std::cell::Cell;

use super::diagnostic::DiagnosticSink;
use crate::progress::{Cancellable, Cancelled};
use crate::syntax::{Document, NodeRef};

/// Per-node half of a visitor.
pub trait NodeVisitor {
    /// Report diagnostics for `node` into `sink`.
    fn visit(&mut self, node: NodeRef<'_>, sink: &mut DiagnosticSink);
}

/// An analyzer producing diagnostics for the nodes it supports.
pub trait Visitor: NodeVisitor + Send {
    /// Whether this visitor applies to `document` at all.
    fn suitable_for_file(&self, document: &Document) -> bool;

    /// Position among visitors; lower runs first.
    fn order(&self) -> i32 {
        0
    }

    /// Wrap the node walk of one phase.
    ///
    /// Implementations prepare their state, call `body.run(self)` and clean
    /// up. Returning `false` means the visitor could not finish safely (a
    /// dependency changed mid-run) and aborts the whole pass.
    fn analyze(&mut self, body: AnalyzeBody<'_>, full_pass: bool, document: &Document) -> bool;
}

/// The node walk handed to [`Visitor::analyze`].
pub struct AnalyzeBody<'a> {
    walk: &'a mut dyn FnMut(&mut dyn NodeVisitor) -> Cancellable<()>,
    cancelled: &'a Cell<bool>,
}

impl<'a> AnalyzeBody<'a> {
    pub(crate) fn new(
        walk: &'a mut dyn FnMut(&mut dyn NodeVisitor) -> Cancellable<()>,
        cancelled: &'a Cell<bool>,
    ) -> Self {
        Self { walk, cancelled }
    }

    /// Walk the nodes with `visitor`.
    ///
    /// Returns `false` if the walk was canceled. The cancellation is recorded
    /// outside the visitor and still aborts the run whatever `analyze`
    /// returns.
    pub fn run(self, visitor: &mut dyn NodeVisitor) -> bool {
        let walk = self.walk;
        match walk(visitor) {
            Ok(()) => true,
            Err(Cancelled) => {
                self.cancelled.set(true);
                false
            }
        }
    }
}

/// Supplies the visitors applicable to a document.
///
/// Returned visitors need not be filtered by `suitable_for_file` nor sorted;
/// the pass does both.
pub trait VisitorRegistry: Send + Sync {
    fn applicable_visitors(&self, document: &Document, dumb_mode: bool) -> Vec<Box<dyn Visitor>>;
}

/// Keep the suitable visitors, ordered by ascending [`Visitor::order`].
///
/// The sort is stable, so visitors with equal order keep registry order.
pub fn prepare_visitors(
    mut visitors: Vec<Box<dyn Visitor>>,
    document: &Document,
) -> Vec<Box<dyn Visitor>> {
    visitors.retain(|visitor| visitor.suitable_for_file(document));
    visitors.sort_by_key(|visitor| visitor.order());
    visitors
}
