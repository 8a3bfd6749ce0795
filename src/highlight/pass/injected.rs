//! Analysis of injected documents, one task per document.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use rayon::prelude::*;

use crate::highlight::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink};
use crate::highlight::extract::elements_in_range;
use crate::highlight::injection::{InjectedDocument, translate};
use crate::highlight::todo::{TodoScanner, todo_diagnostic};
use crate::highlight::visitor::{AnalyzeBody, NodeVisitor, VisitorRegistry, prepare_visitors};
use crate::progress::{Cancellable, Cancelled, ProgressToken};

/// Settings shared by every injected-document task of one run.
pub(super) struct InjectedAnalysis<'a> {
    pub registry: &'a dyn VisitorRegistry,
    /// `None` skips marker scanning (dumb mode).
    pub todo: Option<&'a dyn TodoScanner>,
    pub dumb_mode: bool,
    pub full_pass: bool,
    pub highlight_fragments: bool,
    pub parallel: bool,
}

impl InjectedAnalysis<'_> {
    /// Analyze `documents` and return their diagnostics in host coordinates.
    ///
    /// Fails if any task is canceled, aborted by a visitor, or panics.
    pub(super) fn run(
        &self,
        documents: &[Arc<InjectedDocument>],
        progress: &ProgressToken,
    ) -> Cancellable<Vec<Diagnostic>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let task = |injected: &Arc<InjectedDocument>| {
            panic::catch_unwind(AssertUnwindSafe(|| self.analyze(injected, progress)))
        };
        let outcomes: Vec<_> = if self.parallel {
            documents.par_iter().map(task).collect()
        } else {
            documents.iter().map(task).collect()
        };

        let mut diagnostics = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(Ok(found)) => diagnostics.extend(found),
                Ok(Err(Cancelled)) => return Err(Cancelled),
                Err(_) => {
                    tracing::error!("[PASS] injected document task panicked");
                    return Err(Cancelled);
                }
            }
        }
        Ok(diagnostics)
    }

    fn analyze(
        &self,
        injected: &InjectedDocument,
        progress: &ProgressToken,
    ) -> Cancellable<Vec<Diagnostic>> {
        progress.check_canceled()?;
        let document = injected.document();
        let tree = document.tree();
        let nodes = elements_in_range(tree, document.full_range(), true, &[], progress)?;
        let mut visitors = prepare_visitors(
            self.registry.applicable_visitors(document, self.dumb_mode),
            document,
        );

        let mut sink = DiagnosticSink::new();
        let cancelled = Cell::new(false);
        for visitor in &mut visitors {
            let mut walk = |node_visitor: &mut dyn NodeVisitor| -> Cancellable<()> {
                for &node in &nodes {
                    progress.check_canceled()?;
                    node_visitor.visit(tree.node(node), &mut sink);
                }
                Ok(())
            };
            let completed = visitor.analyze(
                AnalyzeBody::new(&mut walk, &cancelled),
                self.full_pass,
                document,
            );
            if cancelled.get() {
                return Err(Cancelled);
            }
            if !completed {
                tracing::warn!(
                    "[PASS] visitor aborted analysis of injected {}",
                    injected.id()
                );
                return Err(Cancelled);
            }
        }

        let mut host = Vec::new();
        for diagnostic in sink.drain() {
            host.extend(translate(&diagnostic, injected));
        }

        if let Some(todo) = self.todo {
            for item in todo.find_markers(document, document.full_range()) {
                let marker = todo_diagnostic(&item);
                host.extend(
                    injected
                        .host_fragments(item.range)
                        .into_iter()
                        .map(|range| marker.clone().with_range(range)),
                );
            }
        }

        if self.highlight_fragments {
            for anchor in injected.anchors() {
                if anchor.host.is_empty() {
                    continue;
                }
                let text = document.slice(anchor.injected).unwrap_or_default();
                host.push(
                    Diagnostic::info(anchor.host, text)
                        .with_kind(DiagnosticKind::InjectedFragment),
                );
            }
        }

        Ok(host)
    }
}
