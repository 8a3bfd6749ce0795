//! The general analysis pass.
//!
//! One run splits the document by the priority range, walks the nodes inside
//! it with every visitor, commits those results right away, then walks the
//! remaining nodes and commits the rest when the run completes. A canceled
//! run restores whatever the early commit replaced and asks the scheduler to
//! try again later.

use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use text_size::TextRange;
use uuid::Uuid;

use super::HighlightingPass;
use super::ProgressablePass;
use super::injected::InjectedAnalysis;
use crate::config::{ConfigError, PassConfig};
use crate::highlight::diagnostic::{Diagnostic, DiagnosticSink};
use crate::highlight::divider::{DivideOptions, Divided, divide};
use crate::highlight::extract::ElementFilter;
use crate::highlight::host::{HighlightStore, Problem, ProblemTracker, Scheduler};
use crate::highlight::injection::{InjectedDocument, InjectionProvider, NoInjections};
use crate::highlight::status::FileStatusMap;
use crate::highlight::todo::{RegexTodoScanner, TodoScanner, todo_diagnostic};
use crate::highlight::visitor::{
    AnalyzeBody, NodeVisitor, Visitor, VisitorRegistry, prepare_visitors,
};
use crate::progress::{Cancellable, Cancelled, ProgressToken};
use crate::syntax::{Document, NodeId, SyntaxTree};

// ============================================================================
// CONTEXT
// ============================================================================

/// Collaborators and settings shared by every run of the pass.
pub struct PassContext {
    registry: Arc<dyn VisitorRegistry>,
    store: Arc<dyn HighlightStore>,
    problems: Arc<dyn ProblemTracker>,
    scheduler: Arc<dyn Scheduler>,
    todo: Arc<dyn TodoScanner>,
    injections: Arc<dyn InjectionProvider>,
    statuses: Arc<FileStatusMap>,
    filters: Vec<Arc<dyn ElementFilter>>,
    config: PassConfig,
}

impl PassContext {
    /// Create a context whose TODO scanner is compiled from `config`.
    pub fn new(
        config: PassConfig,
        registry: Arc<dyn VisitorRegistry>,
        store: Arc<dyn HighlightStore>,
        problems: Arc<dyn ProblemTracker>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self, ConfigError> {
        let todo = RegexTodoScanner::from_config(&config)?;
        Ok(Self {
            registry,
            store,
            problems,
            scheduler,
            todo: Arc::new(todo),
            injections: Arc::new(NoInjections),
            statuses: Arc::new(FileStatusMap::new()),
            filters: Vec::new(),
            config,
        })
    }

    pub fn with_todo_scanner(mut self, todo: Arc<dyn TodoScanner>) -> Self {
        self.todo = todo;
        self
    }

    pub fn with_injections(mut self, injections: Arc<dyn InjectionProvider>) -> Self {
        self.injections = injections;
        self
    }

    /// Share a status map with other contexts or with the caller.
    pub fn with_statuses(mut self, statuses: Arc<FileStatusMap>) -> Self {
        self.statuses = statuses;
        self
    }

    /// Add a filter deciding which subtrees the extractor descends into.
    pub fn with_filter(mut self, filter: Arc<dyn ElementFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn config(&self) -> &PassConfig {
        &self.config
    }

    pub fn statuses(&self) -> &Arc<FileStatusMap> {
        &self.statuses
    }

    /// Run one complete pass over `document`.
    ///
    /// `Err(Cancelled)` means the run was canceled or aborted; the store is
    /// left as it was and a restart has been requested.
    pub fn run(
        self: &Arc<Self>,
        document: &Document,
        priority: TextRange,
        full_pass: bool,
        token: &ProgressToken,
    ) -> Cancellable<()> {
        let pass = GeneralPass::new(Arc::clone(self), document.clone(), priority, full_pass);
        ProgressablePass::new(pass, token.clone()).run()
    }
}

// ============================================================================
// RUN STATE
// ============================================================================

/// Everything one run accumulates. Allocated fresh by every `collect`.
#[derive(Default)]
struct RunState {
    seen: IndexSet<Diagnostic>,
    skip: FxHashSet<NodeId>,
    inside: Vec<Diagnostic>,
    outside: Vec<Diagnostic>,
    error_found: bool,
    has_error_element: bool,
}

impl RunState {
    /// Record a diagnostic unless an equal one was already seen.
    fn accept(
        &mut self,
        diagnostic: Diagnostic,
        inside: bool,
        priority: TextRange,
        skip_parent: Option<NodeId>,
    ) {
        if !self.seen.insert(diagnostic.clone()) {
            return;
        }
        if diagnostic.is_error() {
            self.error_found = true;
            if let Some(parent) = skip_parent {
                self.skip.insert(parent);
            }
        }
        if inside && priority.contains_range(diagnostic.range) {
            self.inside.push(diagnostic);
        } else {
            self.outside.push(diagnostic);
        }
    }
}

/// Results of a completed `collect`, waiting for `apply`.
struct Collected {
    outside: Vec<Diagnostic>,
    errors: Vec<Diagnostic>,
    error_found: bool,
    has_error_element: bool,
}

// ============================================================================
// PASS
// ============================================================================

/// One run of the general pass over a document snapshot.
pub struct GeneralPass {
    context: Arc<PassContext>,
    document: Document,
    priority: TextRange,
    restrict: TextRange,
    full_pass: bool,
    dumb_mode: bool,
    /// Store content replaced by the inside commit, until the run ends.
    rollback: Option<Vec<Diagnostic>>,
    collected: Option<Collected>,
}

impl GeneralPass {
    pub fn new(
        context: Arc<PassContext>,
        document: Document,
        priority: TextRange,
        full_pass: bool,
    ) -> Self {
        let restrict = document.full_range();
        Self {
            context,
            document,
            priority,
            restrict,
            full_pass,
            dumb_mode: false,
            rollback: None,
            collected: None,
        }
    }

    /// Analyze only `range` instead of the whole document.
    pub fn with_restrict_range(mut self, range: TextRange) -> Self {
        self.restrict = range;
        self
    }

    /// Run without index-dependent visitors and without the TODO scan.
    pub fn with_dumb_mode(mut self, dumb_mode: bool) -> Self {
        self.dumb_mode = dumb_mode;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// A full pass over exactly the whole document.
    fn is_whole_file(&self) -> bool {
        self.full_pass && self.restrict == self.document.full_range()
    }

    fn collect_run(&mut self, progress: &ProgressToken) -> Cancellable<()> {
        let context = Arc::clone(&self.context);
        let config = &context.config;
        let doc_id = self.document.id();

        let whole_file = self.is_whole_file();
        let mut run = RunState {
            error_found: !whole_file && context.statuses.was_error_found(doc_id),
            has_error_element: !whole_file && context.statuses.has_error_element(doc_id),
            ..RunState::default()
        };

        let divided = divide(
            &self.document,
            self.priority,
            self.restrict,
            &DivideOptions {
                include_all_ancestors: config.include_all_ancestors,
                filters: &context.filters,
                injections: context.injections.as_ref(),
            },
            progress,
        )?;

        if !self.dumb_mode {
            for item in context.todo.find_markers(&self.document, self.restrict) {
                run.accept(todo_diagnostic(&item), true, self.priority, None);
            }
        }

        let mut visitors = prepare_visitors(
            context.registry.applicable_visitors(&self.document, self.dumb_mode),
            &self.document,
        );
        progress.add_limit((divided.node_count() * visitors.len()) as u64);

        let injected = InjectedAnalysis {
            registry: context.registry.as_ref(),
            todo: (!self.dumb_mode).then_some(context.todo.as_ref()),
            dumb_mode: self.dumb_mode,
            full_pass: self.full_pass,
            highlight_fragments: config.highlight_injected_fragments,
            parallel: config.parallel_injections,
        };

        tracing::debug!(
            inside = divided.inside.len(),
            outside = divided.outside.len(),
            injected = divided.inside_injected.len() + divided.outside_injected.len(),
            visitors = visitors.len(),
            "[PASS] divided"
        );

        // Inside the priority range: visible as soon as it is done.
        self.run_visitors(&mut visitors, &divided.inside, true, &mut run, progress)?;
        self.run_injected(&injected, &divided.inside_injected, &mut run, true, progress)?;
        progress.check_canceled()?;

        let inside = std::mem::take(&mut run.inside);
        tracing::debug!(count = inside.len(), "[PASS] committing inside");
        let previous = context
            .store
            .replace_in_range(doc_id, self.priority, inside);
        self.rollback = Some(previous);

        // The rest of the document: committed by `apply`.
        let Divided {
            outside,
            outside_injected,
            ..
        } = divided;
        self.run_visitors(&mut visitors, &outside, false, &mut run, progress)?;
        self.run_injected(&injected, &outside_injected, &mut run, false, progress)?;

        let errors = run.seen.iter().filter(|d| d.is_error()).cloned().collect();
        self.collected = Some(Collected {
            outside: run.outside,
            errors,
            error_found: run.error_found,
            has_error_element: run.has_error_element,
        });
        Ok(())
    }

    /// Let every visitor walk `nodes`, each wrapped in its `analyze`.
    fn run_visitors(
        &self,
        visitors: &mut [Box<dyn Visitor>],
        nodes: &[NodeId],
        inside: bool,
        run: &mut RunState,
        progress: &ProgressToken,
    ) -> Cancellable<()> {
        let tree = self.document.tree();
        let cancelled = Cell::new(false);

        for visitor in visitors.iter_mut() {
            let mut walk = |node_visitor: &mut dyn NodeVisitor| {
                self.walk(tree, nodes, inside, node_visitor, run, progress)
            };
            let completed = visitor.analyze(
                AnalyzeBody::new(&mut walk, &cancelled),
                self.full_pass,
                &self.document,
            );
            if cancelled.get() {
                return Err(Cancelled);
            }
            if !completed {
                tracing::warn!("[PASS] visitor could not complete, aborting run");
                return Err(Cancelled);
            }
        }
        Ok(())
    }

    fn walk(
        &self,
        tree: &SyntaxTree,
        nodes: &[NodeId],
        inside: bool,
        visitor: &mut dyn NodeVisitor,
        run: &mut RunState,
        progress: &ProgressToken,
    ) -> Cancellable<()> {
        let force_parents = self.context.config.force_highlight_parents;
        let mut sink = DiagnosticSink::new();

        for &node in nodes {
            progress.check_canceled()?;
            progress.advance(1);

            // An error below already covers this subtree. The root is always
            // visited so file-level diagnostics survive.
            if node != tree.root() && run.skip.contains(&node) && tree.has_children(node) {
                if let Some(parent) = tree.parent(node) {
                    run.skip.insert(parent);
                }
                continue;
            }
            if tree.is_error(node) {
                run.has_error_element = true;
            }

            visitor.visit(tree.node(node), &mut sink);
            let skip_parent = if force_parents { None } else { tree.parent(node) };
            for diagnostic in sink.drain() {
                run.accept(diagnostic, inside, self.priority, skip_parent);
            }
        }
        Ok(())
    }

    fn run_injected(
        &self,
        analysis: &InjectedAnalysis<'_>,
        documents: &[Arc<InjectedDocument>],
        run: &mut RunState,
        inside: bool,
        progress: &ProgressToken,
    ) -> Cancellable<()> {
        for diagnostic in analysis.run(documents, progress)? {
            run.accept(diagnostic, inside, self.priority, None);
        }
        Ok(())
    }

    fn request_restart(&self, progress: &ProgressToken) {
        progress.cancel();
        let jitter = self.context.config.restart_jitter_ms as f64;
        let delay = Duration::from_millis((rand::random::<f64>() * jitter) as u64);
        tracing::debug!(
            document = %self.document.id(),
            delay_ms = delay.as_millis() as u64,
            "[PASS] canceled, restarting later"
        );
        self.context
            .scheduler
            .restart_later(self.document.id(), delay);
    }
}

impl HighlightingPass for GeneralPass {
    fn collect(&mut self, progress: &ProgressToken) -> Cancellable<()> {
        let run_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "general_pass",
            run = %run_id,
            document = %self.document.id(),
            priority = ?self.priority,
            full_pass = self.full_pass
        );
        let _guard = span.enter();

        self.rollback = None;
        self.collected = None;
        tracing::debug!("[PASS] started");
        self.collect_run(progress)
    }

    fn apply(&mut self, progress: &ProgressToken) {
        let Some(collected) = self.collected.take() else {
            return;
        };
        self.rollback = None;
        let context = &self.context;
        let doc_id = self.document.id();

        if !self.full_pass && progress.full_pass_applied() {
            tracing::debug!("[PASS] full pass already applied, keeping its results");
        } else {
            tracing::debug!(count = collected.outside.len(), "[PASS] committing outside");
            context.store.replace_outside_range(
                doc_id,
                self.priority,
                self.restrict,
                collected.outside,
            );
        }

        let whole_file = self.is_whole_file();
        if whole_file {
            context.store.clear_file_level(doc_id);
        }

        context
            .statuses
            .set_has_error_element(doc_id, collected.has_error_element);
        if self.full_pass {
            context
                .statuses
                .set_error_found(doc_id, collected.error_found);
            progress.mark_full_pass_applied();

            let problems = collected
                .errors
                .into_iter()
                .map(|diagnostic| Problem {
                    document: doc_id,
                    diagnostic,
                    has_error_element: collected.has_error_element,
                })
                .collect();
            if whole_file {
                context.problems.report_all(doc_id, problems);
            } else {
                context.problems.report_merge(doc_id, problems);
            }
        }
        tracing::debug!(document = %doc_id, "[PASS] finished");
    }

    fn abandon(&mut self, progress: &ProgressToken) {
        self.collected = None;
        if let Some(previous) = self.rollback.take() {
            tracing::debug!(count = previous.len(), "[PASS] restoring inside range");
            self.context
                .store
                .replace_in_range(self.document.id(), self.priority, previous);
        }
        self.request_restart(progress);
    }

    fn reports_progress(&self) -> bool {
        self.full_pass
    }
}
