//! Collaborator fixtures for running the general pass end to end.

use std::sync::Arc;

use parking_lot::Mutex;
use vigil::highlight::{
    Anchor, Diagnostic, FileStatusMap, GeneralPass, HighlightStore, InjectedDocument,
    InjectionProvider, MemoryHighlightStore, NoInjections, PassContext, ProblemRegistry,
    ProgressablePass, RestartQueue,
};
use vigil::syntax::brace::BraceKind;
use vigil::{
    Cancellable, Document, DocumentId, NodeId, PassConfig, ProgressToken, TextRange, TextSize,
};

use super::visitors::{RuleRegistry, RuleVisitor};

// ============================================================================
// RECORDING STORE
// ============================================================================

/// One write to the store, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    InRange { range: TextRange, diagnostics: Vec<Diagnostic> },
    OutsideRange { keep: TextRange, diagnostics: Vec<Diagnostic> },
    ClearFileLevel,
}

/// [`MemoryHighlightStore`] that also logs every write.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryHighlightStore,
    commits: Mutex<Vec<Commit>>,
}

impl RecordingStore {
    pub fn commits(&self) -> Vec<Commit> {
        self.commits.lock().clone()
    }

    pub fn diagnostics(&self, document: DocumentId) -> Vec<Diagnostic> {
        self.inner.diagnostics(document)
    }
}

impl HighlightStore for RecordingStore {
    fn replace_in_range(
        &self,
        document: DocumentId,
        range: TextRange,
        diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        self.commits.lock().push(Commit::InRange {
            range,
            diagnostics: diagnostics.clone(),
        });
        self.inner.replace_in_range(document, range, diagnostics)
    }

    fn replace_outside_range(
        &self,
        document: DocumentId,
        keep: TextRange,
        full: TextRange,
        diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        self.commits.lock().push(Commit::OutsideRange {
            keep,
            diagnostics: diagnostics.clone(),
        });
        self.inner
            .replace_outside_range(document, keep, full, diagnostics)
    }

    fn clear_file_level(&self, document: DocumentId) {
        self.commits.lock().push(Commit::ClearFileLevel);
        self.inner.clear_file_level(document);
    }
}

// ============================================================================
// STRING INJECTIONS
// ============================================================================

/// Injects the contents of every string literal as a brace document.
pub struct StringInjections;

impl InjectionProvider for StringInjections {
    fn injections_at(&self, document: &Document, node: NodeId) -> Vec<Arc<InjectedDocument>> {
        let tree = document.tree();
        if BraceKind::from_raw(tree.kind(node)) != Some(BraceKind::STRING) {
            return Vec::new();
        }
        let literal = tree.range(node);
        if literal.len() < TextSize::from(2) {
            return Vec::new();
        }
        let quote = TextSize::from(1);
        let host = TextRange::new(literal.start() + quote, literal.end() - quote);
        let Some(text) = document.slice(host) else {
            return Vec::new();
        };
        let Ok(injected) = Document::parse_brace(DocumentId::fresh(), text) else {
            return Vec::new();
        };
        let anchors = vec![Anchor::new(injected.full_range(), host)];
        InjectedDocument::new(injected, document.id(), anchors)
            .map(|injected| vec![Arc::new(injected)])
            .unwrap_or_default()
    }
}

// ============================================================================
// HARNESS
// ============================================================================

/// Context plus handles on every in-memory collaborator.
pub struct Harness {
    pub store: Arc<RecordingStore>,
    pub problems: Arc<ProblemRegistry>,
    pub restarts: Arc<RestartQueue>,
    pub statuses: Arc<FileStatusMap>,
    pub registry: Arc<RuleRegistry>,
    pub context: Arc<PassContext>,
}

impl Harness {
    pub fn new(visitors: Vec<RuleVisitor>) -> Self {
        Self::build(visitors, PassConfig::default(), Arc::new(NoInjections))
    }

    pub fn with_config(visitors: Vec<RuleVisitor>, config: PassConfig) -> Self {
        Self::build(visitors, config, Arc::new(NoInjections))
    }

    pub fn with_injections(visitors: Vec<RuleVisitor>, config: PassConfig) -> Self {
        Self::build(visitors, config, Arc::new(StringInjections))
    }

    fn build(
        visitors: Vec<RuleVisitor>,
        config: PassConfig,
        injections: Arc<dyn InjectionProvider>,
    ) -> Self {
        let store = Arc::new(RecordingStore::default());
        let problems = Arc::new(ProblemRegistry::new());
        let restarts = Arc::new(RestartQueue::new());
        let statuses = Arc::new(FileStatusMap::new());
        let registry = Arc::new(RuleRegistry::new(visitors));
        let context = PassContext::new(
            config,
            registry.clone(),
            store.clone(),
            problems.clone(),
            restarts.clone(),
        )
        .unwrap()
        .with_injections(injections)
        .with_statuses(statuses.clone());

        Self {
            store,
            problems,
            restarts,
            statuses,
            registry,
            context: Arc::new(context),
        }
    }

    /// Run a pass with a fresh token.
    pub fn run(&self, document: &Document, priority: TextRange, full_pass: bool) -> Cancellable<()> {
        self.run_with(document, priority, full_pass, &ProgressToken::new())
    }

    pub fn run_with(
        &self,
        document: &Document,
        priority: TextRange,
        full_pass: bool,
        token: &ProgressToken,
    ) -> Cancellable<()> {
        self.context.run(document, priority, full_pass, token)
    }

    /// A pass over `document` ready to be configured and driven by hand.
    pub fn pass(&self, document: &Document, priority: TextRange, full_pass: bool) -> GeneralPass {
        GeneralPass::new(self.context.clone(), document.clone(), priority, full_pass)
    }

    pub fn drive(&self, pass: GeneralPass, token: &ProgressToken) -> (Cancellable<()>, Option<f64>) {
        let mut driver = ProgressablePass::new(pass, token.clone());
        let result = driver.run();
        (result, driver.progress())
    }
}

/// Config without TODO patterns or fragment markers, to keep stores small.
pub fn quiet_config() -> PassConfig {
    PassConfig {
        todo_patterns: Vec::new(),
        highlight_injected_fragments: false,
        ..PassConfig::default()
    }
}
