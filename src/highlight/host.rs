//! Collaborators the pass reports to, with in-memory implementations.
//!
//! - [`HighlightStore`] - the shared set of currently valid diagnostics
//! - [`ProblemTracker`] - per-document error lists
//! - [`Scheduler`] - receives "restart later" requests
//!
//! Each implementation synchronizes internally; the pass only calls `&self`
//! methods.

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use text_size::TextRange;

use super::diagnostic::Diagnostic;
use crate::base::DocumentId;

// ============================================================================
// HIGHLIGHT STORE
// ============================================================================

/// Shared, mutable collection of a document's current diagnostics.
pub trait HighlightStore: Send + Sync {
    /// Replace every diagnostic contained in `range` with `diagnostics`.
    /// Returns the diagnostics that were replaced.
    fn replace_in_range(
        &self,
        document: DocumentId,
        range: TextRange,
        diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic>;

    /// Replace every diagnostic contained in `full` but not in `keep`.
    /// Returns the diagnostics that were replaced.
    fn replace_outside_range(
        &self,
        document: DocumentId,
        keep: TextRange,
        full: TextRange,
        diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic>;

    /// Drop diagnostics attached to the document as a whole.
    fn clear_file_level(&self, document: DocumentId);
}

#[derive(Debug, Default)]
struct StoredDocument {
    diagnostics: Vec<Diagnostic>,
    file_level: Vec<Diagnostic>,
}

impl StoredDocument {
    fn replace_where(
        &mut self,
        scoped: impl Fn(&Diagnostic) -> bool,
        diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        let (replaced, kept) = std::mem::take(&mut self.diagnostics)
            .into_iter()
            .partition(|d| scoped(d));
        self.diagnostics = kept;
        for diagnostic in diagnostics {
            if !self.diagnostics.contains(&diagnostic) {
                self.diagnostics.push(diagnostic);
            }
        }
        replaced
    }
}

/// In-memory [`HighlightStore`].
#[derive(Debug, Default)]
pub struct MemoryHighlightStore {
    documents: Mutex<FxHashMap<DocumentId, StoredDocument>>,
}

impl MemoryHighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a document's diagnostics ordered by range.
    pub fn diagnostics(&self, document: DocumentId) -> Vec<Diagnostic> {
        let documents = self.documents.lock();
        let mut diagnostics = documents
            .get(&document)
            .map(|stored| stored.diagnostics.clone())
            .unwrap_or_default();
        diagnostics.sort_by_key(|d| (d.range.start(), d.range.end()));
        diagnostics
    }

    pub fn file_level(&self, document: DocumentId) -> Vec<Diagnostic> {
        self.documents
            .lock()
            .get(&document)
            .map(|stored| stored.file_level.clone())
            .unwrap_or_default()
    }

    /// Attach a diagnostic to the document as a whole.
    pub fn add_file_level(&self, document: DocumentId, diagnostic: Diagnostic) {
        self.documents
            .lock()
            .entry(document)
            .or_default()
            .file_level
            .push(diagnostic);
    }
}

impl HighlightStore for MemoryHighlightStore {
    fn replace_in_range(
        &self,
        document: DocumentId,
        range: TextRange,
        diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        self.documents
            .lock()
            .entry(document)
            .or_default()
            .replace_where(|d| range.contains_range(d.range), diagnostics)
    }

    fn replace_outside_range(
        &self,
        document: DocumentId,
        keep: TextRange,
        full: TextRange,
        diagnostics: Vec<Diagnostic>,
    ) -> Vec<Diagnostic> {
        self.documents.lock().entry(document).or_default().replace_where(
            |d| full.contains_range(d.range) && !keep.contains_range(d.range),
            diagnostics,
        )
    }

    fn clear_file_level(&self, document: DocumentId) {
        if let Some(stored) = self.documents.lock().get_mut(&document) {
            stored.file_level.clear();
        }
    }
}

// ============================================================================
// PROBLEM TRACKER
// ============================================================================

/// An error reported to the problem tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub document: DocumentId,
    pub diagnostic: Diagnostic,
    /// The document's tree contained parse-error nodes.
    pub has_error_element: bool,
}

/// Tracks which documents have problems.
pub trait ProblemTracker: Send + Sync {
    /// Replace everything known about `document` with `problems`.
    fn report_all(&self, document: DocumentId, problems: Vec<Problem>);

    /// Add `problems` to what is already known about `document`.
    fn report_merge(&self, document: DocumentId, problems: Vec<Problem>);
}

/// In-memory [`ProblemTracker`].
#[derive(Debug, Default)]
pub struct ProblemRegistry {
    problems: Mutex<FxHashMap<DocumentId, Vec<Problem>>>,
}

impl ProblemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn problems(&self, document: DocumentId) -> Vec<Problem> {
        self.problems
            .lock()
            .get(&document)
            .cloned()
            .unwrap_or_default()
    }

    pub fn has_problems(&self, document: DocumentId) -> bool {
        self.problems
            .lock()
            .get(&document)
            .is_some_and(|problems| !problems.is_empty())
    }
}

impl ProblemTracker for ProblemRegistry {
    fn report_all(&self, document: DocumentId, problems: Vec<Problem>) {
        self.problems.lock().insert(document, problems);
    }

    fn report_merge(&self, document: DocumentId, problems: Vec<Problem>) {
        let mut all = self.problems.lock();
        let known = all.entry(document).or_default();
        for problem in problems {
            if !known.contains(&problem) {
                known.push(problem);
            }
        }
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// Decides when passes run; receives restart requests from canceled runs.
pub trait Scheduler: Send + Sync {
    fn restart_later(&self, document: DocumentId, delay: Duration);
}

/// A pending restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartRequest {
    pub document: DocumentId,
    pub due: Instant,
}

/// [`Scheduler`] that queues restart requests for an event loop to drain.
///
/// Requests for the same document collapse into the earliest one.
#[derive(Debug, Default)]
pub struct RestartQueue {
    pending: Mutex<Vec<RestartRequest>>,
}

impl RestartQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Vec<RestartRequest> {
        self.pending.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Remove and return the documents whose restart is due at `now`.
    pub fn take_due(&self, now: Instant) -> Vec<DocumentId> {
        let mut pending = self.pending.lock();
        let (due, waiting): (Vec<_>, Vec<_>) =
            pending.drain(..).partition(|request| request.due <= now);
        *pending = waiting;
        due.into_iter().map(|request| request.document).collect()
    }
}

impl Scheduler for RestartQueue {
    fn restart_later(&self, document: DocumentId, delay: Duration) {
        let due = Instant::now() + delay;
        let mut pending = self.pending.lock();
        match pending.iter_mut().find(|request| request.document == document) {
            Some(request) => request.due = request.due.min(due),
            None => pending.push(RestartRequest { document, due }),
        }
    }
}
