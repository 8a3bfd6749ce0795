//! Diagnostics reported by visitors.
//!
//! A [`Diagnostic`] is immutable once created and compared structurally, so
//! the pass can deduplicate reports from different visitors with a set.

use std::sync::Arc;

use smol_str::SmolStr;
use text_size::TextRange;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// Where a diagnostic came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Reported by a visitor.
    Annotation,
    /// Action-item marker found by the TODO pre-pass.
    Todo,
    /// Marks a host range that carries an injected document.
    InjectedFragment,
}

/// A fix offered for a diagnostic, valid over its own range.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuickFix {
    /// Identifies the fix action for the consumer.
    pub descriptor: SmolStr,
    pub range: TextRange,
}

impl QuickFix {
    pub fn new(descriptor: impl Into<SmolStr>, range: TextRange) -> Self {
        Self {
            descriptor: descriptor.into(),
            range,
        }
    }
}

/// A diagnostic with its range and presentation metadata.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub range: TextRange,
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Short message.
    pub description: Option<Arc<str>>,
    /// Longer text shown on hover.
    pub tooltip: Option<Arc<str>>,
    /// Attribute key that overrides the severity's default rendering.
    pub forced_attributes: Option<SmolStr>,
    pub quick_fixes: Vec<QuickFix>,
    pub is_hint: bool,
    /// Render past the end of the line (e.g. "missing `;`").
    pub after_end_of_line: bool,
    pub gutter_icon: Option<SmolStr>,
}

impl Diagnostic {
    /// Create a diagnostic of the given severity.
    pub fn new(range: TextRange, severity: Severity, message: impl Into<Arc<str>>) -> Self {
        let message = message.into();
        Self {
            range,
            severity,
            kind: DiagnosticKind::Annotation,
            description: Some(message.clone()),
            tooltip: Some(message),
            forced_attributes: None,
            quick_fixes: Vec::new(),
            is_hint: false,
            after_end_of_line: false,
            gutter_icon: None,
        }
    }

    /// Create a new error diagnostic.
    pub fn error(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(range, Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(range, Severity::Warning, message)
    }

    /// Create a new informational diagnostic.
    pub fn info(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(range, Severity::Info, message)
    }

    pub fn with_kind(mut self, kind: DiagnosticKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<Arc<str>>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_forced_attributes(mut self, key: impl Into<SmolStr>) -> Self {
        self.forced_attributes = Some(key.into());
        self
    }

    /// Add a fix valid over `range`.
    pub fn with_fix(mut self, descriptor: impl Into<SmolStr>, range: TextRange) -> Self {
        self.quick_fixes.push(QuickFix::new(descriptor, range));
        self
    }

    pub fn with_gutter_icon(mut self, icon: impl Into<SmolStr>) -> Self {
        self.gutter_icon = Some(icon.into());
        self
    }

    pub fn as_hint(mut self) -> Self {
        self.is_hint = true;
        self
    }

    pub fn after_end_of_line(mut self) -> Self {
        self.after_end_of_line = true;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Same diagnostic over another range; quick fixes are left untouched.
    pub fn with_range(mut self, range: TextRange) -> Self {
        self.range = range;
        self
    }
}

// ============================================================================
// SINK
// ============================================================================

/// Collects diagnostics reported by one visitor for one node.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    items: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, Diagnostic> {
        self.items.drain(..)
    }
}
