//! Incremental background highlighting.
//!
//! This module turns a document snapshot into diagnostics, publishing the
//! ones inside a priority range first.
//!
//! ## Key Types
//!
//! - [`Diagnostic`] - a finding with range, severity and quick fixes
//! - [`Visitor`] / [`VisitorRegistry`] - pluggable analyzers
//! - [`InjectedDocument`] - a fragment embedded in a host document
//! - [`GeneralPass`] / [`PassContext`] - the analysis pass
//! - [`ProgressablePass`] - collect/apply lifecycle under a progress token
//!
//! ## Flow
//!
//! ```text
//! elements_in_range(tree, range)    ← nodes relevant to the range
//!     │
//!     ▼
//! divide(priority)                  ← inside / outside, host and injected
//!     │
//!     ▼
//! visitors over inside nodes        → committed to the store immediately
//!     │
//!     ▼
//! visitors over outside nodes       → committed by apply()
//! ```

mod diagnostic;
mod divider;
mod extract;
mod host;
mod injection;
mod pass;
mod status;
mod todo;
mod visitor;


pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticSink, QuickFix, Severity};
pub use divider::{DivideOptions, Divided, divide};
pub use extract::{ElementFilter, elements_in_range, find_common_parent};
pub use host::{
    HighlightStore, MemoryHighlightStore, Problem, ProblemRegistry, ProblemTracker,
    RestartQueue, RestartRequest, Scheduler,
};
pub use injection::{
    Anchor, InjectedDocument, InjectionError, InjectionProvider, NoInjections,
    injected_documents, translate,
};
pub use pass::{GeneralPass, HighlightingPass, PassContext, ProgressablePass};
pub use status::FileStatusMap;
pub use todo::{RegexTodoScanner, TODO_ATTRIBUTES, TodoItem, TodoScanner, todo_diagnostic};
pub use visitor::{AnalyzeBody, NodeVisitor, Visitor, VisitorRegistry, prepare_visitors};
