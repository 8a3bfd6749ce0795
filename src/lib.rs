//! # vigil-base
//!
//! Incremental background analysis for editor documents: node extraction,
//! priority splitting, injected documents and the highlighting pass.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! highlight → Extraction, visitors, injections, the analysis pass
//!   ↓
//! progress  → Progress tokens, cooperative cancellation
//!   ↓
//! syntax    → Node arena, documents, rowan lowering, brace language
//!   ↓
//! base      → Primitives (DocumentId, TextRange helpers)
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → progress → highlight)
// ============================================================================

/// Foundation types: DocumentId, TextRange helpers
pub mod base;

/// Syntax: node arena, document snapshots, sample brace language
pub mod syntax;

/// Progress tokens and cancellation
pub mod progress;

/// Pass configuration
pub mod config;

/// Highlighting: extraction, priority split, injections, the pass
pub mod highlight;

// Re-export foundation types
pub use base::{DocumentId, RangeExt, TextRange, TextSize};
pub use config::{ConfigError, PassConfig};
pub use progress::{Cancellable, Cancelled, ProgressToken};
pub use syntax::{Document, NodeId, NodeRef, SyntaxTree};
