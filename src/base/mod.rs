//! Foundation types for the vigil analysis core.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`DocumentId`] - Stable document identity across edits
//! - [`TextRange`], [`TextSize`] - Half-open text offset intervals
//! - [`RangeExt`] - Shifting and intersection helpers on top of `text-size`
//!
//! This module has NO dependencies on other vigil modules.

mod document_id;
mod range;

pub use document_id::DocumentId;
pub use range::RangeExt;
pub use text_size::{TextRange, TextSize};

// Re-export text-size for convenience
pub use text_size;
