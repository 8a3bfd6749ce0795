//! Document identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Identity of a document, stable across edits.
///
/// A new edit produces a new snapshot of the document but keeps its id, so
/// stores and trackers can key their state by `DocumentId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u32);

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

impl DocumentId {
    /// Create a document id from a raw index.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Allocate a fresh, process-unique document id.
    pub fn fresh() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

impl From<u32> for DocumentId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}
