//! Per-document status flags that outlive a single pass run.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::base::DocumentId;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FileStatus {
    error_found: bool,
    has_error_element: bool,
}

/// Remembers, per document, whether the last runs found errors.
#[derive(Debug, Default)]
pub struct FileStatusMap {
    statuses: RwLock<FxHashMap<DocumentId, FileStatus>>,
}

impl FileStatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the last full pass found an ERROR diagnostic.
    pub fn was_error_found(&self, document: DocumentId) -> bool {
        self.get(document).error_found
    }

    /// Clear the flag and set it from the latest findings.
    pub fn set_error_found(&self, document: DocumentId, found: bool) {
        self.statuses.write().entry(document).or_default().error_found = found;
    }

    /// True if the last applied run saw parse-error nodes.
    pub fn has_error_element(&self, document: DocumentId) -> bool {
        self.get(document).has_error_element
    }

    pub fn set_has_error_element(&self, document: DocumentId, value: bool) {
        self.statuses
            .write()
            .entry(document)
            .or_default()
            .has_error_element = value;
    }

    /// Forget a closed document.
    pub fn remove(&self, document: DocumentId) {
        self.statuses.write().remove(&document);
    }

    fn get(&self, document: DocumentId) -> FileStatus {
        self.statuses
            .read()
            .get(&document)
            .copied()
            .unwrap_or_default()
    }
}
