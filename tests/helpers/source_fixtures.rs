//! Brace-language sources used across the pass tests.

use vigil::{Document, DocumentId, TextRange};

/// `bad` in the first twenty characters, a number well after them.
pub const PRIORITY_SPLIT: &str = "bad; a; b; c; d; e;\nf; g; h; i;\nlate = 42;\n";

/// Three numbers, all near the start.
pub const THREE_NUMBERS: &str = "x = 1; y = 2; z = 3;\nrest { a; b; c; }\n";

/// `bad` nested one item deep, next to a healthy sibling.
pub const NESTED_BAD: &str = "outer { bad; }\nfine { ok; }\n";

/// A missing `;` produces a parse-error node.
pub const WITH_ERROR_NODE: &str = "bad = 1 b;\n";

pub fn document(text: &str) -> Document {
    Document::parse_brace(DocumentId::fresh(), text).unwrap()
}

/// Same document identity, new text.
pub fn edited(previous: &Document, text: &str) -> Document {
    Document::parse_brace(previous.id(), text).unwrap()
}

pub fn range(start: u32, end: u32) -> TextRange {
    TextRange::new(start.into(), end.into())
}

/// Range of the first occurrence of `needle`.
pub fn find(document: &Document, needle: &str) -> TextRange {
    let start = document.text().find(needle).unwrap() as u32;
    range(start, start + needle.len() as u32)
}
