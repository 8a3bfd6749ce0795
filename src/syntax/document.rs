//! Document snapshots.

use std::sync::Arc;

use text_size::{TextRange, TextSize};

use super::tree::SyntaxTree;
use crate::base::DocumentId;

/// An immutable document snapshot: text plus its parsed tree.
///
/// Cloning is cheap; text and tree are shared. The analysis pass only ever
/// reads one snapshot per run.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    text: Arc<str>,
    tree: Arc<SyntaxTree>,
}

impl Document {
    pub fn new(id: DocumentId, text: impl Into<Arc<str>>, tree: Arc<SyntaxTree>) -> Self {
        Self {
            id,
            text: text.into(),
            tree,
        }
    }

    /// Parse `text` with the built-in brace language.
    pub fn parse_brace(id: DocumentId, text: &str) -> Result<Self, super::TreeError> {
        let tree = super::brace::parse_tree(text)?;
        Ok(Self::new(id, text, Arc::new(tree)))
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn len(&self) -> TextSize {
        TextSize::of(&*self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// `[0, len)`
    pub fn full_range(&self) -> TextRange {
        TextRange::up_to(self.len())
    }

    /// Text covered by `range`, or `None` if it is out of bounds.
    pub fn slice(&self, range: TextRange) -> Option<&str> {
        self.text.get(std::ops::Range::<usize>::from(range))
    }
}
