//! Action-item markers (`TODO`, `FIXME`, ...) found by scanning raw text.

use regex::Regex;
use rowan::SyntaxKind;
use text_size::{TextRange, TextSize};

use super::diagnostic::{Diagnostic, DiagnosticKind, Severity};
use crate::config::{ConfigError, PassConfig};
use crate::syntax::Document;

/// Attribute key attached to TODO diagnostics.
pub const TODO_ATTRIBUTES: &str = "TODO_DEFAULT_ATTRIBUTES";

/// One marker: its range and the matched text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub range: TextRange,
    pub text: String,
}

/// Finds action-item markers in text, independently of any tree.
pub trait TodoScanner: Send + Sync {
    /// Markers in the text of `document` whose range lies inside `range`.
    fn find_markers(&self, document: &Document, range: TextRange) -> Vec<TodoItem>;
}

/// [`TodoScanner`] over a set of regular expressions.
///
/// By default the whole text is scanned. With [`with_comment_kinds`] only
/// leaves of those kinds are, so markers inside string literals or
/// identifiers are ignored.
///
/// Overlapping matches keep the one starting first (the longest on a tie).
///
/// [`with_comment_kinds`]: RegexTodoScanner::with_comment_kinds
#[derive(Debug, Clone)]
pub struct RegexTodoScanner {
    patterns: Vec<Regex>,
    comment_kinds: Vec<SyntaxKind>,
}

impl RegexTodoScanner {
    pub fn new(patterns: Vec<Regex>) -> Self {
        Self {
            patterns,
            comment_kinds: Vec::new(),
        }
    }

    /// Compile the patterns of `config`.
    pub fn from_config(config: &PassConfig) -> Result<Self, ConfigError> {
        let patterns = config
            .todo_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidTodoPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self::new(patterns))
    }

    /// Only scan leaves of the given kinds.
    pub fn with_comment_kinds(mut self, kinds: impl IntoIterator<Item = SyntaxKind>) -> Self {
        self.comment_kinds = kinds.into_iter().collect();
        self
    }

    /// Text regions to scan within `range`.
    fn regions(&self, document: &Document, range: TextRange) -> Vec<TextRange> {
        if self.comment_kinds.is_empty() {
            return vec![document.full_range()];
        }
        let tree = document.tree();
        tree.preorder()
            .filter(|&node| {
                !tree.has_children(node) && self.comment_kinds.contains(&tree.kind(node))
            })
            .map(|node| tree.range(node))
            .filter(|region| region.intersect(range).is_some())
            .collect()
    }
}

impl TodoScanner for RegexTodoScanner {
    fn find_markers(&self, document: &Document, range: TextRange) -> Vec<TodoItem> {
        let mut items = Vec::new();
        for region in self.regions(document, range) {
            let Some(text) = document.slice(region) else {
                continue;
            };
            for pattern in &self.patterns {
                for found in pattern.find_iter(text) {
                    let (Ok(start), Ok(end)) =
                        (TextSize::try_from(found.start()), TextSize::try_from(found.end()))
                    else {
                        continue;
                    };
                    let marker = TextRange::new(start, end) + region.start();
                    if range.contains_range(marker) {
                        items.push(TodoItem {
                            range: marker,
                            text: found.as_str().to_string(),
                        });
                    }
                }
            }
        }

        items.sort_by_key(|item| (item.range.start(), std::cmp::Reverse(item.range.end())));
        let mut kept: Vec<TodoItem> = Vec::with_capacity(items.len());
        for item in items {
            match kept.last() {
                Some(last) if item.range.start() < last.range.end() => {}
                _ => kept.push(item),
            }
        }
        kept
    }
}

/// Diagnostic for one marker; description and tooltip are the marker text.
pub fn todo_diagnostic(item: &TodoItem) -> Diagnostic {
    Diagnostic::new(item.range, Severity::Info, item.text.as_str())
        .with_kind(DiagnosticKind::Todo)
        .with_forced_attributes(TODO_ATTRIBUTES)
}
