//! Injected documents: fragments parsed independently of their host.
//!
//! An [`InjectedDocument`] is laid over one or more host ranges ("shreds").
//! Each [`Anchor`] maps a contiguous interval of the injected text to an
//! equally long host range. Injected text outside every anchor (prefixes and
//! suffixes added only so the fragment parses) has no host counterpart and is
//! not editable.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use super::diagnostic::{Diagnostic, QuickFix};
use crate::base::{DocumentId, RangeExt};
use crate::progress::{Cancellable, ProgressToken};
use crate::syntax::{Document, NodeId};

/// Violations of the anchor-list invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectionError {
    /// The injected and host intervals of an anchor differ in length.
    #[error("anchor {injected:?} -> {host:?} has mismatched lengths")]
    LengthMismatch { injected: TextRange, host: TextRange },

    /// Anchors overlap or are not ordered by injected offset.
    #[error("anchor {next:?} overlaps or precedes {previous:?}")]
    Unordered { previous: TextRange, next: TextRange },

    /// An anchor points past the end of the injected text.
    #[error("anchor {injected:?} exceeds injected text length {len:?}")]
    OutOfBounds { injected: TextRange, len: TextSize },
}

/// Maps one injected interval onto one host range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Anchor {
    pub injected: TextRange,
    pub host: TextRange,
}

impl Anchor {
    pub fn new(injected: TextRange, host: TextRange) -> Self {
        Self { injected, host }
    }

    /// Map an injected offset inside (or at the end of) this anchor.
    fn to_host(&self, offset: TextSize) -> TextSize {
        self.host.start() + (offset - self.injected.start())
    }

    fn range_to_host(&self, range: TextRange) -> TextRange {
        TextRange::new(self.to_host(range.start()), self.to_host(range.end()))
    }
}

/// A document embedded in a host document at one or more anchors.
#[derive(Debug, Clone)]
pub struct InjectedDocument {
    document: Document,
    host: DocumentId,
    anchors: Vec<Anchor>,
}

impl InjectedDocument {
    /// Create an injected document, checking that anchors are ordered,
    /// disjoint, length-preserving and inside the injected text.
    pub fn new(
        document: Document,
        host: DocumentId,
        anchors: Vec<Anchor>,
    ) -> Result<Self, InjectionError> {
        let len = document.len();
        let mut previous: Option<&Anchor> = None;
        for anchor in &anchors {
            if anchor.injected.len() != anchor.host.len() {
                return Err(InjectionError::LengthMismatch {
                    injected: anchor.injected,
                    host: anchor.host,
                });
            }
            if anchor.injected.end() > len {
                return Err(InjectionError::OutOfBounds {
                    injected: anchor.injected,
                    len,
                });
            }
            if let Some(previous) = previous {
                if previous.injected.end() > anchor.injected.start()
                    || previous.host.end() > anchor.host.start()
                {
                    return Err(InjectionError::Unordered {
                        previous: previous.injected,
                        next: anchor.injected,
                    });
                }
            }
            previous = Some(anchor);
        }
        Ok(Self {
            document,
            host,
            anchors,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn id(&self) -> DocumentId {
        self.document.id()
    }

    /// The document this one is embedded in.
    pub fn host(&self) -> DocumentId {
        self.host
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn host_ranges(&self) -> impl Iterator<Item = TextRange> + '_ {
        self.anchors.iter().map(|anchor| anchor.host)
    }

    pub fn is_one_line(&self) -> bool {
        !self.document.text().contains('\n')
    }

    /// Host range of the anchor whose injected interval contains `offset`.
    pub fn host_range_at(&self, offset: TextSize) -> Option<TextRange> {
        self.anchor_at(offset).map(|anchor| anchor.host)
    }

    /// Map an injected offset to the host, if it lies in an editable part.
    pub fn injected_to_host(&self, offset: TextSize) -> Option<TextSize> {
        self.anchor_at(offset).map(|anchor| anchor.to_host(offset))
    }

    /// Intersections of `range` with the editable parts, in injected
    /// coordinates, each paired with its anchor.
    ///
    /// An empty range yields one empty fragment if it touches an anchor.
    pub fn editable_fragments(&self, range: TextRange) -> Vec<(Anchor, TextRange)> {
        if range.is_empty() {
            return self
                .anchors
                .iter()
                .find(|anchor| anchor.injected.contains_inclusive(range.start()))
                .map(|&anchor| vec![(anchor, range)])
                .unwrap_or_default();
        }
        self.anchors
            .iter()
            .filter_map(|&anchor| {
                anchor
                    .injected
                    .intersect_strict(range)
                    .map(|fragment| (anchor, fragment))
            })
            .collect()
    }

    /// Host ranges covered by the editable parts of `range`.
    pub fn host_fragments(&self, range: TextRange) -> Vec<TextRange> {
        self.editable_fragments(range)
            .into_iter()
            .map(|(anchor, fragment)| anchor.range_to_host(fragment))
            .collect()
    }

    /// The anchor nearest to an offset that no anchor contains: the last
    /// anchor starting at or before it, or the first anchor otherwise.
    pub fn nearest_anchor(&self, offset: TextSize) -> Option<&Anchor> {
        let idx = self
            .anchors
            .partition_point(|anchor| anchor.injected.start() <= offset);
        self.anchors.get(idx.saturating_sub(1))
    }

    fn anchor_at(&self, offset: TextSize) -> Option<&Anchor> {
        self.anchors
            .iter()
            .find(|anchor| anchor.injected.contains_inclusive(offset))
    }
}

// ============================================================================
// ENUMERATION
// ============================================================================

/// Discovers the injected documents hosted by a node.
pub trait InjectionProvider: Send + Sync {
    fn injections_at(&self, document: &Document, node: NodeId) -> Vec<Arc<InjectedDocument>>;
}

/// Provider for documents that never host injections.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInjections;

impl InjectionProvider for NoInjections {
    fn injections_at(&self, _: &Document, _: NodeId) -> Vec<Arc<InjectedDocument>> {
        Vec::new()
    }
}

/// Every injected document reachable from `nodes`, without duplicates.
///
/// Each node is asked afresh; nothing is carried over from earlier runs, so
/// an edit that invalidated an injection elsewhere is picked up.
pub fn injected_documents(
    document: &Document,
    nodes: &[NodeId],
    provider: &dyn InjectionProvider,
    progress: &ProgressToken,
) -> Cancellable<Vec<Arc<InjectedDocument>>> {
    let mut seen = FxHashSet::default();
    let mut result = Vec::new();
    for &node in nodes {
        progress.check_canceled()?;
        for injected in provider.injections_at(document, node) {
            if seen.insert(injected.id()) {
                result.push(injected);
            }
        }
    }
    Ok(result)
}

// ============================================================================
// TRANSLATION
// ============================================================================

/// Rewrite a diagnostic reported against `injected` into host coordinates.
///
/// One host diagnostic is produced per editable fragment the range crosses.
/// A range lying wholly in a prefix or suffix falls back to a one-unit range
/// just outside the nearest anchor, on the side the range lies. Quick fixes
/// are mapped separately; a fix with no editable part is dropped. An empty
/// result means the diagnostic could not be mapped at all.
pub fn translate(diagnostic: &Diagnostic, injected: &InjectedDocument) -> Vec<Diagnostic> {
    let mut host_ranges = injected.host_fragments(diagnostic.range);
    if host_ranges.is_empty() {
        match gap_fallback(injected, diagnostic.range.start()) {
            Some(range) => host_ranges.push(range),
            None => {
                tracing::debug!(
                    "[INJECTION] dropping unmappable diagnostic at {:?} in {}",
                    diagnostic.range,
                    injected.id()
                );
                return Vec::new();
            }
        }
    }

    let quick_fixes: Vec<QuickFix> = diagnostic
        .quick_fixes
        .iter()
        .flat_map(|fix| {
            let fragments = injected.host_fragments(fix.range);
            if fragments.is_empty() {
                tracing::debug!(
                    "[INJECTION] dropping quick fix `{}` at {:?}",
                    fix.descriptor,
                    fix.range
                );
            }
            fragments
                .into_iter()
                .map(|range| QuickFix::new(fix.descriptor.clone(), range))
        })
        .collect();

    let one_line = injected.is_one_line();
    host_ranges
        .into_iter()
        .map(|range| {
            let mut translated = diagnostic.clone().with_range(range);
            translated.quick_fixes = quick_fixes.clone();
            if one_line {
                translated.after_end_of_line = false;
            }
            translated
        })
        .collect()
}

fn gap_fallback(injected: &InjectedDocument, offset: TextSize) -> Option<TextRange> {
    let anchor = injected.nearest_anchor(offset)?;
    let host = anchor.host;
    let one = TextSize::from(1);
    let range = if offset < anchor.injected.start() {
        let start = host.start().checked_sub(one).unwrap_or_default();
        TextRange::new(start, start + one)
    } else {
        TextRange::at(host.end(), one)
    };
    Some(range)
}
