//! Range helpers.
//!
//! [`TextRange`] already covers containment (`contains_range`) and
//! intersection (`intersect`). This trait adds the shifting and
//! closed-interval checks the analysis pass needs.

use text_size::{TextRange, TextSize};

/// Extension methods for [`TextRange`].
pub trait RangeExt {
    /// Move the range right by `delta`.
    fn shift_right(self, delta: TextSize) -> TextRange;

    /// Move the range left by `delta`, saturating at zero.
    fn shift_left(self, delta: TextSize) -> TextRange;

    /// True if the ranges overlap or touch (`[0,2)` and `[2,4)` intersect).
    fn intersects(self, other: TextRange) -> bool;

    /// True if the ranges share at least one offset.
    fn intersects_strict(self, other: TextRange) -> bool;

    /// Intersection that is only returned when it is non-empty.
    fn intersect_strict(self, other: TextRange) -> Option<TextRange>;
}

impl RangeExt for TextRange {
    fn shift_right(self, delta: TextSize) -> TextRange {
        self + delta
    }

    fn shift_left(self, delta: TextSize) -> TextRange {
        let delta = delta.min(self.start());
        self - delta
    }

    fn intersects(self, other: TextRange) -> bool {
        self.start() <= other.end() && other.start() <= self.end()
    }

    fn intersects_strict(self, other: TextRange) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }

    fn intersect_strict(self, other: TextRange) -> Option<TextRange> {
        self.intersect(other).filter(|range| !range.is_empty())
    }
}
