use std::ops::Range;

/// Half-open span of character offsets.
/// （以字元位移表示的半開區間。）
///
/// Spans are plain values: narrowing or advancing a span returns a new one
/// instead of mutating a cursor in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

impl TextSpan {
    /// Creates a span, collapsing inverted bounds to an empty span.
    /// （建立新區間；`end` 小於 `start` 時會被收斂為空區間。）
    pub const fn new(start: usize, end: usize) -> Self {
        if end < start {
            Self { start, end: start }
        } else {
            Self { start, end }
        }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns the tail of this span starting at `offset`.
    /// （回傳從 `offset` 開始的剩餘區間。）
    pub fn starting_at(&self, offset: usize) -> Self {
        Self::new(offset.clamp(self.start, self.end), self.end)
    }

    /// Intersection with another span, if non-empty.
    /// （與另一區間的交集。）
    pub fn intersect(&self, other: TextSpan) -> Option<TextSpan> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TextSpan { start, end })
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl From<Range<usize>> for TextSpan {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_bounds_collapse() {
        let span = TextSpan::new(5, 2);
        assert!(span.is_empty());
        assert_eq!(span.start, 5);
    }

    #[test]
    fn intersection_is_overlap_only() {
        let a = TextSpan::new(0, 10);
        let b = TextSpan::new(4, 20);
        assert_eq!(a.intersect(b), Some(TextSpan::new(4, 10)));
        assert_eq!(a.intersect(TextSpan::new(10, 12)), None);
    }

    #[test]
    fn starting_at_clamps() {
        let span = TextSpan::new(3, 8);
        assert_eq!(span.starting_at(5), TextSpan::new(5, 8));
        assert_eq!(span.starting_at(1), TextSpan::new(3, 8));
        assert!(span.starting_at(20).is_empty());
    }
}
