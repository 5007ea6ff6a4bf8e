//! Style run extraction from the document's overlapping tag intervals.

use serde::Serialize;
use textprint_document::{DocumentSource, StyleAttrs, TagKind, TextSpan};

/// A maximal span of a measured chunk sharing one combined attribute set.
/// （量測片段中共用同一組屬性的最大區段。）
///
/// Offsets are characters relative to the start of the chunk, not the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleRun {
    pub start: usize,
    pub end: usize,
    pub attrs: StyleAttrs,
}

impl StyleRun {
    pub const fn new(start: usize, end: usize, attrs: StyleAttrs) -> Self {
        Self { start, end, attrs }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Clips the run to `[start, end)` and re-bases it so `start` becomes 0.
    pub fn clip(&self, start: usize, end: usize) -> Option<StyleRun> {
        let clipped_start = self.start.max(start);
        let clipped_end = self.end.min(end);
        (clipped_start < clipped_end).then(|| {
            StyleRun::new(clipped_start - start, clipped_end - start, self.attrs)
        })
    }
}

/// Flattens the tags covering `span` into sorted, non-overlapping runs.
/// （將覆蓋 `span` 的標籤攤平成排序且互不重疊的區段。）
///
/// Later-registered tags override earlier ones attribute by attribute.
/// Bracket-match decorations never reach print output.
pub fn extract_runs<D>(document: &D, span: TextSpan) -> Vec<StyleRun>
where
    D: DocumentSource + ?Sized,
{
    let mut runs: Vec<StyleRun> = Vec::new();
    let mut cursor = span.start;

    while cursor < span.end {
        let next = document
            .next_boundary(cursor)
            .map_or(span.end, |boundary| boundary.min(span.end));
        let attrs = effective_attrs(document, cursor);

        if !attrs.is_empty() {
            let start = cursor - span.start;
            let end = next - span.start;
            match runs.last_mut() {
                Some(last) if last.end == start && last.attrs == attrs => last.end = end,
                _ => runs.push(StyleRun::new(start, end, attrs)),
            }
        }
        cursor = next;
    }

    debug_assert_runs_disjoint(&runs);
    runs
}

fn effective_attrs<D>(document: &D, offset: usize) -> StyleAttrs
where
    D: DocumentSource + ?Sized,
{
    let mut ids = document.tags_at(offset).to_vec();
    ids.sort_unstable();

    let mut attrs = StyleAttrs::default();
    for id in ids {
        let Some(tag) = document.tag(id) else {
            continue;
        };
        if tag.kind == TagKind::BracketMatch {
            continue;
        }
        attrs.overlay(&tag.attrs);
    }
    attrs
}

/// Panics (in debug builds) when runs overlap or are out of order.
pub fn debug_assert_runs_disjoint(runs: &[StyleRun]) {
    for pair in runs.windows(2) {
        debug_assert!(
            pair[0].start < pair[0].end && pair[0].end <= pair[1].start,
            "style runs overlap or are unsorted: {:?} / {:?}",
            pair[0],
            pair[1]
        );
    }
}
