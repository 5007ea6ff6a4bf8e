//! Text measurement capability consumed by pagination and page drawing.
//!
//! Pagination never shapes text itself: it asks a [`Measurer`] how tall a chunk
//! is and where its visual sub-lines break.

use crate::baseline::LayoutMetrics;
use crate::font::FontDescriptor;
use crate::runs::StyleRun;

const ELLIPSIS: char = '\u{2026}';
const DEFAULT_TAB_WIDTH: u32 = 8;

/// How a chunk behaves when it is wider than the available width.
/// （片段超出可用寬度時的處理方式。）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overflow {
    /// One visual line, clipped by the surface.
    Unbounded,
    /// Break into visual sub-lines at word boundaries, falling back to characters.
    Wrap { width: f32 },
    /// One visual line, truncated with an ellipsis.
    Ellipsize { width: f32 },
}

/// A chunk of plain text with its style runs, ready to be measured.
/// （待量測的純文字片段與其樣式區段。）
#[derive(Debug, Clone, Copy)]
pub struct MeasureRequest<'a> {
    pub text: &'a str,
    pub runs: &'a [StyleRun],
    pub font: &'a FontDescriptor,
    pub overflow: Overflow,
    pub tab_width: u32,
}

impl<'a> MeasureRequest<'a> {
    pub fn new(text: &'a str, font: &'a FontDescriptor) -> Self {
        Self {
            text,
            runs: &[],
            font,
            overflow: Overflow::Unbounded,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    pub fn with_runs(mut self, runs: &'a [StyleRun]) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_tab_width(mut self, tab_width: u32) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }
}

/// One visual sub-line of a measured chunk.
///
/// `start`/`end` are character indices into the request text; `text` is what
/// gets painted (it differs from the source slice only when ellipsized).
#[derive(Debug, Clone, PartialEq)]
pub struct VisualLine {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub runs: Vec<StyleRun>,
    pub width: f32,
    pub height: f32,
    /// Distance from the top of this sub-line to its baseline.
    pub baseline: f32,
}

impl VisualLine {
    pub fn metrics(&self) -> LayoutMetrics {
        LayoutMetrics::new(self.baseline, self.height)
    }
}

/// Result of measuring one chunk.
/// （單一片段的量測結果。）
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub font: FontDescriptor,
    pub lines: Vec<VisualLine>,
    pub width: f32,
    pub height: f32,
}

impl TextLayout {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// First sub-line's baseline, measured from the top of the layout.
    pub fn baseline(&self) -> f32 {
        self.lines.first().map_or(0.0, |line| line.baseline)
    }

    pub fn metrics(&self) -> LayoutMetrics {
        LayoutMetrics::new(self.baseline(), self.height)
    }

    /// Character index where each sub-line after the first begins.
    pub fn break_offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.lines.iter().skip(1).map(|line| line.start)
    }
}

/// Text shaping and measuring engine.
/// （文字排版與量測引擎。）
pub trait Measurer {
    fn layout(&self, request: &MeasureRequest<'_>) -> TextLayout;

    fn text_width(&self, text: &str, font: &FontDescriptor) -> f32 {
        self.layout(&MeasureRequest::new(text, font)).width
    }

    fn text_height(&self, text: &str, font: &FontDescriptor) -> f32 {
        self.layout(&MeasureRequest::new(text, font)).height
    }
}

impl<M: Measurer + ?Sized> Measurer for &M {
    fn layout(&self, request: &MeasureRequest<'_>) -> TextLayout {
        (**self).layout(request)
    }
}

/// Fixed-advance measurer used for previews, the CLI and tests.
/// （以固定字寬估算的量測器。）
///
/// Metrics are given in font units per 1000-unit em. At 10pt the defaults give
/// a 6pt advance and a 12pt line with the baseline 10pt below the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
}

const UNITS_PER_EM: f32 = 1000.0;

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            advance: 600.0,
            ascent: 1000.0,
            descent: 200.0,
        }
    }
}

impl MonospaceMeasurer {
    fn scale(units: f32, font: &FontDescriptor) -> f32 {
        units * font.size_pt / UNITS_PER_EM
    }

    pub fn advance(&self, font: &FontDescriptor) -> f32 {
        Self::scale(self.advance, font)
    }

    pub fn ascent(&self, font: &FontDescriptor) -> f32 {
        Self::scale(self.ascent, font)
    }

    pub fn line_height(&self, font: &FontDescriptor) -> f32 {
        Self::scale(self.ascent, font) + Self::scale(self.descent, font)
    }

    fn max_columns(&self, width: f32, font: &FontDescriptor) -> usize {
        let advance = self.advance(font);
        if advance <= 0.0 || !width.is_finite() {
            return usize::MAX;
        }
        (((width + 0.01) / advance).floor() as usize).max(1)
    }
}

impl Measurer for MonospaceMeasurer {
    fn layout(&self, request: &MeasureRequest<'_>) -> TextLayout {
        let chars: Vec<char> = request.text.chars().collect();
        let tab = request.tab_width.max(1) as usize;
        let advance = self.advance(request.font);
        let height = self.line_height(request.font);
        let baseline = self.ascent(request.font);

        let make_line = |start: usize, end: usize, text: String, columns: usize| VisualLine {
            start,
            end,
            text,
            runs: request
                .runs
                .iter()
                .filter_map(|run| run.clip(start, end))
                .collect(),
            width: columns as f32 * advance,
            height,
            baseline,
        };

        let lines = match request.overflow {
            Overflow::Unbounded => {
                vec![make_line(0, chars.len(), request.text.to_string(), columns_of(&chars, tab))]
            }
            Overflow::Wrap { width } => {
                let max_columns = self.max_columns(width, request.font);
                wrap_columns(&chars, max_columns, tab)
                    .into_iter()
                    .map(|(start, end)| {
                        let text: String = chars[start..end].iter().collect();
                        make_line(start, end, text, columns_of(&chars[start..end], tab))
                    })
                    .collect()
            }
            Overflow::Ellipsize { width } => {
                let max_columns = self.max_columns(width, request.font);
                let total = columns_of(&chars, tab);
                if total <= max_columns {
                    vec![make_line(0, chars.len(), request.text.to_string(), total)]
                } else {
                    let keep = prefix_within(&chars, max_columns.saturating_sub(1), tab);
                    let mut text: String = chars[..keep].iter().collect();
                    let columns = columns_of(&chars[..keep], tab) + 1;
                    text.push(ELLIPSIS);
                    vec![make_line(0, keep, text, columns)]
                }
            }
        };

        let width = lines.iter().map(|line| line.width).fold(0.0, f32::max);
        let total_height = lines.iter().map(|line| line.height).sum();
        TextLayout {
            font: request.font.clone(),
            lines,
            width,
            height: total_height,
        }
    }
}

fn char_columns(ch: char, column: usize, tab: usize) -> usize {
    if ch == '\t' {
        tab - column % tab
    } else {
        1
    }
}

fn columns_of(chars: &[char], tab: usize) -> usize {
    chars
        .iter()
        .fold(0, |column, &ch| column + char_columns(ch, column, tab))
}

fn prefix_within(chars: &[char], max_columns: usize, tab: usize) -> usize {
    let mut column = 0;
    for (idx, &ch) in chars.iter().enumerate() {
        let next = column + char_columns(ch, column, tab);
        if next > max_columns {
            return idx;
        }
        column = next;
    }
    chars.len()
}

/// Greedy word wrap; whitespace may hang past the edge, words longer than a
/// line are broken between characters.
fn wrap_columns(chars: &[char], max_columns: usize, tab: usize) -> Vec<(usize, usize)> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut column = 0;
    let mut last_break: Option<usize> = None;
    let mut idx = 0;

    while idx < chars.len() {
        let ch = chars[idx];
        let width = char_columns(ch, column, tab);
        if ch.is_whitespace() {
            column += width;
            idx += 1;
            last_break = Some(idx);
            continue;
        }
        if column > 0 && column + width > max_columns {
            let at = match last_break {
                Some(at) if at > start => at,
                _ => idx,
            };
            lines.push((start, at));
            start = at;
            idx = at;
            column = 0;
            last_break = None;
            continue;
        }
        column += width;
        idx += 1;
    }
    lines.push((start, chars.len()));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use textprint_document::StyleAttrs;

    fn font() -> FontDescriptor {
        FontDescriptor::new("Monospace", 10.0)
    }

    #[test]
    fn unbounded_line_has_reference_metrics() {
        let font = font();
        let layout = MonospaceMeasurer::default().layout(&MeasureRequest::new("hello", &font));
        assert_eq!(layout.line_count(), 1);
        assert_eq!(layout.width, 30.0);
        assert_eq!(layout.height, 12.0);
        assert_eq!(layout.baseline(), 10.0);
    }

    #[test]
    fn empty_text_still_has_one_line() {
        let font = font();
        let layout = MonospaceMeasurer::default().layout(
            &MeasureRequest::new("", &font).with_overflow(Overflow::Wrap { width: 60.0 }),
        );
        assert_eq!(layout.line_count(), 1);
        assert_eq!(layout.height, 12.0);
        assert_eq!(layout.width, 0.0);
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let font = font();
        let text = "the quick brown fox";
        let layout = MonospaceMeasurer::default().layout(
            &MeasureRequest::new(text, &font).with_overflow(Overflow::Wrap { width: 60.0 }),
        );
        let pieces: Vec<&str> = layout.lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(pieces, vec!["the quick ", "brown fox"]);
        assert_eq!(layout.break_offsets().collect::<Vec<_>>(), vec![10]);
        assert_eq!(layout.height, 24.0);
    }

    #[test]
    fn long_words_break_between_characters() {
        let font = font();
        let layout = MonospaceMeasurer::default().layout(
            &MeasureRequest::new("abcdefghijkl", &font)
                .with_overflow(Overflow::Wrap { width: 30.0 }),
        );
        let pieces: Vec<&str> = layout.lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(pieces, vec!["abcde", "fghij", "kl"]);
    }

    #[test]
    fn ellipsize_truncates_to_width() {
        let font = font();
        let layout = MonospaceMeasurer::default().layout(
            &MeasureRequest::new("abcdefghijkl", &font)
                .with_overflow(Overflow::Ellipsize { width: 30.0 }),
        );
        assert_eq!(layout.line_count(), 1);
        assert_eq!(layout.lines[0].text, "abcd\u{2026}");
        assert_eq!(layout.lines[0].end, 4);
        assert_eq!(layout.width, 30.0);
    }

    #[test]
    fn tabs_expand_to_stops() {
        let font = font();
        let measurer = MonospaceMeasurer::default();
        let request = MeasureRequest::new("a\tb", &font).with_tab_width(4);
        assert_eq!(measurer.layout(&request).width, 5.0 * 6.0);
    }

    #[test]
    fn runs_are_split_per_visual_line() {
        let font = font();
        let runs = [StyleRun::new(2, 12, StyleAttrs::default().with_italic(true))];
        let layout = MonospaceMeasurer::default().layout(
            &MeasureRequest::new("the quick brown fox", &font)
                .with_runs(&runs)
                .with_overflow(Overflow::Wrap { width: 60.0 }),
        );
        assert_eq!(layout.lines[0].runs[0].start, 2);
        assert_eq!(layout.lines[0].runs[0].end, 10);
        assert_eq!(layout.lines[1].runs[0].start, 0);
        assert_eq!(layout.lines[1].runs[0].end, 2);
    }

    #[test]
    fn font_size_scales_metrics() {
        let font = FontDescriptor::new("Monospace", 20.0);
        let measurer = MonospaceMeasurer::default();
        assert_eq!(measurer.text_height("x", &font), 24.0);
        assert_eq!(measurer.text_width("xx", &font), 24.0);
    }
}
