use std::borrow::Cow;

use crate::span::TextSpan;
use crate::tags::{StyleTag, TagId, TagTable};

const DEFAULT_TAB_WIDTH: u32 = 8;

/// Zero-based (line, column) position; columns count characters.
/// （以行與欄表示的位置（皆以 0 起算，欄位單位為字元）。）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

impl TextPosition {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Read-only view of a document used by the print engine.
/// （列印引擎讀取文件時使用的唯讀介面。）
///
/// Offsets are character offsets into the document's linear stream, where a
/// line terminator counts as part of the line it ends.
pub trait DocumentSource {
    fn line_count(&self) -> usize;

    /// Total number of characters.
    /// （文件總字元數。）
    fn char_len(&self) -> usize;

    /// Offset of the first character of `line`.
    /// （行首位移。）
    fn line_start(&self, line: usize) -> Option<usize>;

    /// Offset where `line`'s content ends, before its terminator.
    /// （行尾（不含換行字元）的位移。）
    fn line_content_end(&self, line: usize) -> Option<usize>;

    /// Line containing `offset` (the last line for out-of-range offsets).
    /// （位移所在的行。）
    fn line_at_offset(&self, offset: usize) -> usize;

    fn slice(&self, span: TextSpan) -> Cow<'_, str>;

    fn tags_at(&self, offset: usize) -> &[TagId];

    fn next_boundary(&self, offset: usize) -> Option<usize>;

    fn tag(&self, id: TagId) -> Option<&StyleTag>;

    fn tab_width(&self) -> u32 {
        DEFAULT_TAB_WIDTH
    }

    /// Maps a position to an offset, rejecting columns past the line end.
    /// （將行欄位置轉為位移；欄位超出行長時回傳 `None`。）
    fn offset_at(&self, position: TextPosition) -> Option<usize> {
        let start = self.line_start(position.line)?;
        let end = self.line_content_end(position.line)?;
        let offset = start + position.column;
        (offset <= end).then_some(offset)
    }

    /// Maps an offset to its (line, column) position.
    /// （將位移轉為行欄位置。）
    fn position_at(&self, offset: usize) -> TextPosition {
        let line = self.line_at_offset(offset);
        let start = self.line_start(line).unwrap_or(0);
        TextPosition::new(line, offset.saturating_sub(start))
    }
}

#[derive(Debug, Clone, Copy)]
struct LineIndex {
    char_start: usize,
    byte_start: usize,
}

/// In-memory text buffer with its tag table.
/// （記憶體內的純文字緩衝區與其標籤表。）
#[derive(Debug, Clone)]
pub struct TextBuffer {
    text: String,
    lines: Vec<LineIndex>,
    char_len: usize,
    tags: TagTable,
    tab_width: u32,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new("")
    }
}

impl TextBuffer {
    /// Creates a buffer and indexes its lines.
    /// （建立緩衝區並建立行索引。）
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut lines = vec![LineIndex {
            char_start: 0,
            byte_start: 0,
        }];
        let mut char_len = 0usize;
        for (byte, ch) in text.char_indices() {
            char_len += 1;
            if ch == '\n' {
                lines.push(LineIndex {
                    char_start: char_len,
                    byte_start: byte + 1,
                });
            }
        }
        Self {
            text,
            lines,
            char_len,
            tags: TagTable::new(),
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }

    /// Builds a buffer by joining `lines` with `\n`.
    /// （由多行文字組成緩衝區（以 `\n` 連接）。）
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for (idx, line) in lines.into_iter().enumerate() {
            if idx > 0 {
                text.push('\n');
            }
            text.push_str(line.as_ref());
        }
        Self::new(text)
    }

    pub fn with_tab_width(mut self, tab_width: u32) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut TagTable {
        &mut self.tags
    }

    fn byte_index(&self, offset: usize) -> usize {
        if offset >= self.char_len {
            return self.text.len();
        }
        let line = self.lines[self.line_at_offset(offset)];
        let within = offset - line.char_start;
        self.text[line.byte_start..]
            .char_indices()
            .nth(within)
            .map(|(byte, _)| line.byte_start + byte)
            .unwrap_or(self.text.len())
    }
}

impl DocumentSource for TextBuffer {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn char_len(&self) -> usize {
        self.char_len
    }

    fn line_start(&self, line: usize) -> Option<usize> {
        self.lines.get(line).map(|index| index.char_start)
    }

    fn line_content_end(&self, line: usize) -> Option<usize> {
        self.lines.get(line)?;
        let Some(next) = self.lines.get(line + 1) else {
            return Some(self.char_len);
        };
        let mut end = next.char_start - 1;
        let bytes = self.text.as_bytes();
        if next.byte_start >= 2
            && bytes[next.byte_start - 2] == b'\r'
            && end > self.lines[line].char_start
        {
            end -= 1;
        }
        Some(end)
    }

    fn line_at_offset(&self, offset: usize) -> usize {
        let idx = self
            .lines
            .partition_point(|index| index.char_start <= offset);
        idx.saturating_sub(1)
    }

    fn slice(&self, span: TextSpan) -> Cow<'_, str> {
        let start = self.byte_index(span.start);
        let end = self.byte_index(span.end.max(span.start));
        Cow::Borrowed(&self.text[start..end])
    }

    fn tags_at(&self, offset: usize) -> &[TagId] {
        self.tags.tags_at(offset)
    }

    fn next_boundary(&self, offset: usize) -> Option<usize> {
        self.tags.next_boundary(offset)
    }

    fn tag(&self, id: TagId) -> Option<&StyleTag> {
        self.tags.tag(id)
    }

    fn tab_width(&self) -> u32 {
        self.tab_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_lines_and_offsets() {
        let buffer = TextBuffer::new("alpha\nβeta\n\ngamma");
        assert_eq!(buffer.line_count(), 4);
        assert_eq!(buffer.char_len(), 17);
        assert_eq!(buffer.line_start(1), Some(6));
        assert_eq!(buffer.line_content_end(1), Some(10));
        assert_eq!(buffer.line_start(2), Some(11));
        assert_eq!(buffer.line_content_end(2), Some(11));
        assert_eq!(buffer.line_content_end(3), Some(17));
        assert_eq!(buffer.line_start(4), None);
        assert_eq!(buffer.line_at_offset(7), 1);
        assert_eq!(buffer.line_at_offset(10), 1);
        assert_eq!(buffer.line_at_offset(11), 2);
        assert_eq!(buffer.line_at_offset(100), 3);
    }

    #[test]
    fn slices_by_character_offsets() {
        let buffer = TextBuffer::new("héllo\nwörld");
        assert_eq!(buffer.slice(TextSpan::new(1, 4)), "éll");
        assert_eq!(buffer.slice(TextSpan::new(4, 8)), "o\nwö");
        assert_eq!(buffer.slice(TextSpan::new(6, 11)), "wörld");
        assert_eq!(buffer.slice(TextSpan::new(11, 11)), "");
    }

    #[test]
    fn crlf_terminators_are_excluded_from_content() {
        let buffer = TextBuffer::new("ab\r\ncd");
        assert_eq!(buffer.line_content_end(0), Some(2));
        assert_eq!(buffer.line_start(1), Some(4));
    }

    #[test]
    fn trailing_newline_yields_empty_last_line() {
        let buffer = TextBuffer::from_lines(["one", "two", ""]);
        assert_eq!(buffer.text(), "one\ntwo\n");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line_start(2), Some(8));
        assert_eq!(buffer.line_content_end(2), Some(8));
    }

    #[test]
    fn positions_round_trip() {
        let buffer = TextBuffer::new("ab\ncdef");
        assert_eq!(buffer.offset_at(TextPosition::new(1, 2)), Some(5));
        assert_eq!(buffer.offset_at(TextPosition::new(0, 9)), None);
        assert_eq!(buffer.position_at(5), TextPosition::new(1, 2));
    }
}
