use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use textprint_document::{DocumentSource, TextSpan};

use crate::baseline::{align, RowAlignment};
use crate::config::{ConfigError, LineSelection, PrintConfig};
use crate::font::PrintFonts;
use crate::geometry::PageGeometry;
use crate::measure::{MeasureRequest, Measurer, TextLayout};
use crate::runs::extract_runs;

/// Tolerance absorbing float rounding when comparing heights against the page.
pub const PAGE_HEIGHT_EPSILON: f32 = 0.1;

/// Offset of the first character printed on a page.
/// （頁面第一個字元在文件中的位移。）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PageStart {
    pub offset: usize,
}

impl PageStart {
    pub const fn new(offset: usize) -> Self {
        Self { offset }
    }
}

/// How pagination ended.
/// （分頁結束的狀態。）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationStatus {
    Complete,
    Cancelled,
}

/// Page list produced for one job.
/// （單一作業的分頁結果。）
#[derive(Debug, Clone, PartialEq)]
pub struct Pagination {
    pub pages: Vec<PageStart>,
    pub status: PaginationStatus,
    pub selection: LineSelection,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn is_complete(&self) -> bool {
        self.status == PaginationStatus::Complete
    }

    /// Characters printed on page `index`; the last page ends with the selection.
    /// （第 `index` 頁涵蓋的字元範圍。）
    pub fn page_span(&self, index: usize) -> Option<TextSpan> {
        let start = self.pages.get(index)?.offset;
        let end = self
            .pages
            .get(index + 1)
            .map_or(self.selection.end, |next| next.offset);
        Some(TextSpan::new(start, end))
    }

    pub fn spans(&self) -> impl Iterator<Item = TextSpan> + '_ {
        (0..self.pages.len()).filter_map(|index| self.page_span(index))
    }
}

/// Cooperative cancellation shared with the caller.
/// （與呼叫端共享的取消旗標。）
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A measured chunk of one source line, with its optional line number.
/// （已量測的行片段與其行號。）
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredChunk {
    pub span: TextSpan,
    pub layout: TextLayout,
    pub line_number: Option<NumberedRow>,
}

/// Line-number layout aligned with the first visual row of its line.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedRow {
    pub layout: TextLayout,
    pub alignment: RowAlignment,
}

impl MeasuredChunk {
    pub fn row_count(&self) -> usize {
        self.layout.line_count()
    }

    /// Height of visual row `index`; a numbered first row covers the number too.
    pub fn row_height(&self, index: usize) -> f32 {
        if index == 0 {
            if let Some(number) = &self.line_number {
                return number.alignment.row_height;
            }
        }
        self.layout.lines.get(index).map_or(0.0, |line| line.height)
    }

    pub fn height(&self) -> f32 {
        (0..self.row_count()).map(|index| self.row_height(index)).sum()
    }
}

/// Measures document chunks the same way for pagination and drawing.
/// （分頁與繪製共用的量測流程。）
pub struct LineLayouter<'a, D: ?Sized, M: ?Sized> {
    document: &'a D,
    measurer: &'a M,
    config: &'a PrintConfig,
    fonts: &'a PrintFonts,
    text_width: f32,
}

impl<'a, D, M> LineLayouter<'a, D, M>
where
    D: DocumentSource + ?Sized,
    M: Measurer + ?Sized,
{
    pub fn new(
        document: &'a D,
        measurer: &'a M,
        config: &'a PrintConfig,
        fonts: &'a PrintFonts,
        geometry: &PageGeometry,
    ) -> Self {
        Self {
            document,
            measurer,
            config,
            fonts,
            text_width: geometry.text.width,
        }
    }

    pub fn document(&self) -> &'a D {
        self.document
    }

    pub fn config(&self) -> &'a PrintConfig {
        self.config
    }

    /// Lays out `span` in the body font, with style runs when enabled.
    pub fn layout_text(&self, span: TextSpan) -> TextLayout {
        let text = self.document.slice(span);
        let runs = if self.config.use_styles {
            extract_runs(self.document, span)
        } else {
            Vec::new()
        };
        let request = MeasureRequest::new(&text, &self.fonts.body)
            .with_runs(&runs)
            .with_overflow(self.config.overflow(self.text_width))
            .with_tab_width(self.document.tab_width());
        self.measurer.layout(&request)
    }

    /// Lays out the 1-based number of the zero-based `line`.
    pub fn layout_line_number(&self, line: usize) -> TextLayout {
        let label = (line + 1).to_string();
        self.measurer
            .layout(&MeasureRequest::new(&label, &self.fonts.line_number))
    }

    /// Measures the part of `line` covered by `span`.
    ///
    /// Only a chunk that starts at the beginning of its line can carry a number.
    pub fn measure_chunk(&self, line: usize, span: TextSpan) -> MeasuredChunk {
        let layout = self.layout_text(span);
        let starts_line = self.document.line_start(line) == Some(span.start);
        let line_number = (starts_line && self.config.line_number_displayed(line)).then(|| {
            let number = self.layout_line_number(line);
            let first_row = layout
                .lines
                .first()
                .map_or_else(|| layout.metrics(), |row| row.metrics());
            let alignment = align(first_row, number.metrics());
            NumberedRow {
                layout: number,
                alignment,
            }
        });
        MeasuredChunk {
            span,
            layout,
            line_number,
        }
    }
}

/// Splits the selected lines into pages.
/// （將選取的行切分為頁面。）
///
/// Lines are placed greedily. A line that does not fit is split between its
/// visual sub-lines when wrapping is on, otherwise it moves to a new page. The
/// first line on a page is always placed, however tall. Cancellation is checked
/// before each source line and returns the pages found so far.
pub fn paginate<D, M>(
    document: &D,
    config: &PrintConfig,
    geometry: &PageGeometry,
    measurer: &M,
    fonts: &PrintFonts,
    cancel: &CancelFlag,
) -> Result<Pagination, ConfigError>
where
    D: DocumentSource + ?Sized,
    M: Measurer + ?Sized,
{
    let selection = config.resolve_lines(document)?;
    let layouter = LineLayouter::new(document, measurer, config, fonts, geometry);
    let page_height = geometry.text.height;
    let started = Instant::now();

    let mut pages = vec![PageStart::new(selection.start)];
    let mut status = PaginationStatus::Complete;
    let mut accumulated = 0.0_f32;
    let mut line = selection.first_line;
    let mut offset = selection.start;

    while line <= selection.last_line {
        let line_start = document.line_start(line).unwrap_or(offset);
        if offset == line_start && cancel.is_cancelled() {
            status = PaginationStatus::Cancelled;
            break;
        }

        let content_end = document.line_content_end(line).unwrap_or(offset).max(offset);
        let chunk = layouter.measure_chunk(line, TextSpan::new(offset, content_end));
        let height = chunk.height();

        if accumulated > PAGE_HEIGHT_EPSILON && accumulated + height > page_height + PAGE_HEIGHT_EPSILON {
            let fitted = if config.wrap && chunk.row_count() > 1 {
                fitting_rows(&chunk, accumulated, page_height)
            } else {
                0
            };
            if fitted > 0 {
                let next = offset + chunk.layout.lines[fitted].start;
                push_page(&mut pages, next);
                accumulated = 0.0;
                offset = next;
                continue;
            }
            push_page(&mut pages, offset);
            accumulated = height;
        } else {
            accumulated += height;
        }

        line += 1;
        offset = document.line_start(line).unwrap_or(selection.end);
    }

    log::debug!(
        "paginated lines {}..={} into {} page(s) in {:?}{}",
        selection.first_line,
        selection.last_line,
        pages.len(),
        started.elapsed(),
        if status == PaginationStatus::Cancelled {
            " (cancelled)"
        } else {
            ""
        }
    );

    Ok(Pagination {
        pages,
        status,
        selection,
    })
}

/// Number of leading rows that fit below `accumulated`, never the whole chunk.
fn fitting_rows(chunk: &MeasuredChunk, accumulated: f32, page_height: f32) -> usize {
    let mut used = accumulated;
    let mut fitted = 0;
    for index in 0..chunk.row_count() {
        let height = chunk.row_height(index);
        if used + height > page_height + PAGE_HEIGHT_EPSILON {
            break;
        }
        used += height;
        fitted = index + 1;
    }
    fitted.min(chunk.row_count().saturating_sub(1))
}

fn push_page(pages: &mut Vec<PageStart>, offset: usize) {
    debug_assert!(
        pages.last().map_or(true, |last| last.offset < offset),
        "page offsets must increase: {:?} then {offset}",
        pages.last()
    );
    pages.push(PageStart::new(offset));
}
