//! Drawing of one page: header and footer bands, numbered body rows.

use textprint_document::{Color, DocumentSource, TextSpan};

use crate::clock::Clock;
use crate::display::{Point, RenderSurface, Stroke};
use crate::font::FontDescriptor;
use crate::geometry::PageGeometry;
use crate::layout::LineLayouter;
use crate::measure::{MeasureRequest, Measurer};
use crate::template::{Alignment, HeaderFooterBand, TemplateContext};

/// Which band is being drawn.
/// （目前繪製的頁首或頁尾。）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandPosition {
    Header,
    Footer,
}

/// Draws a header or footer band, with its separator rule when enabled.
/// （繪製頁首或頁尾，並視設定畫出分隔線。）
#[allow(clippy::too_many_arguments)]
pub fn draw_band<S, M, C>(
    surface: &mut S,
    band: &HeaderFooterBand,
    position: BandPosition,
    geometry: &PageGeometry,
    context: &TemplateContext<'_>,
    clock: &C,
    measurer: &M,
    font: &FontDescriptor,
) where
    S: RenderSurface + ?Sized,
    M: Measurer + ?Sized,
    C: Clock + ?Sized,
{
    let (text_y, separator_y) = match position {
        BandPosition::Header => (Some(geometry.header_text_y()), geometry.header_separator_y()),
        BandPosition::Footer => (geometry.footer_text_y(), geometry.footer_separator_y()),
    };
    let Some(text_y) = text_y else {
        return;
    };
    let area = geometry.area;

    for (alignment, template) in band.slots() {
        let text = template.evaluate(context, clock);
        if text.is_empty() {
            continue;
        }
        let layout = measurer.layout(&MeasureRequest::new(&text, font));
        let x = match alignment {
            Alignment::Left => area.x,
            Alignment::Center => area.x + area.width / 2.0 - layout.width / 2.0,
            Alignment::Right => area.right() - layout.width,
        };
        surface.draw_text(&layout, Point::new(x, text_y));
    }

    if let Some(y) = separator_y {
        let thickness = match position {
            BandPosition::Header => geometry.header,
            BandPosition::Footer => geometry.footer,
        }
        .map_or(1.0, |metrics| metrics.separator_height);
        surface.draw_line(
            Point::new(area.x, y),
            Point::new(area.right(), y),
            Stroke::new(thickness, Color::BLACK),
        );
    }
}

/// Draws the body text of `span`, one source line (or line remainder) per row
/// group, with right-aligned numbers on numbered lines.
/// （逐行繪製 `span` 的內文與右對齊行號。）
///
/// Returns the y position below the last drawn row.
pub fn draw_body<S, D, M>(
    surface: &mut S,
    layouter: &LineLayouter<'_, D, M>,
    geometry: &PageGeometry,
    span: TextSpan,
) -> f32
where
    S: RenderSurface + ?Sized,
    D: DocumentSource + ?Sized,
    M: Measurer + ?Sized,
{
    let document = layouter.document();
    let mut y = geometry.text.y;
    let mut offset = span.start;

    while offset < span.end {
        let line = document.line_at_offset(offset);
        let content_end = document
            .line_content_end(line)
            .unwrap_or(span.end)
            .clamp(offset, span.end);
        let chunk = layouter.measure_chunk(line, TextSpan::new(offset, content_end));

        match (&chunk.line_number, geometry.line_numbers) {
            (Some(number), Some(column)) => {
                let alignment = number.alignment;
                surface.draw_text(
                    &number.layout,
                    Point::new(
                        column.right() - number.layout.width,
                        y + alignment.line_number_y_offset,
                    ),
                );
                surface.draw_text(
                    &chunk.layout,
                    Point::new(geometry.text.x, y + alignment.text_y_offset),
                );
            }
            _ => surface.draw_text(&chunk.layout, Point::new(geometry.text.x, y)),
        }
        y += chunk.height();

        offset = match document.line_start(line + 1) {
            Some(next) if next > offset => next,
            _ => span.end,
        };
    }
    y
}
