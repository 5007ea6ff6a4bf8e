use image::{codecs::png::PngEncoder, ColorType, ImageBuffer, ImageEncoder, Rgba};
use textprint_document::{Color, UnderlineKind};
use thiserror::Error;

use crate::display::{DisplayCommand, DisplayList, GlyphRun, Stroke};
use crate::geometry::PrintableArea;

const MIN_DPI: u32 = 36;
const MAX_DPI: u32 = 600;
const GUIDE_COLOR: Color = Color::rgb(230, 230, 230);
const GLYPH_COLOR: Color = Color::rgb(64, 64, 64);

type Canvas = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// Rasterised page preview.
/// （點陣化的頁面預覽。）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePreview {
    pub width_px: u32,
    pub height_px: u32,
    pub dpi: u32,
    pub data: Vec<u8>,
}

/// Errors raised while rasterising a preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("page size {width:.1}x{height:.1}pt cannot be rasterised")]
    EmptyPage { width: f32, height: f32 },
    #[error("failed to encode preview PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Renders a recorded page to PNG.
/// （將記錄的頁面繪製為 PNG。）
///
/// Glyphs are drawn as boxes (one per character cell, tinted by the run's
/// colours); rules are drawn at their stroke width and the printable area is
/// outlined as a margin guide.
pub fn render_preview_png(
    display_list: &DisplayList,
    page_size_pt: (f32, f32),
    area: PrintableArea,
    dpi: u32,
) -> Result<PagePreview, PreviewError> {
    let (page_width_pt, page_height_pt) = page_size_pt;
    if !(page_width_pt > 0.0 && page_height_pt > 0.0) {
        return Err(PreviewError::EmptyPage {
            width: page_width_pt,
            height: page_height_pt,
        });
    }

    let dpi = dpi.clamp(MIN_DPI, MAX_DPI);
    let scale = dpi as f32 / 72.0;
    let width_px = (page_width_pt * scale).ceil().max(1.0) as u32;
    let height_px = (page_height_pt * scale).ceil().max(1.0) as u32;

    let mut image = ImageBuffer::from_pixel(width_px, height_px, Rgba([255, 255, 255, 255]));
    draw_margin_guides(&mut image, area, scale);

    for command in &display_list.commands {
        match command {
            DisplayCommand::GlyphRun(run) => draw_glyph_run(&mut image, run, scale),
            DisplayCommand::HorizontalRule { start, end, stroke } => {
                let x0 = (start.x * scale).round() as i32;
                let x1 = (end.x * scale).round() as i32;
                let y = (start.y * scale).round() as i32;
                draw_horizontal_line(&mut image, x0, x1, y, stroke, scale);
            }
        }
    }

    let mut data = Vec::new();
    PngEncoder::new(&mut data).write_image(image.as_raw(), width_px, height_px, ColorType::Rgba8)?;

    Ok(PagePreview {
        width_px,
        height_px,
        dpi,
        data,
    })
}

fn draw_glyph_run(image: &mut Canvas, run: &GlyphRun, scale: f32) {
    let chars: Vec<char> = run.text.chars().collect();
    if chars.is_empty() {
        return;
    }
    let cell = run.width / chars.len() as f32;
    let top = run.position.y + run.height * 0.25;
    let glyph_height = (run.baseline - top).max(1.0);

    for (idx, ch) in chars.iter().enumerate() {
        let style = run
            .runs
            .iter()
            .find(|styled| styled.start <= idx && idx < styled.end)
            .map(|styled| styled.attrs)
            .unwrap_or_default();
        let x = run.position.x + cell * idx as f32;

        if let Some(background) = style.background {
            fill_rect(
                image,
                (x * scale).round() as i32,
                (run.position.y * scale).round() as i32,
                (cell * scale).ceil() as i32,
                (run.height * scale).ceil() as i32,
                background,
            );
        }
        if ch.is_whitespace() {
            continue;
        }

        let color = style.foreground.unwrap_or(GLYPH_COLOR);
        let inset = cell * 0.15;
        fill_rect(
            image,
            ((x + inset) * scale).round() as i32,
            (top * scale).round() as i32,
            ((cell - 2.0 * inset) * scale).ceil().max(1.0) as i32,
            (glyph_height * scale).ceil() as i32,
            color,
        );

        let underline = style.underline.unwrap_or(UnderlineKind::None);
        if underline != UnderlineKind::None {
            let y = ((run.baseline + 1.0) * scale).round() as i32;
            fill_rect(
                image,
                (x * scale).round() as i32,
                y,
                (cell * scale).ceil() as i32,
                1,
                color,
            );
        }
        if style.strikethrough == Some(true) {
            let y = (((top + run.baseline) / 2.0) * scale).round() as i32;
            fill_rect(
                image,
                (x * scale).round() as i32,
                y,
                (cell * scale).ceil() as i32,
                1,
                Color::WHITE,
            );
        }
    }
}

fn fill_rect(buffer: &mut Canvas, x: i32, y: i32, width: i32, height: i32, color: Color) {
    if width <= 0 || height <= 0 {
        return;
    }
    let width_px = buffer.width() as i32;
    let height_px = buffer.height() as i32;
    let x0 = x.clamp(0, width_px);
    let y0 = y.clamp(0, height_px);
    let x1 = (x + width).clamp(0, width_px);
    let y1 = (y + height).clamp(0, height_px);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let rgba = color_to_rgba(color);
    for yy in y0..y1 {
        for xx in x0..x1 {
            buffer.put_pixel(xx as u32, yy as u32, rgba);
        }
    }
}

fn draw_horizontal_line(buffer: &mut Canvas, x0: i32, x1: i32, y: i32, stroke: &Stroke, scale: f32) {
    let thickness = (stroke.width * scale).round().max(1.0) as i32;
    let start = x0.min(x1);
    let end = x0.max(x1);
    fill_rect(buffer, start, y - thickness / 2, end - start, thickness, stroke.color);
}

fn draw_margin_guides(buffer: &mut Canvas, area: PrintableArea, scale: f32) {
    let left = (area.x * scale).round() as i32;
    let right = (area.right() * scale).round() as i32;
    let top = (area.y * scale).round() as i32;
    let bottom = (area.bottom() * scale).round() as i32;
    fill_rect(buffer, left, top, 1, bottom - top, GUIDE_COLOR);
    fill_rect(buffer, right, top, 1, bottom - top, GUIDE_COLOR);
    fill_rect(buffer, left, top, right - left, 1, GUIDE_COLOR);
    fill_rect(buffer, left, bottom, right - left, 1, GUIDE_COLOR);
}

fn color_to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, 255])
}
