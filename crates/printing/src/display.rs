use serde::Serialize;
use textprint_document::Color;

use crate::measure::TextLayout;
use crate::runs::StyleRun;

/// 2D coordinate in points from the top-left corner of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Stroke descriptor for simple line drawing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub width: f32,
    pub color: Color,
}

impl Stroke {
    pub const fn new(width: f32, color: Color) -> Self {
        Self { width, color }
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::new(1.0, Color::BLACK)
    }
}

/// Where page drawing goes.
pub trait RenderSurface {
    /// Paints `layout` with its top-left corner at `origin`.
    fn draw_text(&mut self, layout: &TextLayout, origin: Point);

    fn draw_line(&mut self, start: Point, end: Point, stroke: Stroke);
}

/// One painted visual line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphRun {
    pub text: String,
    pub font: String,
    pub font_size_pt: f32,
    /// Top-left corner of the line box.
    pub position: Point,
    /// Absolute y of the baseline.
    pub baseline: f32,
    pub width: f32,
    pub height: f32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<StyleRun>,
}

/// Drawing commands recorded from a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DisplayCommand {
    GlyphRun(GlyphRun),
    HorizontalRule {
        start: Point,
        end: Point,
        stroke: Stroke,
    },
}

/// Surface that records what was drawn, for previews and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    pub commands: Vec<DisplayCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn glyph_runs(&self) -> impl Iterator<Item = &GlyphRun> {
        self.commands.iter().filter_map(|command| match command {
            DisplayCommand::GlyphRun(run) => Some(run),
            DisplayCommand::HorizontalRule { .. } => None,
        })
    }

    /// Painted text, one entry per glyph run.
    pub fn texts(&self) -> Vec<&str> {
        self.glyph_runs().map(|run| run.text.as_str()).collect()
    }
}

impl RenderSurface for DisplayList {
    fn draw_text(&mut self, layout: &TextLayout, origin: Point) {
        let font = layout.font.to_string();
        let mut y = origin.y;
        for line in &layout.lines {
            self.push(DisplayCommand::GlyphRun(GlyphRun {
                text: line.text.clone(),
                font: font.clone(),
                font_size_pt: layout.font.size_pt,
                position: Point::new(origin.x, y),
                baseline: y + line.baseline,
                width: line.width,
                height: line.height,
                runs: line.runs.clone(),
            }));
            y += line.height;
        }
    }

    fn draw_line(&mut self, start: Point, end: Point, stroke: Stroke) {
        self.push(DisplayCommand::HorizontalRule { start, end, stroke });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontDescriptor;
    use crate::measure::{MeasureRequest, Measurer, MonospaceMeasurer, Overflow};

    #[test]
    fn records_one_run_per_visual_line() {
        let font = FontDescriptor::default();
        let layout = MonospaceMeasurer::default().layout(
            &MeasureRequest::new("the quick brown fox", &font)
                .with_overflow(Overflow::Wrap { width: 60.0 }),
        );
        let mut list = DisplayList::new();
        list.draw_text(&layout, Point::new(10.0, 20.0));
        list.draw_line(Point::new(0.0, 50.0), Point::new(100.0, 50.0), Stroke::default());

        assert_eq!(list.len(), 3);
        assert_eq!(list.texts(), vec!["the quick ", "brown fox"]);
        let runs: Vec<&GlyphRun> = list.glyph_runs().collect();
        assert_eq!(runs[1].position, Point::new(10.0, 32.0));
        assert_eq!(runs[1].baseline, 42.0);
        assert_eq!(runs[0].font, "Monospace 10");
    }
}
