/// Baseline and height of a laid-out run, both from its top edge.
/// （版面的基線與高度。）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub baseline: f32,
    pub height: f32,
}

impl LayoutMetrics {
    pub const fn new(baseline: f32, height: f32) -> Self {
        Self { baseline, height }
    }
}

/// Vertical offsets that put a line number and its text on one baseline.
/// （行號與內文共用基線時的垂直位移。）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowAlignment {
    pub text_y_offset: f32,
    pub line_number_y_offset: f32,
    /// Bottom of whichever run reaches lowest.
    /// （兩者中延伸最低者的底部。）
    pub row_height: f32,
}

/// Aligns a text run and its line-number run on a shared baseline.
/// （對齊內文與行號的基線。）
///
/// The run whose baseline sits higher is pushed down by the difference, and the
/// row grows to cover whichever run then extends furthest below.
pub fn align(text: LayoutMetrics, line_number: LayoutMetrics) -> RowAlignment {
    if text.baseline > line_number.baseline {
        let shift = text.baseline - line_number.baseline;
        RowAlignment {
            text_y_offset: 0.0,
            line_number_y_offset: shift,
            row_height: text.height.max(shift + line_number.height),
        }
    } else {
        let shift = line_number.baseline - text.baseline;
        RowAlignment {
            text_y_offset: shift,
            line_number_y_offset: 0.0,
            row_height: line_number.height.max(shift + text.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taller_line_number_font_pushes_text_down() {
        let text = LayoutMetrics::new(10.0, 12.0);
        let number = LayoutMetrics::new(20.0, 24.0);
        let row = align(text, number);
        assert!(row.text_y_offset > 0.0);
        assert_eq!(row.text_y_offset, 10.0);
        assert_eq!(row.line_number_y_offset, 0.0);
        assert!(row.row_height >= number.height);
        assert_eq!(row.row_height, 24.0);
    }

    #[test]
    fn smaller_line_number_font_moves_the_number() {
        let text = LayoutMetrics::new(10.0, 12.0);
        let number = LayoutMetrics::new(8.0, 9.6);
        let row = align(text, number);
        assert_eq!(row.text_y_offset, 0.0);
        assert_eq!(row.line_number_y_offset, 2.0);
        assert_eq!(row.row_height, 12.0);
    }

    #[test]
    fn deep_descender_extends_the_row() {
        let text = LayoutMetrics::new(10.0, 12.0);
        let number = LayoutMetrics::new(6.0, 14.0);
        let row = align(text, number);
        assert_eq!(row.line_number_y_offset, 4.0);
        assert_eq!(row.row_height, 18.0);
    }

    #[test]
    fn wrapped_text_keeps_its_full_height() {
        let text = LayoutMetrics::new(10.0, 36.0);
        let number = LayoutMetrics::new(10.0, 12.0);
        let row = align(text, number);
        assert_eq!(row.text_y_offset, 0.0);
        assert_eq!(row.row_height, 36.0);
    }
}
