use serde::Serialize;
use thiserror::Error;

use crate::font::FontDescriptor;
use crate::job::PageSetup;
use crate::measure::Measurer;

/// Probe string whose height stands for any band text.
/// （用來量測頁首頁尾文字高度的樣本字串。）
pub const BAND_PROBE_TEXT: &str = "AAAyyy";
/// Thickness of the band separator rule, in points.
/// （分隔線粗細（點）。）
pub const SEPARATOR_HEIGHT: f32 = 1.0;
/// Space between the line-number column and the text, in points.
/// （行號欄與內文之間的間距（點）。）
pub const LINE_NUMBER_GUTTER: f32 = 3.0;

/// Rectangle on the sheet, in points from the top-left corner.
/// （頁面上的矩形（點，原點在左上）。）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrintableArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PrintableArea {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area left after removing the margins from the sheet.
    /// （扣除邊界後的可列印範圍。）
    pub fn from_setup(setup: &PageSetup) -> Self {
        let (width, height) = setup.page_size_pt();
        let margins = setup.margins;
        Self {
            x: margins.left,
            y: margins.top,
            width: (width - margins.left - margins.right).max(0.0),
            height: (height - margins.top - margins.bottom).max(0.0),
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Vertical space taken by one page band.
/// （頁首或頁尾所佔的垂直空間。）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandMetrics {
    pub text_height: f32,
    pub separator_before: f32,
    pub separator_after: f32,
    pub separator_height: f32,
    pub show_separator: bool,
}

impl BandMetrics {
    /// Measures the band text height with [`BAND_PROBE_TEXT`].
    /// （以樣本字串量測文字高度。）
    pub fn measure<M>(measurer: &M, font: &FontDescriptor, show_separator: bool) -> Self
    where
        M: Measurer + ?Sized,
    {
        Self::from_text_height(measurer.text_height(BAND_PROBE_TEXT, font), show_separator)
    }

    pub fn from_text_height(text_height: f32, show_separator: bool) -> Self {
        Self {
            text_height,
            separator_before: text_height / 2.0,
            separator_after: text_height / 2.0,
            separator_height: SEPARATOR_HEIGHT,
            show_separator,
        }
    }

    /// Total height reserved for the band.
    /// （頁首頁尾總高度。）
    pub fn total(&self) -> f32 {
        self.text_height + self.separator_before + self.separator_after + self.rule_height()
    }

    fn rule_height(&self) -> f32 {
        if self.show_separator {
            self.separator_height
        } else {
            0.0
        }
    }
}

/// The line-number column on the leading edge of the page.
/// （行號欄。）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineNumberColumn {
    pub x: f32,
    pub width: f32,
    pub gutter: f32,
    pub digits: usize,
}

impl LineNumberColumn {
    /// Right edge that numbers are aligned to.
    /// （行號靠右對齊的右緣。）
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// What the calculator needs to size the line-number column.
/// （行號欄的量測需求。）
#[derive(Debug, Clone, Copy)]
pub struct LineNumberRequest<'a> {
    pub max_line_number: usize,
    pub font: &'a FontDescriptor,
}

/// Inputs of [`compute`].
/// （版面計算的輸入。）
#[derive(Debug, Clone, Copy)]
pub struct GeometryRequest<'a> {
    pub area: PrintableArea,
    pub header: Option<BandMetrics>,
    pub footer: Option<BandMetrics>,
    pub line_numbers: Option<LineNumberRequest<'a>>,
}

impl<'a> GeometryRequest<'a> {
    pub fn new(area: PrintableArea) -> Self {
        Self {
            area,
            header: None,
            footer: None,
            line_numbers: None,
        }
    }

    pub fn with_header(mut self, header: BandMetrics) -> Self {
        self.header = Some(header);
        self
    }

    pub fn with_footer(mut self, footer: BandMetrics) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn with_line_numbers(mut self, max_line_number: usize, font: &'a FontDescriptor) -> Self {
        self.line_numbers = Some(LineNumberRequest {
            max_line_number,
            font,
        });
        self
    }
}

/// Page geometry shared by every page of a job.
/// （整個作業共用的頁面幾何。）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageGeometry {
    /// Printable area inside the margins.
    /// （扣除邊界後的可列印範圍。）
    pub area: PrintableArea,
    /// Rectangle available to body text.
    /// （內文矩形。）
    pub text: PrintableArea,
    pub header: Option<BandMetrics>,
    pub footer: Option<BandMetrics>,
    pub line_numbers: Option<LineNumberColumn>,
    /// Set when the bands did not fit and the full height is used instead.
    /// （頁首頁尾放不下時改用整頁高度。）
    pub degraded: bool,
}

impl PageGeometry {
    /// Geometry with no bands and no line numbers.
    /// （無頁首頁尾與行號的版面。）
    pub fn plain(area: PrintableArea) -> Self {
        Self {
            area,
            text: area,
            header: None,
            footer: None,
            line_numbers: None,
            degraded: false,
        }
    }

    pub fn header_text_y(&self) -> f32 {
        self.area.y
    }

    pub fn header_separator_y(&self) -> Option<f32> {
        let band = self.header.filter(|band| band.show_separator)?;
        Some(self.area.y + band.text_height + band.separator_before + band.separator_height / 2.0)
    }

    pub fn footer_text_y(&self) -> Option<f32> {
        let band = self.footer?;
        Some(self.body_bottom() + band.separator_before + band.rule_height() + band.separator_after)
    }

    pub fn footer_separator_y(&self) -> Option<f32> {
        let band = self.footer.filter(|band| band.show_separator)?;
        Some(self.body_bottom() + band.separator_before + band.separator_height / 2.0)
    }

    fn body_bottom(&self) -> f32 {
        if self.degraded {
            let reserved = self.footer.map_or(0.0, |band| band.total());
            self.area.bottom() - reserved
        } else {
            self.text.bottom()
        }
    }
}

/// Errors raised by the page geometry calculator.
/// （版面計算錯誤。）
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("header and footer need {required:.1}pt but the page only has {available:.1}pt")]
    BandsExceedPage { required: f32, available: f32 },
    #[error("printable area {width:.1}x{height:.1}pt leaves no room for text")]
    NonPositiveArea { width: f32, height: f32 },
}

/// Computes the body rectangle and the line-number column.
/// （計算內文矩形與行號欄。）
pub fn compute<M>(request: &GeometryRequest<'_>, measurer: &M) -> Result<PageGeometry, GeometryError>
where
    M: Measurer + ?Sized,
{
    let area = request.area;
    if area.width <= 0.0 || area.height <= 0.0 {
        return Err(GeometryError::NonPositiveArea {
            width: area.width,
            height: area.height,
        });
    }

    let header_height = request.header.map_or(0.0, |band| band.total());
    let footer_height = request.footer.map_or(0.0, |band| band.total());
    let text_height = area.height - header_height - footer_height;
    if text_height < 0.0 {
        return Err(GeometryError::BandsExceedPage {
            required: header_height + footer_height,
            available: area.height,
        });
    }

    let mut text = PrintableArea::new(area.x, area.y + header_height, area.width, text_height);
    let line_numbers = match request.line_numbers {
        Some(ln) => {
            let column = line_number_column(area.x, ln, measurer);
            text.x += column.width + column.gutter;
            text.width -= column.width + column.gutter;
            if text.width <= 0.0 {
                return Err(GeometryError::NonPositiveArea {
                    width: text.width,
                    height: text.height,
                });
            }
            Some(column)
        }
        None => None,
    };

    Ok(PageGeometry {
        area,
        text,
        header: request.header,
        footer: request.footer,
        line_numbers,
        degraded: false,
    })
}

/// Like [`compute`], but falls back to the full page height when the bands do not fit.
/// （頁首頁尾放不下時退回整頁高度並記錄警告。）
pub fn compute_with_fallback<M>(
    request: &GeometryRequest<'_>,
    measurer: &M,
) -> Result<PageGeometry, GeometryError>
where
    M: Measurer + ?Sized,
{
    match compute(request, measurer) {
        Err(err @ GeometryError::BandsExceedPage { .. }) => {
            log::warn!("{err}; printing over the full page height");
            let bandless = GeometryRequest {
                header: None,
                footer: None,
                ..*request
            };
            let mut geometry = compute(&bandless, measurer)?;
            geometry.header = request.header;
            geometry.footer = request.footer;
            geometry.degraded = true;
            Ok(geometry)
        }
        other => other,
    }
}

fn line_number_column<M>(x: f32, request: LineNumberRequest<'_>, measurer: &M) -> LineNumberColumn
where
    M: Measurer + ?Sized,
{
    let digits = decimal_digits(request.max_line_number);
    let widest = "9".repeat(digits);
    LineNumberColumn {
        x,
        width: measurer.text_width(&widest, request.font),
        gutter: LINE_NUMBER_GUTTER,
        digits,
    }
}

fn decimal_digits(value: usize) -> usize {
    let mut digits = 1;
    let mut rest = value / 10;
    while rest > 0 {
        digits += 1;
        rest /= 10;
    }
    digits
}
