use textprint_document::{DocumentSource, TextSpan};
use thiserror::Error;

use crate::font::FontDescriptor;
use crate::measure::Overflow;
use crate::settings::{BandPreferences, PrintSettings};

/// Raw template text for one page band.
/// （頁首或頁尾的原始範本。）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFooterSpec {
    pub left: Option<String>,
    pub center: Option<String>,
    pub right: Option<String>,
    pub show_separator: bool,
}

impl HeaderFooterSpec {
    pub fn new(
        left: Option<&str>,
        center: Option<&str>,
        right: Option<&str>,
        show_separator: bool,
    ) -> Self {
        Self {
            left: left.map(str::to_owned),
            center: center.map(str::to_owned),
            right: right.map(str::to_owned),
            show_separator,
        }
    }

    /// Builds a spec from preferences, `None` when disabled or blank.
    /// （由偏好設定建立；停用或全空時回傳 `None`。）
    pub fn from_band(band: &BandPreferences) -> Option<Self> {
        if !band.enabled || band.is_blank() {
            return None;
        }
        Some(Self {
            left: band.left.clone(),
            center: band.center.clone(),
            right: band.right.clone(),
            show_separator: band.separator,
        })
    }
}

/// Immutable configuration of one print job.
/// （單一列印作業的不可變設定。）
#[derive(Debug, Clone, PartialEq)]
pub struct PrintConfig {
    pub wrap: bool,
    pub ellipsize: bool,
    pub use_styles: bool,
    pub show_line_numbers: bool,
    pub line_number_step: u32,
    pub header: Option<HeaderFooterSpec>,
    pub footer: Option<HeaderFooterSpec>,
    pub custom_font: Option<FontDescriptor>,
    pub line_number_font: Option<FontDescriptor>,
    pub header_font: Option<FontDescriptor>,
    pub first_line: usize,
    /// Negative means "through the last line".
    /// （負值代表列印到文件結尾。）
    pub last_line: i64,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self::from_settings(&PrintSettings::default())
    }
}

impl PrintConfig {
    pub fn from_settings(settings: &PrintSettings) -> Self {
        Self {
            wrap: settings.wrap,
            ellipsize: settings.ellipsize && !settings.wrap,
            use_styles: settings.use_styles,
            show_line_numbers: settings.show_line_numbers,
            line_number_step: settings.line_number_step.max(1),
            header: HeaderFooterSpec::from_band(&settings.header),
            footer: HeaderFooterSpec::from_band(&settings.footer),
            custom_font: settings.custom_font().cloned(),
            line_number_font: settings.line_number_font.clone(),
            header_font: settings.header_font.clone(),
            first_line: 0,
            last_line: -1,
        }
    }

    /// Restricts the job to an inclusive line range.
    /// （限定列印的行範圍（含 `last_line`）。）
    pub fn with_line_range(mut self, first_line: usize, last_line: i64) -> Self {
        self.first_line = first_line;
        self.last_line = last_line;
        self
    }

    /// Whether the zero-based `line` gets a visible number.
    /// （該行（0 起算）是否顯示行號。）
    pub fn line_number_displayed(&self, line: usize) -> bool {
        self.show_line_numbers
            && self.line_number_step > 0
            && (line + 1) % self.line_number_step as usize == 0
    }

    /// Measuring mode implied by the wrap/ellipsize flags.
    /// （依換行設定決定量測方式。）
    pub fn overflow(&self, text_width: f32) -> Overflow {
        if self.wrap {
            Overflow::Wrap { width: text_width }
        } else if self.ellipsize {
            Overflow::Ellipsize { width: text_width }
        } else {
            Overflow::Unbounded
        }
    }

    /// Resolves the line range against `document`.
    /// （將行範圍對應到文件位移並檢查邊界。）
    pub fn resolve_lines<D>(&self, document: &D) -> Result<LineSelection, ConfigError>
    where
        D: DocumentSource + ?Sized,
    {
        if self.line_number_step == 0 {
            return Err(ConfigError::ZeroLineNumberStep);
        }
        let line_count = document.line_count();
        if self.first_line >= line_count {
            return Err(ConfigError::FirstLineOutOfRange {
                first_line: self.first_line,
                line_count,
            });
        }
        let last_line = if self.last_line < 0 {
            line_count - 1
        } else {
            let last = usize::try_from(self.last_line).unwrap_or(usize::MAX);
            if last >= line_count {
                return Err(ConfigError::LastLineOutOfRange {
                    last_line: last,
                    line_count,
                });
            }
            if last < self.first_line {
                return Err(ConfigError::InvertedRange {
                    first_line: self.first_line,
                    last_line: last,
                });
            }
            last
        };

        let start = document
            .line_start(self.first_line)
            .ok_or(ConfigError::FirstLineOutOfRange {
                first_line: self.first_line,
                line_count,
            })?;
        let end = document
            .line_start(last_line + 1)
            .unwrap_or_else(|| document.char_len());

        Ok(LineSelection {
            first_line: self.first_line,
            last_line,
            start,
            end,
        })
    }
}

/// A line range resolved to document offsets.
/// （已解析的列印行範圍。）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSelection {
    pub first_line: usize,
    /// Inclusive.
    /// （含此行。）
    pub last_line: usize,
    pub start: usize,
    /// Start of the line after `last_line`, or the document end.
    /// （下一行行首，或文件結尾。）
    pub end: usize,
}

impl LineSelection {
    pub fn span(&self) -> TextSpan {
        TextSpan::new(self.start, self.end)
    }

    pub fn line_count(&self) -> usize {
        self.last_line - self.first_line + 1
    }

    /// Largest 1-based line number that can be printed.
    /// （最後一個可能顯示的行號（1 起算）。）
    pub fn max_line_number(&self) -> usize {
        self.last_line + 1
    }
}

/// Configuration errors reported before any measuring starts.
/// （列印設定錯誤。）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("first line {first_line} is outside the document ({line_count} lines)")]
    FirstLineOutOfRange { first_line: usize, line_count: usize },
    #[error("last line {last_line} is outside the document ({line_count} lines)")]
    LastLineOutOfRange { last_line: usize, line_count: usize },
    #[error("last line {last_line} precedes first line {first_line}")]
    InvertedRange { first_line: usize, last_line: usize },
    #[error("line number step must be at least 1")]
    ZeroLineNumberStep,
}

#[cfg(test)]
mod tests {
    use super::*;
    use textprint_document::TextBuffer;

    fn buffer() -> TextBuffer {
        TextBuffer::from_lines(["alpha", "beta", "gamma", "delta"])
    }

    #[test]
    fn whole_document_by_default() {
        let selection = PrintConfig::default().resolve_lines(&buffer()).unwrap();
        assert_eq!(selection.first_line, 0);
        assert_eq!(selection.last_line, 3);
        assert_eq!(selection.span(), TextSpan::new(0, 22));
        assert_eq!(selection.line_count(), 4);
    }

    #[test]
    fn inner_range_ends_at_next_line_start() {
        let selection = PrintConfig::default()
            .with_line_range(1, 2)
            .resolve_lines(&buffer())
            .unwrap();
        assert_eq!(selection.start, 6);
        assert_eq!(selection.end, 17);
        assert_eq!(selection.max_line_number(), 3);
    }

    #[test]
    fn rejects_bad_ranges() {
        let doc = buffer();
        assert_eq!(
            PrintConfig::default().with_line_range(4, -1).resolve_lines(&doc),
            Err(ConfigError::FirstLineOutOfRange {
                first_line: 4,
                line_count: 4
            })
        );
        assert_eq!(
            PrintConfig::default().with_line_range(0, 9).resolve_lines(&doc),
            Err(ConfigError::LastLineOutOfRange {
                last_line: 9,
                line_count: 4
            })
        );
        assert_eq!(
            PrintConfig::default().with_line_range(3, 1).resolve_lines(&doc),
            Err(ConfigError::InvertedRange {
                first_line: 3,
                last_line: 1
            })
        );
        let config = PrintConfig {
            line_number_step: 0,
            ..PrintConfig::default()
        };
        assert_eq!(config.resolve_lines(&doc), Err(ConfigError::ZeroLineNumberStep));
    }

    #[test]
    fn line_number_step_selects_rows() {
        let config = PrintConfig {
            show_line_numbers: true,
            line_number_step: 5,
            ..PrintConfig::default()
        };
        assert!(!config.line_number_displayed(0));
        assert!(config.line_number_displayed(4));
        assert!(config.line_number_displayed(9));
        assert!(!PrintConfig::default().line_number_displayed(4));
    }

    #[test]
    fn settings_translate_into_config() {
        let mut settings = PrintSettings::default();
        settings.header.enabled = false;
        settings.wrap = false;
        settings.ellipsize = true;
        let config = PrintConfig::from_settings(&settings);
        assert!(config.header.is_none());
        assert_eq!(
            config.footer.as_ref().and_then(|spec| spec.center.as_deref()),
            Some("Page %Ep of %EP")
        );
        assert_eq!(config.overflow(100.0), Overflow::Ellipsize { width: 100.0 });
    }
}
