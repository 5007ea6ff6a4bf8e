use std::fmt::Write as _;

use thiserror::Error;

use crate::clock::{Clock, Timestamp};
use crate::config::HeaderFooterSpec;

/// One piece of a parsed header/footer template.
/// （解析後頁首／頁尾範本的單一片段。）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HFChunk {
    /// Text passed through the date formatter (`strftime` directives allowed).
    Literal(String),
    /// `%Ep`: current page, 1-based.
    PageNumber,
    /// `%EP`: total page count.
    TotalPages,
    /// `%EF`: full file name.
    FileName,
    /// `%Ef`: base name of the file.
    BaseName,
}

/// Parsed header/footer template.
/// （已解析的頁首／頁尾範本。）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFooterTemplate {
    source: String,
    chunks: Vec<HFChunk>,
}

/// Errors raised while parsing header/footer templates.
/// （解析頁首／頁尾範本時可能發生的錯誤。）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("template '{template}' ends with a lone '%'")]
    TrailingPercent { template: String },
    #[error("template '{template}' ends with an incomplete '%E' escape")]
    TrailingEscape { template: String },
    #[error("unknown directive '%E{directive}' at byte {position} in template '{template}'")]
    UnknownDirective {
        template: String,
        directive: char,
        position: usize,
    },
}

impl TemplateError {
    pub fn template(&self) -> &str {
        match self {
            TemplateError::TrailingPercent { template }
            | TemplateError::TrailingEscape { template }
            | TemplateError::UnknownDirective { template, .. } => template,
        }
    }
}

/// Per-page values substituted into a template.
/// （每頁代入範本的值。）
#[derive(Debug, Clone, Copy)]
pub struct TemplateContext<'a> {
    pub timestamp: Timestamp,
    pub page_number: usize,
    pub total_pages: usize,
    pub filename: Option<&'a str>,
    pub basename: Option<&'a str>,
}

impl HeaderFooterTemplate {
    /// Parses `template`, rejecting it whole on any malformed `%E` escape.
    /// （解析範本；任何錯誤的 `%E` 跳脫都會使整個範本失效。）
    ///
    /// A `%` followed by anything but `E` is left in the literal text for the
    /// date formatter, so `%%` and `%x` survive untouched.
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let bytes = template.as_bytes();
        let mut chunks = Vec::new();
        let mut literal_start = 0;
        let mut pos = 0;

        while let Some(found) = template[pos..].find('%') {
            let at = pos + found;
            match bytes.get(at + 1) {
                None => {
                    return Err(TemplateError::TrailingPercent {
                        template: template.to_string(),
                    })
                }
                Some(b'E') => {
                    let chunk = match bytes.get(at + 2) {
                        None => {
                            return Err(TemplateError::TrailingEscape {
                                template: template.to_string(),
                            })
                        }
                        Some(b'f') => HFChunk::BaseName,
                        Some(b'F') => HFChunk::FileName,
                        Some(b'p') => HFChunk::PageNumber,
                        Some(b'P') => HFChunk::TotalPages,
                        Some(_) => {
                            let directive = template[at + 2..].chars().next().unwrap_or('?');
                            return Err(TemplateError::UnknownDirective {
                                template: template.to_string(),
                                directive,
                                position: at,
                            });
                        }
                    };
                    if literal_start < at {
                        chunks.push(HFChunk::Literal(template[literal_start..at].to_string()));
                    }
                    chunks.push(chunk);
                    pos = at + 3;
                    literal_start = pos;
                }
                Some(_) => {
                    let skipped = template[at + 1..].chars().next().map_or(1, char::len_utf8);
                    pos = at + 1 + skipped;
                }
            }
        }

        if literal_start < template.len() {
            chunks.push(HFChunk::Literal(template[literal_start..].to_string()));
        }

        Ok(Self {
            source: template.to_string(),
            chunks,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn chunks(&self) -> &[HFChunk] {
        &self.chunks
    }

    /// Renders the template for one page.
    /// （為單一頁面產生範本文字。）
    ///
    /// Missing file names and date-format failures contribute nothing and are
    /// logged; they never fail the page.
    pub fn evaluate<C>(&self, context: &TemplateContext<'_>, clock: &C) -> String
    where
        C: Clock + ?Sized,
    {
        let mut output = String::new();
        for chunk in &self.chunks {
            match chunk {
                HFChunk::Literal(text) => match clock.format_time(text, &context.timestamp) {
                    Ok(formatted) => output.push_str(&formatted),
                    Err(err) => log::warn!("skipping header/footer text: {err}"),
                },
                HFChunk::PageNumber => {
                    let _ = write!(output, "{}", context.page_number);
                }
                HFChunk::TotalPages => {
                    let _ = write!(output, "{}", context.total_pages);
                }
                HFChunk::FileName => match context.filename {
                    Some(name) => output.push_str(name),
                    None => log::warn!(
                        "template '{}' uses %EF but the document has no file name",
                        self.source
                    ),
                },
                HFChunk::BaseName => match context.basename {
                    Some(name) => output.push_str(name),
                    None => log::warn!(
                        "template '{}' uses %Ef but the document has no file name",
                        self.source
                    ),
                },
            }
        }
        output
    }
}

/// Horizontal slot of a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// The three parsed slots of a header or footer.
/// （頁首或頁尾的三個已解析欄位。）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderFooterBand {
    pub left: Option<HeaderFooterTemplate>,
    pub center: Option<HeaderFooterTemplate>,
    pub right: Option<HeaderFooterTemplate>,
    pub show_separator: bool,
}

impl HeaderFooterBand {
    /// Parses every slot; any slot failing rejects the whole band.
    pub fn parse(spec: &HeaderFooterSpec) -> Result<Self, TemplateError> {
        let parse_slot = |slot: &Option<String>| {
            slot.as_deref()
                .map(HeaderFooterTemplate::parse)
                .transpose()
        };
        Ok(Self {
            left: parse_slot(&spec.left)?,
            center: parse_slot(&spec.center)?,
            right: parse_slot(&spec.right)?,
            show_separator: spec.show_separator,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.center.is_none() && self.right.is_none()
    }

    pub fn slots(&self) -> impl Iterator<Item = (Alignment, &HeaderFooterTemplate)> {
        [
            (Alignment::Left, self.left.as_ref()),
            (Alignment::Center, self.center.as_ref()),
            (Alignment::Right, self.right.as_ref()),
        ]
        .into_iter()
        .filter_map(|(alignment, template)| template.map(|template| (alignment, template)))
    }
}
