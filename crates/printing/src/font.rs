use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use textprint_document::Weight;
use thiserror::Error;

use crate::config::PrintConfig;

const DEFAULT_FAMILY: &str = "Monospace";
const DEFAULT_SIZE_PT: f32 = 10.0;

/// Font request passed to the measurer, written as `"Family [Style...] Size"`.
///
/// The string form matches the usual desktop font-name notation, e.g.
/// `"DejaVu Sans Mono Bold 11"` or `"Serif Italic 9.5"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FontDescriptor {
    pub family: String,
    pub size_pt: f32,
    pub weight: Weight,
    pub italic: bool,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: DEFAULT_FAMILY.to_string(),
            size_pt: DEFAULT_SIZE_PT,
            weight: Weight::NORMAL,
            italic: false,
        }
    }
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, size_pt: f32) -> Self {
        Self {
            family: family.into(),
            size_pt,
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = Weight::BOLD;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn parse(input: &str) -> Result<Self, FontParseError> {
        let mut words: Vec<&str> = input.split_whitespace().collect();
        if words.is_empty() {
            return Err(FontParseError::Empty);
        }

        let mut font = FontDescriptor::default();
        if let Some(last) = words.last() {
            if last.chars().next().is_some_and(|ch| ch.is_ascii_digit()) {
                let size: f32 = last
                    .parse()
                    .map_err(|_| FontParseError::InvalidSize(last.to_string()))?;
                if size <= 0.0 || !size.is_finite() {
                    return Err(FontParseError::InvalidSize(last.to_string()));
                }
                font.size_pt = size;
                words.pop();
            }
        }

        while let Some(word) = words.last() {
            match word.to_ascii_lowercase().as_str() {
                "bold" => font.weight = Weight::BOLD,
                "light" => font.weight = Weight::LIGHT,
                "italic" | "oblique" => font.italic = true,
                "regular" | "normal" | "book" => {}
                _ => break,
            }
            words.pop();
        }

        if words.is_empty() {
            return Err(FontParseError::MissingFamily(input.trim().to_string()));
        }
        font.family = words.join(" ");
        Ok(font)
    }
}

impl fmt::Display for FontDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.family)?;
        if self.weight == Weight::BOLD {
            write!(f, " Bold")?;
        } else if self.weight == Weight::LIGHT {
            write!(f, " Light")?;
        }
        if self.italic {
            write!(f, " Italic")?;
        }
        write!(f, " {}", self.size_pt)
    }
}

impl FromStr for FontDescriptor {
    type Err = FontParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FontDescriptor {
    type Error = FontParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FontDescriptor> for String {
    fn from(font: FontDescriptor) -> Self {
        font.to_string()
    }
}

/// Fonts resolved for one job.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintFonts {
    pub body: FontDescriptor,
    pub line_number: FontDescriptor,
    pub band: FontDescriptor,
}

impl PrintFonts {
    /// The custom font wins over the document's own font; line numbers and
    /// bands fall back to the body font.
    pub fn resolve(config: &PrintConfig, document_font: Option<&FontDescriptor>) -> Self {
        let body = config
            .custom_font
            .clone()
            .or_else(|| document_font.cloned())
            .unwrap_or_default();
        let line_number = config
            .line_number_font
            .clone()
            .unwrap_or_else(|| body.clone());
        let band = config.header_font.clone().unwrap_or_else(|| body.clone());
        Self {
            body,
            line_number,
            band,
        }
    }
}

/// Errors raised while parsing font names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FontParseError {
    #[error("font name is empty")]
    Empty,
    #[error("font name '{0}' has no family")]
    MissingFamily(String),
    #[error("invalid font size '{0}'")]
    InvalidSize(String),
}
