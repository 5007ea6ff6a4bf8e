use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 24-bit RGB colour.
/// （24 位元 RGB 顏色。）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `#rgb`.
    /// （解析 `#rrggbb` 或 `#rgb`。）
    pub fn from_hex(input: &str) -> Result<Self, ColorParseError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(trimmed.to_string()))?;
        if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigits(trimmed.to_string()));
        }
        let channel = |text: &str| u8::from_str_radix(text, 16);
        match digits.len() {
            6 => Ok(Self::rgb(
                channel(&digits[0..2]).map_err(|_| ColorParseError::InvalidDigits(trimmed.into()))?,
                channel(&digits[2..4]).map_err(|_| ColorParseError::InvalidDigits(trimmed.into()))?,
                channel(&digits[4..6]).map_err(|_| ColorParseError::InvalidDigits(trimmed.into()))?,
            )),
            3 => {
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(digits.chars()) {
                    let nibble = ch.to_digit(16).unwrap_or(0) as u8;
                    *slot = nibble * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            other => Err(ColorParseError::InvalidLength(other)),
        }
    }

    /// Normalised floating-point channels.
    /// （轉為 0.0–1.0 的浮點通道。）
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Errors raised while parsing colour strings.
/// （顏色字串解析錯誤。）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("colour '{0}' must start with '#'")]
    MissingHash(String),
    #[error("colour '{0}' contains non-hex digits")]
    InvalidDigits(String),
    #[error("colour must have 3 or 6 hex digits, found {0}")]
    InvalidLength(usize),
}

/// Font weight on the CSS numeric scale.
/// （字重（CSS 數值）。）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Weight(pub u16);

impl Weight {
    pub const LIGHT: Weight = Weight(300);
    pub const NORMAL: Weight = Weight(400);
    pub const BOLD: Weight = Weight(700);
}

/// Underline style.
/// （底線樣式。）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnderlineKind {
    None,
    Single,
    Double,
    Low,
    Error,
}

/// Attribute set a tag may carry; `None` means "not set".
/// （標籤可設定的文字屬性集合；`None` 表示未設定。）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleAttrs {
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub weight: Option<Weight>,
    pub italic: Option<bool>,
    pub underline: Option<UnderlineKind>,
    pub strikethrough: Option<bool>,
}

impl StyleAttrs {
    pub fn is_empty(&self) -> bool {
        *self == StyleAttrs::default()
    }

    /// Overrides every attribute that `other` sets.
    /// （以 `other` 中已設定的屬性覆寫自身。）
    pub fn overlay(&mut self, other: &StyleAttrs) {
        if other.foreground.is_some() {
            self.foreground = other.foreground;
        }
        if other.background.is_some() {
            self.background = other.background;
        }
        if other.weight.is_some() {
            self.weight = other.weight;
        }
        if other.italic.is_some() {
            self.italic = other.italic;
        }
        if other.underline.is_some() {
            self.underline = other.underline;
        }
        if other.strikethrough.is_some() {
            self.strikethrough = other.strikethrough;
        }
    }

    pub fn with_foreground(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_underline(mut self, underline: UnderlineKind) -> Self {
        self.underline = Some(underline);
        self
    }

    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = Some(strikethrough);
        self
    }
}
