//! 列印核心所需的唯讀文件模型。 / Read-only document model consumed by the print engine.

pub mod buffer;
pub mod decode;
pub mod span;
pub mod style;
pub mod tags;

pub use buffer::{DocumentSource, TextBuffer, TextPosition};
pub use decode::{decode_bytes, DecodedText, LoadError};
pub use span::TextSpan;
pub use style::{Color, ColorParseError, StyleAttrs, UnderlineKind, Weight};
pub use tags::{StyleTag, TagId, TagKind, TagTable};
