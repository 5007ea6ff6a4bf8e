use std::fs;
use std::io;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use thiserror::Error;

use crate::buffer::TextBuffer;

/// Errors raised while loading a text file for printing.
/// （載入文字檔時可能發生的錯誤。）
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("file encoding is not supported or data is invalid")]
    InvalidEncoding,
}

/// Decoded text together with the detected encoding label.
/// （解碼結果與偵測到的編碼名稱。）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

impl TextBuffer {
    /// Reads a file, detects its encoding and normalises newlines to LF.
    /// （讀取檔案、偵測編碼並統一換行為 LF。）
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let bytes = fs::read(path.as_ref())?;
        let decoded = decode_bytes(&bytes)?;
        Ok(TextBuffer::new(normalize_newlines(&decoded.text)))
    }
}

/// Decodes by BOM first, then UTF-16 heuristics, UTF-8 and legacy detection.
/// （依 BOM、UTF-16 特徵、UTF-8、傳統編碼的順序解碼。）
pub fn decode_bytes(bytes: &[u8]) -> Result<DecodedText, LoadError> {
    if let Some(rest) = bytes.strip_prefix(b"\xEF\xBB\xBF") {
        let text = String::from_utf8(rest.to_vec()).map_err(|_| LoadError::InvalidEncoding)?;
        return Ok(DecodedText {
            text,
            encoding: "utf-8",
        });
    }

    if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        return Ok(DecodedText {
            text: decode_utf16(rest, false)?,
            encoding: "utf-16le",
        });
    }

    if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        return Ok(DecodedText {
            text: decode_utf16(rest, true)?,
            encoding: "utf-16be",
        });
    }

    if looks_like_utf16(bytes, false) {
        return Ok(DecodedText {
            text: decode_utf16(bytes, false)?,
            encoding: "utf-16le",
        });
    }

    if looks_like_utf16(bytes, true) {
        return Ok(DecodedText {
            text: decode_utf16(bytes, true)?,
            encoding: "utf-16be",
        });
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(DecodedText {
            text: text.to_owned(),
            encoding: "utf-8",
        });
    }

    let guess = detect_legacy_encoding(bytes).ok_or(LoadError::InvalidEncoding)?;
    let (text, had_errors) = guess.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(LoadError::InvalidEncoding);
    }
    Ok(DecodedText {
        text: text.into_owned(),
        encoding: guess.name(),
    })
}

fn decode_utf16(bytes: &[u8], big_endian: bool) -> Result<String, LoadError> {
    if bytes.len() % 2 != 0 {
        return Err(LoadError::InvalidEncoding);
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| {
            let pair = [chunk[0], chunk[1]];
            if big_endian {
                u16::from_be_bytes(pair)
            } else {
                u16::from_le_bytes(pair)
            }
        })
        .collect();
    String::from_utf16(&units).map_err(|_| LoadError::InvalidEncoding)
}

fn detect_legacy_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    if bytes.is_empty() {
        return None;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    Some(detector.guess(None, true))
}

fn looks_like_utf16(bytes: &[u8], big_endian: bool) -> bool {
    if bytes.len() < 4 || bytes.len() % 2 != 0 {
        return false;
    }
    // ASCII 內容在 UTF-16 中每兩個位元組就有一個零。 / ASCII text in UTF-16 has a zero in every other byte.
    let zero_slot = if big_endian { 0 } else { 1 };
    let pairs = bytes.len() / 2;
    let zeros = bytes
        .chunks_exact(2)
        .filter(|chunk| chunk[zero_slot] == 0 && chunk[1 - zero_slot] != 0)
        .count();
    zeros * 10 >= pairs * 8
}

fn normalize_newlines(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                result.push('\n');
            }
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::DocumentSource;

    #[test]
    fn utf8_bom_is_stripped() {
        let decoded = decode_bytes(b"\xEF\xBB\xBFhello").unwrap();
        assert_eq!(decoded.text, "hello");
        assert_eq!(decoded.encoding, "utf-8");
    }

    #[test]
    fn utf16_le_with_bom_decodes() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_bytes(&bytes).unwrap().text, "hi");
    }

    #[test]
    fn legacy_bytes_fall_back_to_detection() {
        let (encoded, _, _) = encoding_rs::WINDOWS_1252.encode("caf\u{e9} cr\u{e8}me br\u{fb}l\u{e9}e");
        let decoded = decode_bytes(&encoded).unwrap();
        assert!(decoded.text.starts_with("caf"));
        assert_ne!(decoded.encoding, "utf-8");
    }

    #[test]
    fn open_normalises_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crlf.txt");
        fs::write(&path, b"one\r\ntwo\rthree").unwrap();
        let buffer = TextBuffer::open(&path).unwrap();
        assert_eq!(buffer.text(), "one\ntwo\nthree");
        assert_eq!(buffer.line_count(), 3);
    }
}
