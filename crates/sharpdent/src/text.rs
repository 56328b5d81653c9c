//
// text.rs
//
// Decoding C# source files from disk: byte-order marks, UTF-16, and a
// single-byte fallback for legacy code pages.
//

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("file looks binary (contains NUL bytes)")]
    Binary,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Windows-1252 characters for bytes 0x80..=0x9F; undefined slots keep the
/// Latin-1 control character.
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Decodes raw file bytes into text.
pub fn decode_source(bytes: &[u8]) -> Result<String, DecodeError> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return Ok(match std::str::from_utf8(rest) {
            Ok(text) => text.to_string(),
            Err(_) => decode_single_byte(rest),
        });
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        return Ok(decode_utf16(rest, u16::from_le_bytes));
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        return Ok(decode_utf16(rest, u16::from_be_bytes));
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }
    // Only the legacy fallback guesses; NUL pairs there mean binary data
    if bytes.windows(2).any(|pair| pair == [0, 0]) {
        return Err(DecodeError::Binary);
    }
    log::debug!("source is not valid UTF-8, decoding as Windows-1252");
    Ok(decode_single_byte(bytes))
}

/// Reads and decodes a source file.
pub fn read_source(path: &Path) -> Result<String, DecodeError> {
    let bytes = std::fs::read(path)?;
    decode_source(&bytes)
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn decode_single_byte(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
            _ => char::from(b),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8() {
        assert_eq!(decode_source(b"class C { }").unwrap(), "class C { }");
        assert_eq!(decode_source("var é;".as_bytes()).unwrap(), "var é;");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        assert_eq!(decode_source(b"\xEF\xBB\xBFusing System;").unwrap(), "using System;");
    }

    #[test]
    fn test_utf16_boms() {
        let le: Vec<u8> = [0xFF, 0xFE, b'i', 0, b'f', 0].to_vec();
        assert_eq!(decode_source(&le).unwrap(), "if");
        let be: Vec<u8> = [0xFE, 0xFF, 0, b'i', 0, b'f'].to_vec();
        assert_eq!(decode_source(&be).unwrap(), "if");
        // Unpaired surrogate
        let lone = [0xFF, 0xFE, 0x00, 0xD8, b'x', 0];
        assert_eq!(decode_source(&lone).unwrap(), "\u{FFFD}x");
    }

    #[test]
    fn test_windows_1252_fallback() {
        assert_eq!(decode_source(b"// \x93quoted\x94 caf\xE9").unwrap(), "// \u{201C}quoted\u{201D} café");
    }

    #[test]
    fn test_binary_is_rejected() {
        assert!(matches!(decode_source(b"MZ\0\0\x90"), Err(DecodeError::Binary)));
        // A single NUL is tolerated
        assert_eq!(decode_source(b"a\0\x90b").unwrap(), "a\0\u{0090}b");
    }

    #[test]
    fn test_valid_utf8_with_nul_pairs_is_text() {
        assert_eq!(decode_source(b"a\0\0b").unwrap(), "a\0\0b");
    }

    #[test]
    fn test_read_source_reports_io_errors() {
        let missing = Path::new("/nonexistent/sharpdent/Program.cs");
        assert!(matches!(read_source(missing), Err(DecodeError::Io(_))));
    }
}
