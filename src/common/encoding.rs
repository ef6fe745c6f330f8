//! Character encoding utilities.
//!
//! Codepage lookup for documents that declare a Windows code page, and hex
//! payload decoding for embedded binary data.

use crate::common::{Error, Result};
use encoding_rs::Encoding;

/// Map Windows codepage identifier to encoding_rs Encoding.
///
/// Covers the code pages RTF writers put in `\ansicpgN`. Returns `None` for
/// code pages `encoding_rs` has no decoder for.
///
/// # Examples
/// ```
/// use docast::common::encoding::codepage_to_encoding;
///
/// let encoding = codepage_to_encoding(936).unwrap();
/// assert_eq!(encoding.name(), "GBK");
/// ```
#[inline]
pub fn codepage_to_encoding(codepage: u32) -> Option<&'static Encoding> {
    match codepage {
        // DOS codepages
        437 | 850 => Some(encoding_rs::IBM866), // closest available approximation

        // Windows codepages (Western scripts)
        874 => Some(encoding_rs::WINDOWS_874),
        1250 => Some(encoding_rs::WINDOWS_1250),
        1251 => Some(encoding_rs::WINDOWS_1251),
        1252 => Some(encoding_rs::WINDOWS_1252),
        1253 => Some(encoding_rs::WINDOWS_1253),
        1254 => Some(encoding_rs::WINDOWS_1254),
        1255 => Some(encoding_rs::WINDOWS_1255),
        1256 => Some(encoding_rs::WINDOWS_1256),
        1257 => Some(encoding_rs::WINDOWS_1257),
        1258 => Some(encoding_rs::WINDOWS_1258),

        // East Asian codepages
        932 => Some(encoding_rs::SHIFT_JIS),
        936 | 20936 => Some(encoding_rs::GBK),
        949 => Some(encoding_rs::EUC_KR),
        950 => Some(encoding_rs::BIG5),
        54936 => Some(encoding_rs::GB18030),
        20932 => Some(encoding_rs::EUC_JP),

        // ISO 8859 series
        28591 => Some(encoding_rs::WINDOWS_1252),
        28592 => Some(encoding_rs::ISO_8859_2),
        28595 => Some(encoding_rs::ISO_8859_5),
        28597 => Some(encoding_rs::ISO_8859_7),
        28605 => Some(encoding_rs::ISO_8859_15),

        // KOI8 series
        20866 => Some(encoding_rs::KOI8_R),
        21866 => Some(encoding_rs::KOI8_U),

        // Macintosh
        10000 => Some(encoding_rs::MACINTOSH),

        65001 => Some(encoding_rs::UTF_8),

        _ => None,
    }
}

/// Decode a hex-encoded string to bytes.
///
/// ASCII whitespace is skipped. Any other non-hex character, or an odd number
/// of digits, is an error.
///
/// # Examples
///
/// ```
/// use docast::common::encoding::decode_hex_data;
///
/// let decoded = decode_hex_data("48 65 6C 6C 6F").unwrap();
/// assert_eq!(decoded, b"Hello");
/// ```
pub fn decode_hex_data(hex_str: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = hex_str
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    if digits.len() % 2 != 0 {
        return Err(Error::ParseError(
            "Hex data must have even number of characters".to_string(),
        ));
    }

    let mut result = Vec::with_capacity(digits.len() / 2);
    for chunk in digits.chunks_exact(2) {
        let hi = hex_char_to_nibble(chunk[0])?;
        let lo = hex_char_to_nibble(chunk[1])?;
        result.push((hi << 4) | lo);
    }

    Ok(result)
}

/// Convert a hex character to its nibble value (0-15).
#[inline(always)]
pub(crate) fn hex_char_to_nibble(c: u8) -> Result<u8> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(Error::ParseError(format!(
            "Invalid hex character: '{}'",
            c as char
        ))),
    }
}
