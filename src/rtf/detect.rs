//! RTF signature detection.
//!
//! RTF files are plain text starting with `{\rtf`, usually followed by the
//! version number (`{\rtf1`).

use std::io::{Read, Seek, SeekFrom};

const RTF_SIGNATURE: &[u8] = b"{\\rtf";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Check whether a byte buffer starts with the RTF signature.
///
/// A UTF-8 byte order mark and leading ASCII whitespace are tolerated.
///
/// # Examples
///
/// ```rust
/// use docast::rtf::is_rtf;
///
/// assert!(is_rtf(b"{\\rtf1\\ansi\\deff0 Hello World}"));
/// assert!(!is_rtf(b"Plain text file"));
/// ```
#[inline]
pub fn is_rtf(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..].starts_with(RTF_SIGNATURE)
}

/// Check a reader for the RTF signature, then rewind it to the start.
pub fn is_rtf_reader<R: Read + Seek>(reader: &mut R) -> bool {
    let mut buffer = [0u8; 64];
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(_) => return false,
        }
    }
    let _ = reader.seek(SeekFrom::Start(0));
    is_rtf(&buffer[..filled])
}
