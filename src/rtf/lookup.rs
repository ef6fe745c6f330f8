//! Static lookup tables for the RTF engine.
//!
//! All tables are compile-time perfect hash maps/sets built with `phf`.

use crate::document::ImageFormat;
use phf::{phf_map, phf_set};

/// Picture blip control words mapped to the image format they declare.
///
/// Metafile blips (`emfblip`, `wmetafile`, `pmmetafile`, `macpict`) are not
/// listed; pictures in those formats are skipped.
pub(crate) static BLIP_FORMATS: phf::Map<&'static str, ImageFormat> = phf_map! {
    "pngblip" => ImageFormat::Png,
    "jpegblip" => ImageFormat::Jpeg,
    "gifblip" => ImageFormat::Gif,
    "tiffblip" => ImageFormat::Tiff,
    "dibitmap" => ImageFormat::Bmp,
    "wbitmap" => ImageFormat::Bmp,
};

/// Windows-1252 code points for bytes 0x80-0x9F.
///
/// The unassigned bytes (0x81, 0x8D, 0x8F, 0x90, 0x9D) are absent and decode
/// to the C1 control of the same value.
static CP1252_HIGH: phf::Map<u8, char> = phf_map! {
    0x80u8 => '\u{20AC}',
    0x82u8 => '\u{201A}',
    0x83u8 => '\u{0192}',
    0x84u8 => '\u{201E}',
    0x85u8 => '\u{2026}',
    0x86u8 => '\u{2020}',
    0x87u8 => '\u{2021}',
    0x88u8 => '\u{02C6}',
    0x89u8 => '\u{2030}',
    0x8Au8 => '\u{0160}',
    0x8Bu8 => '\u{2039}',
    0x8Cu8 => '\u{0152}',
    0x8Eu8 => '\u{017D}',
    0x91u8 => '\u{2018}',
    0x92u8 => '\u{2019}',
    0x93u8 => '\u{201C}',
    0x94u8 => '\u{201D}',
    0x95u8 => '\u{2022}',
    0x96u8 => '\u{2013}',
    0x97u8 => '\u{2014}',
    0x98u8 => '\u{02DC}',
    0x99u8 => '\u{2122}',
    0x9Au8 => '\u{0161}',
    0x9Bu8 => '\u{203A}',
    0x9Cu8 => '\u{0153}',
    0x9Eu8 => '\u{017E}',
    0x9Fu8 => '\u{0178}',
};

/// Decode a single Windows-1252 byte.
#[inline]
pub(crate) fn cp1252_char(byte: u8) -> char {
    match byte {
        0x80..=0x9F => CP1252_HIGH.get(&byte).copied().unwrap_or(byte as char),
        _ => byte as char,
    }
}

/// Destinations whose content is never part of the document text.
pub(crate) static IGNORED_DESTINATIONS: phf::Set<&'static str> = phf_set! {
    // Document tables
    "fonttbl",
    "colortbl",
    "stylesheet",
    "listtext",
    "pntext",
    "revtbl",
    "rsidtbl",
    "filetbl",
    "xmlnstbl",
    "pgdsctbl",
    "latentstyles",
    "themedata",
    "colorschememapping",
    "datastore",
    "generator",
    "mmathPr",
    "defchp",
    "defpap",
    // Document information
    "info",
    "title",
    "subject",
    "author",
    "operator",
    "keywords",
    "comment",
    "doccomm",
    "company",
    "creatim",
    "revtim",
    "printim",
    "buptim",
    "userprops",
    // Headers and footers
    "header",
    "headerl",
    "headerr",
    "headerf",
    "footer",
    "footerl",
    "footerr",
    "footerf",
    // Embedded binary payloads
    "object",
    "objdata",
    "objclass",
    "objname",
    "nonshppict",
    "blipuid",
    "bkmkstart",
    "bkmkend",
    // Annotations
    "atnid",
    "atnauthor",
    "annotation",
    "atrfstart",
    "atrfend",
    // Separators and continuation notices for notes
    "ftnsep",
    "ftnsepc",
    "ftncn",
    "aftnsep",
    "aftnsepc",
    "aftncn",
    // Fallback content for readers without nested table support
    "nonesttables",
};

/// Ignorable (`\*`) destinations that are always walked.
pub(crate) static IGNORABLE_ALLOWED: phf::Set<&'static str> = phf_set! {
    "nesttableprops",
};

/// Ignorable destinations walked only when attachments are extracted.
pub(crate) static IGNORABLE_WITH_ATTACHMENTS: phf::Set<&'static str> = phf_set! {
    "shppict",
};

/// Control words that stand for a single character.
pub(crate) static CONTROL_CHARACTERS: phf::Map<&'static str, &'static str> = phf_map! {
    "line" => "\n",
    "tab" => "\t",
    "lquote" => "\u{2018}",
    "rquote" => "\u{2019}",
    "ldblquote" => "\u{201C}",
    "rdblquote" => "\u{201D}",
    "emdash" => "\u{2014}",
    "endash" => "\u{2013}",
    "bullet" => "\u{2022}",
    "emspace" => "\u{2003}",
    "enspace" => "\u{2002}",
    "qmspace" => "\u{2005}",
    // Control symbols
    "~" => "\u{00A0}",
    "_" => "\u{2011}",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cp1252_high_range() {
        assert_eq!(cp1252_char(0x93), '\u{201C}');
        assert_eq!(cp1252_char(0x80), '\u{20AC}');
        assert_eq!(cp1252_char(0x81), '\u{0081}');
        assert_eq!(cp1252_char(0xE9), 'é');
        assert_eq!(cp1252_char(b'A'), 'A');
    }

    #[test]
    fn test_blip_formats() {
        assert_eq!(BLIP_FORMATS.get("jpegblip"), Some(&ImageFormat::Jpeg));
        assert_eq!(BLIP_FORMATS.get("wbitmap"), Some(&ImageFormat::Bmp));
        assert!(BLIP_FORMATS.get("emfblip").is_none());
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(CONTROL_CHARACTERS.get("ldblquote"), Some(&"\u{201C}"));
        assert_eq!(CONTROL_CHARACTERS.get("~"), Some(&"\u{00A0}"));
        assert!(CONTROL_CHARACTERS.get("-").is_none());
    }
}
