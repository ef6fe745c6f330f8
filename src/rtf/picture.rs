//! RTF picture extraction.
//!
//! Pictures are stored in `{\pict ...}` groups: a blip control word names
//! the encoded format, size words give the dimensions in twips or pixels,
//! and the payload follows as hexadecimal text. Blip formats this crate
//! can hand out as image attachments are PNG, JPEG, GIF, TIFF and bitmaps;
//! metafile pictures are skipped.

use super::lexer::{Group, Token};
use super::lookup::BLIP_FORMATS;
use crate::common::Result;
use crate::common::encoding::decode_hex_data;
use crate::document::ImageFormat;

/// Extracted picture from an RTF document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    /// Image format declared by the blip control word
    pub format: ImageFormat,
    /// Decoded image data
    pub data: Vec<u8>,
    /// Picture width (`\picw`, pixels for bitmaps)
    pub width: Option<i32>,
    /// Picture height (`\pich`)
    pub height: Option<i32>,
    /// Goal width in twips (`\picwgoal`)
    pub goal_width: Option<i32>,
    /// Goal height in twips (`\pichgoal`)
    pub goal_height: Option<i32>,
    /// Horizontal scaling percentage
    pub scale_x: Option<i32>,
    /// Vertical scaling percentage
    pub scale_y: Option<i32>,
}

impl Picture {
    /// Get the computed width in twips, considering scaling.
    ///
    /// Falls back to `\picw` when the picture has no goal width.
    #[inline]
    pub fn computed_width(&self) -> Option<i32> {
        self.goal_width.or(self.width).map(|w| match self.scale_x {
            Some(scale) => w.saturating_mul(scale) / 100,
            None => w,
        })
    }

    /// Get the computed height in twips, considering scaling.
    #[inline]
    pub fn computed_height(&self) -> Option<i32> {
        self.goal_height
            .or(self.height)
            .map(|h| match self.scale_y {
                Some(scale) => h.saturating_mul(scale) / 100,
                None => h,
            })
    }
}

/// Read a `\pict` group.
///
/// Only the group's immediate children are scanned. Returns `Ok(None)` when
/// the blip format is not recognized or the group holds no hex digits, and
/// an error when the digits do not decode (odd count).
pub fn read_picture(group: &Group<'_>) -> Result<Option<Picture>> {
    let mut format = None;
    let mut width = None;
    let mut height = None;
    let mut goal_width = None;
    let mut goal_height = None;
    let mut scale_x = None;
    let mut scale_y = None;
    let mut hex = String::new();

    for token in &group.children {
        match token {
            Token::Control(cw) => match cw.name {
                "picw" => width = cw.param,
                "pich" => height = cw.param,
                "picwgoal" => goal_width = cw.param,
                "pichgoal" => goal_height = cw.param,
                "picscalex" => scale_x = cw.param,
                "picscaley" => scale_y = cw.param,
                name => {
                    if let Some(&blip) = BLIP_FORMATS.get(name) {
                        format = Some(blip);
                    }
                },
            },
            Token::Text(text) => hex.extend(text.chars().filter(char::is_ascii_hexdigit)),
            Token::Group(_) => {},
        }
    }

    let Some(format) = format else {
        log::debug!("Skipping picture with unsupported blip format");
        return Ok(None);
    };
    if hex.is_empty() {
        return Ok(None);
    }

    let data = decode_hex_data(&hex)?;
    Ok(Some(Picture {
        format,
        data,
        width,
        height,
        goal_width,
        goal_height,
        scale_x,
        scale_y,
    }))
}
