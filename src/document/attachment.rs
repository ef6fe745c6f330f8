//! Extracted binary attachments (embedded pictures).

use base64::Engine;
use serde::{Serialize, Serializer};

/// Image formats an attachment can be classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
    /// GIF image
    Gif,
    /// TIFF image
    Tiff,
    /// Device independent bitmap / BMP
    Bmp,
}

impl ImageFormat {
    /// MIME type of the format.
    #[inline]
    pub const fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Tiff => "image/tiff",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Conventional file extension, without the dot.
    #[inline]
    pub const fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Gif => "gif",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Bmp => "bmp",
        }
    }

    /// Detect the format from a binary signature.
    ///
    /// # Examples
    ///
    /// ```
    /// use docast::document::ImageFormat;
    ///
    /// let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    /// assert_eq!(ImageFormat::sniff(&png), Some(ImageFormat::Png));
    /// assert_eq!(ImageFormat::sniff(b"plain"), None);
    /// ```
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8]) {
            Some(ImageFormat::Jpeg)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
            Some(ImageFormat::Tiff)
        } else if data.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else {
            None
        }
    }

    /// Detect the format from a file name extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "tif" | "tiff" => Some(ImageFormat::Tiff),
            "bmp" | "dib" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }
}

/// Classify an attachment from its bytes, falling back to its file name.
///
/// Returns the MIME type and extension, or `None` when neither the signature
/// nor the name identify an image format.
pub fn classify_attachment(name: &str, data: &[u8]) -> Option<(&'static str, &'static str)> {
    ImageFormat::sniff(data)
        .or_else(|| ImageFormat::from_file_name(name))
        .map(|format| (format.mime_type(), format.extension()))
}

/// Attachment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentType {
    /// Embedded picture
    Image,
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
}

#[inline]
fn twips_to_pixels(twips: u32, dpi: u32) -> u32 {
    ((u64::from(twips) * u64::from(dpi)) / 1440) as u32
}

/// An extracted attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Attachment classification
    #[serde(rename = "type")]
    pub kind: AttachmentType,
    /// MIME type derived from the declared or detected format
    pub mime_type: String,
    /// File extension, without the dot
    pub extension: String,
    /// Synthesized name, unique within one document
    pub name: String,
    /// Decoded payload
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,
    /// Display width in twips, after scaling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Display height in twips, after scaling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Recognized text, filled in by the OCR post-pass
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
}

impl Attachment {
    /// Create an image attachment of a known format.
    pub fn image(format: ImageFormat, name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            kind: AttachmentType::Image,
            mime_type: format.mime_type().to_string(),
            extension: format.extension().to_string(),
            name: name.into(),
            data,
            width: None,
            height: None,
            ocr_text: None,
        }
    }

    /// Set the display size in twips.
    #[inline]
    pub fn with_size(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Display width in pixels at the given DPI.
    #[inline]
    pub fn width_pixels(&self, dpi: u32) -> Option<u32> {
        self.width.map(|twips| twips_to_pixels(twips, dpi))
    }

    /// Display height in pixels at the given DPI.
    #[inline]
    pub fn height_pixels(&self, dpi: u32) -> Option<u32> {
        self.height.map(|twips| twips_to_pixels(twips, dpi))
    }

    /// Whether the attachment is an image.
    #[inline]
    pub fn is_image(&self) -> bool {
        self.kind == AttachmentType::Image
    }
}
