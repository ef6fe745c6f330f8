//! OCR collaborator used by the post-parse pass.
//!
//! The crate does not ship a recognizer; callers plug one in by implementing
//! [`OcrEngine`]. Recognition runs after the content tree is complete and
//! only touches image attachments.

use super::attachment::Attachment;
use crate::common::Result;
use std::future::Future;

/// An asynchronous image-to-text recognizer.
///
/// # Examples
///
/// ```rust
/// use docast::common::Result;
/// use docast::document::OcrEngine;
///
/// struct Fixed;
///
/// impl OcrEngine for Fixed {
///     async fn recognize(&self, _data: &[u8], _language: &str) -> Result<String> {
///         Ok("recognized".to_string())
///     }
/// }
/// ```
pub trait OcrEngine {
    /// Recognize the text in an encoded image.
    fn recognize(&self, data: &[u8], language: &str) -> impl Future<Output = Result<String>>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for &T {
    fn recognize(&self, data: &[u8], language: &str) -> impl Future<Output = Result<String>> {
        (**self).recognize(data, language)
    }
}

/// Run OCR over every image attachment, in order.
///
/// A failed recognition leaves that attachment's `ocr_text` empty and does
/// not fail the parse.
pub async fn recognize_attachments<E: OcrEngine + ?Sized>(
    attachments: &mut [Attachment],
    engine: &E,
    language: &str,
) {
    for attachment in attachments.iter_mut().filter(|a| a.is_image()) {
        match engine.recognize(&attachment.data, language).await {
            Ok(text) => attachment.ocr_text = Some(text),
            Err(e) => {
                log::warn!("OCR failed for attachment {}: {}", attachment.name, e);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::document::ImageFormat;

    struct ByteCount;

    impl OcrEngine for ByteCount {
        async fn recognize(&self, data: &[u8], language: &str) -> Result<String> {
            if data.is_empty() {
                return Err(Error::Ocr {
                    attachment: String::new(),
                    message: "empty image".to_string(),
                });
            }
            Ok(format!("{}:{}", language, data.len()))
        }
    }

    #[tokio::test]
    async fn test_failures_leave_text_unset() {
        let mut attachments = vec![
            Attachment::image(ImageFormat::Png, "image1.png", vec![1, 2, 3]),
            Attachment::image(ImageFormat::Png, "image2.png", Vec::new()),
        ];
        recognize_attachments(&mut attachments, &ByteCount, "eng").await;
        assert_eq!(attachments[0].ocr_text.as_deref(), Some("eng:3"));
        assert!(attachments[1].ocr_text.is_none());
    }
}
