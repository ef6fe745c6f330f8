//! Unified document model.
//!
//! Every format engine converges on the same content tree: a sequence of
//! block [`ContentNode`]s (paragraphs, headings, list items, tables, notes)
//! whose leaves are text runs and images, plus the [`Attachment`]s extracted
//! along the way.
//!
//! # Example
//!
//! ```rust
//! use docast::rtf::RtfDocument;
//!
//! let document = RtfDocument::parse(r"{\rtf1 Hello \b world\b0 !\par}")?.into_document();
//!
//! assert_eq!(document.to_text(), "Hello world!");
//! for node in document.content() {
//!     println!("{}: {}", node.type_name(), node.text());
//! }
//! # Ok::<(), docast::common::Error>(())
//! ```

mod assemble;
mod attachment;
mod node;
mod ocr;
mod options;

pub(crate) use assemble::{EngineOutput, assemble, assemble_with_ocr};
pub use attachment::{Attachment, AttachmentType, ImageFormat, classify_attachment};
pub use node::{
    Alignment, ContentNode, Descendants, Formatting, Link, LinkKind, ListItem, ListType,
    NodeKind, NoteType,
};
pub use ocr::{OcrEngine, recognize_attachments};
pub use options::{MAX_NESTING_DEPTH_LIMIT, ParseOptions};

use serde::Serialize;

/// A parsed document: content tree plus attachments.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    content: Vec<ContentNode>,
    attachments: Vec<Attachment>,
    #[serde(skip)]
    delimiter: String,
}

impl Document {
    /// Top-level content nodes in document order.
    #[inline]
    pub fn content(&self) -> &[ContentNode] {
        &self.content
    }

    /// Extracted attachments in document order.
    #[inline]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Look up an attachment by the name an image node refers to.
    pub fn attachment(&self, name: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.name == name)
    }

    /// All footnotes and endnotes, wherever they sit in the tree.
    pub fn notes(&self) -> impl Iterator<Item = &ContentNode> {
        self.content
            .iter()
            .flat_map(ContentNode::descendants)
            .filter(|n| n.is_note())
    }

    /// Flatten top-level nodes to text, joined by the configured delimiter.
    pub fn to_text(&self) -> String {
        self.to_text_with(&self.delimiter)
    }

    /// Flatten top-level nodes to text, joined by `delimiter`.
    pub fn to_text_with(&self, delimiter: &str) -> String {
        let mut text = String::new();
        for (i, node) in self.content.iter().enumerate() {
            if i > 0 {
                text.push_str(delimiter);
            }
            text.push_str(node.text());
        }
        text
    }

    /// Run OCR over the image attachments after parsing.
    pub async fn recognize_images<E: OcrEngine + ?Sized>(&mut self, engine: &E, language: &str) {
        recognize_attachments(&mut self.attachments, engine, language).await;
    }

    /// Take ownership of the content tree and attachments.
    pub fn into_parts(self) -> (Vec<ContentNode>, Vec<Attachment>) {
        (self.content, self.attachments)
    }
}
