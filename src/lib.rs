//! Docast - convert rich text documents into a unified content tree
//!
//! This library parses RTF (Rich Text Format) documents with a hand-written
//! lexer and interpreter and emits the same format-agnostic tree of content
//! nodes that other document formats can converge on.
//!
//! # Features
//!
//! - **Lexer**: byte-level tokenizer tolerant of unbalanced braces, with
//!   Windows code page and Unicode escape decoding
//! - **Interpreter**: paragraphs, headings, lists (both numbering schemes),
//!   nested tables, footnotes/endnotes, hyperlinks and pictures
//! - **Unified tree**: every node carries its flattened text; text runs carry
//!   formatting and links
//! - **Attachments**: embedded pictures decoded and classified by format,
//!   with an optional asynchronous OCR pass
//!
//! # Example - Reading an RTF document
//!
//! ```rust
//! use docast::document::ParseOptions;
//! use docast::rtf::RtfDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rtf = r"{\rtf1\ansi{\fonttbl{\f0 Arial;}}\f0\pard Hello \b world\b0 !\par}";
//! let options = ParseOptions::new().with_extract_attachments(true);
//! let doc = RtfDocument::from_bytes_with_options(rtf.as_bytes(), &options)?;
//!
//! // Extract all text
//! println!("Document text: {}", doc.to_text());
//!
//! // Walk the content tree
//! for node in doc.document().content() {
//!     println!("{}: {}", node.type_name(), node.text());
//!     for run in node.children() {
//!         println!("  {:?} {:?}", run.text(), run.formatting());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Loading options from YAML
//!
//! ```no_run
//! use docast::document::ParseOptions;
//! use docast::rtf::RtfDocument;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ParseOptions::from_yaml_path("docast.yaml")?;
//! let doc = RtfDocument::open_with_options("document.rtf", &options)?;
//! println!("{}", doc.to_text());
//! # Ok(())
//! # }
//! ```

/// Shared error type and encoding helpers
pub mod common;

/// Format-agnostic content tree, parse options and OCR hook
pub mod document;

/// RTF (Rich Text Format) engine
pub mod rtf;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use document::{ContentNode, Document, NodeKind, ParseOptions};
pub use rtf::{RtfDocument, is_rtf};
