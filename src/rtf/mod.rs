//! RTF (Rich Text Format) engine.
//!
//! RTF is parsed entirely by hand in two passes over a fully buffered input.
//!
//! # Architecture
//!
//! - **Lexer**: scans bytes into a tree of groups, text and control words,
//!   decoding `\'hh` escapes through the document code page
//! - **Metadata**: pre-passes that mine the font and color tables
//! - **Interpreter**: walks the tree with scope-local character formatting
//!   and document-wide state for paragraphs, tables, lists, notes and
//!   hyperlink fields, producing the unified content tree
//! - **Pictures**: hex-encoded blips become image attachments
//!
//! Malformed input never fails the parse: unbalanced braces, unknown escapes
//! and broken pictures degrade to absent data.
//!
//! # Example
//!
//! ```rust
//! use docast::document::NodeKind;
//! use docast::rtf::RtfDocument;
//!
//! let rtf_text = r#"{\rtf1\ansi{\fonttbl\f0\fswiss Helvetica;}\f0\pard Hello World!\par}"#;
//! let doc = RtfDocument::parse(rtf_text)?;
//! let paragraph = &doc.document().content()[0];
//! assert!(matches!(paragraph.kind(), NodeKind::Paragraph { .. }));
//! assert_eq!(paragraph.text(), "Hello World!");
//! # Ok::<(), docast::common::Error>(())
//! ```

mod detect;
mod document;
mod error;
mod field;
mod formatting;
mod lexer;
mod list;
mod lookup;
mod metadata;
mod note;
mod paragraph;
mod parser;
mod picture;
mod raw;
mod table;

#[cfg(test)]
mod tests;

// Re-exports
pub use detect::{is_rtf, is_rtf_reader};
pub use document::RtfDocument;
pub use error::{RtfError, RtfResult};
pub use field::{FieldInstruction, FieldType};
pub use lexer::{ControlWord, Group, Lexer, Token, tokenize};
pub use list::classify_marker;
pub use metadata::{
    Color, ColorTable, Font, FontFamily, FontTable, extract_color_table, extract_font_table,
};
pub use picture::{Picture, read_picture};
