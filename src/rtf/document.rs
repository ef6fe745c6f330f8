//! RTF document entry point.

use super::detect::is_rtf;
use super::error::{RtfError, RtfResult};
use super::lexer::Lexer;
use super::metadata::{ColorTable, FontTable};
use super::parser::interpret;
use crate::document::{Document, EngineOutput, OcrEngine, ParseOptions, assemble, assemble_with_ocr};
use serde::Serialize;
use std::path::Path;

/// RTF Document.
///
/// This is the main entry point for parsing RTF documents. Parsing produces
/// the unified [`Document`] tree plus the font and color tables declared by
/// the source.
#[derive(Debug, Clone, Serialize)]
pub struct RtfDocument {
    #[serde(flatten)]
    document: Document,
    fonts: FontTable,
    colors: ColorTable,
}

impl RtfDocument {
    /// Parse an RTF document from a string with default options.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use docast::rtf::RtfDocument;
    ///
    /// let rtf = r#"{\rtf1\ansi Hello World!\par}"#;
    /// let doc = RtfDocument::parse(rtf)?;
    /// assert_eq!(doc.to_text(), "Hello World!");
    /// # Ok::<(), docast::rtf::RtfError>(())
    /// ```
    pub fn parse(input: &str) -> RtfResult<Self> {
        Self::from_bytes(input.as_bytes())
    }

    /// Parse an RTF document from bytes with default options.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> RtfResult<Self> {
        Self::from_bytes_with_options(bytes, &ParseOptions::default())
    }

    /// Parse an RTF document from bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use docast::document::ParseOptions;
    /// use docast::rtf::RtfDocument;
    ///
    /// let options = ParseOptions::new().with_put_notes_at_last(true);
    /// let doc = RtfDocument::from_bytes_with_options(br"{\rtf1 A{\footnote B}C\par}", &options)?;
    /// assert_eq!(doc.document().to_text_with("|"), "A|C|B");
    /// # Ok::<(), docast::rtf::RtfError>(())
    /// ```
    pub fn from_bytes_with_options(bytes: &[u8], options: &ParseOptions) -> RtfResult<Self> {
        let (output, fonts, colors) = Self::run_engine(bytes, options)?;
        Ok(Self {
            document: assemble(output, options),
            fonts,
            colors,
        })
    }

    /// Parse an RTF document from a file with default options.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use docast::rtf::RtfDocument;
    ///
    /// let doc = RtfDocument::open("document.rtf")?;
    /// println!("{}", doc.to_text());
    /// # Ok::<(), docast::rtf::RtfError>(())
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> RtfResult<Self> {
        Self::open_with_options(path, &ParseOptions::default())
    }

    /// Parse an RTF document from a file.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: &ParseOptions) -> RtfResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes_with_options(&bytes, options)
    }

    /// Parse an RTF document, then run OCR over its image attachments when
    /// `options.ocr` is set.
    ///
    /// Attachments are recognized one at a time. A failure is logged and
    /// leaves that attachment without text.
    pub async fn parse_with_ocr<E: OcrEngine + ?Sized>(
        bytes: &[u8],
        options: &ParseOptions,
        engine: &E,
    ) -> RtfResult<Self> {
        let (output, fonts, colors) = Self::run_engine(bytes, options)?;
        Ok(Self {
            document: assemble_with_ocr(output, options, engine).await,
            fonts,
            colors,
        })
    }

    fn run_engine(
        bytes: &[u8],
        options: &ParseOptions,
    ) -> RtfResult<(EngineOutput, FontTable, ColorTable)> {
        options
            .validate()
            .map_err(|e| RtfError::InvalidOptions(e.to_string()))?;
        if !is_rtf(bytes) {
            log::debug!("Input has no RTF signature, reading it as RTF anyway");
        }

        let root = Lexer::new(bytes, options.max_nesting_depth).tokenize();
        Ok(interpret(&root, options))
    }

    /// The parsed content tree and attachments.
    #[inline]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take the content tree and attachments.
    #[inline]
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Fonts declared in the font table.
    #[inline]
    pub fn fonts(&self) -> &FontTable {
        &self.fonts
    }

    /// Colors declared in the color table.
    #[inline]
    pub fn colors(&self) -> &ColorTable {
        &self.colors
    }

    /// Flatten the document to text.
    ///
    /// Top-level nodes are joined by the configured newline delimiter.
    #[inline]
    pub fn to_text(&self) -> String {
        self.document.to_text()
    }
}
