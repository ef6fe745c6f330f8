//! Parse options shared by the format engines.
//!
//! Options can be built in code with the `with_*` setters or loaded from a
//! YAML file whose keys use the camelCase names (`ignoreNotes`,
//! `putNotesAtLast`, ...).

use crate::common::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Largest accepted `max_nesting_depth`.
///
/// The interpreter walks groups recursively, a few stack frames per level;
/// this keeps the deepest walk well inside a 2 MiB thread stack.
pub const MAX_NESTING_DEPTH_LIMIT: usize = 1024;

/// Options controlling what a parse extracts and how text is flattened.
///
/// # Examples
///
/// ```rust
/// use docast::document::ParseOptions;
///
/// let options = ParseOptions::new()
///     .with_put_notes_at_last(true)
///     .with_extract_attachments(true)
///     .with_newline_delimiter(" ");
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ParseOptions {
    /// Skip footnote and endnote groups entirely
    pub ignore_notes: bool,
    /// Place notes after the main content instead of at their reference
    pub put_notes_at_last: bool,
    /// Extract embedded pictures as attachments
    pub extract_attachments: bool,
    /// Echo the originating source on block nodes
    pub include_raw_content: bool,
    /// Run OCR over extracted image attachments
    pub ocr: bool,
    /// Language tag passed to the OCR engine
    pub ocr_language: String,
    /// Delimiter used when flattening top-level nodes to text
    pub newline_delimiter: String,
    /// Groups nested deeper than this are flattened into their parent,
    /// at most [`MAX_NESTING_DEPTH_LIMIT`]
    pub max_nesting_depth: usize,
    /// Divisor turning a left indent in twips into an indentation level
    pub indent_step_twips: u32,
    /// Highest paragraph style number treated as a heading level
    pub max_heading_level: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            ignore_notes: false,
            put_notes_at_last: false,
            extract_attachments: false,
            include_raw_content: false,
            ocr: false,
            ocr_language: "eng".to_string(),
            newline_delimiter: "\n".to_string(),
            max_nesting_depth: 512,
            indent_step_twips: 360,
            max_heading_level: 9,
        }
    }
}

impl ParseOptions {
    /// Create options with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a YAML document.
    ///
    /// Missing keys keep their defaults; unknown keys are rejected.
    ///
    /// ```rust
    /// use docast::document::ParseOptions;
    ///
    /// let options = ParseOptions::from_yaml_str("ignoreNotes: true\nocrLanguage: deu\n")?;
    /// assert!(options.ignore_notes);
    /// assert_eq!(options.ocr_language, "deu");
    /// # Ok::<(), docast::common::Error>(())
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let options: Self = serde_saphyr::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to read options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a YAML file.
    pub fn from_yaml_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Check that the heuristic constants are usable.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_NESTING_DEPTH_LIMIT).contains(&self.max_nesting_depth) {
            return Err(Error::Config(format!(
                "maxNestingDepth must be between 1 and {}",
                MAX_NESTING_DEPTH_LIMIT
            )));
        }
        if self.indent_step_twips == 0 {
            return Err(Error::Config(
                "indentStepTwips must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Set whether notes are skipped.
    #[inline]
    pub fn with_ignore_notes(mut self, ignore: bool) -> Self {
        self.ignore_notes = ignore;
        self
    }

    /// Set whether notes are moved after the main content.
    #[inline]
    pub fn with_put_notes_at_last(mut self, at_last: bool) -> Self {
        self.put_notes_at_last = at_last;
        self
    }

    /// Set whether embedded pictures are extracted.
    #[inline]
    pub fn with_extract_attachments(mut self, extract: bool) -> Self {
        self.extract_attachments = extract;
        self
    }

    /// Set whether block nodes echo their source.
    #[inline]
    pub fn with_raw_content(mut self, include: bool) -> Self {
        self.include_raw_content = include;
        self
    }

    /// Request OCR over extracted images in the given language.
    #[inline]
    pub fn with_ocr(mut self, language: impl Into<String>) -> Self {
        self.ocr = true;
        self.ocr_language = language.into();
        self
    }

    /// Set the delimiter used by `to_text`.
    #[inline]
    pub fn with_newline_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.newline_delimiter = delimiter.into();
        self
    }

    /// Set the nesting depth past which groups are flattened.
    #[inline]
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Set the twips per indentation level.
    #[inline]
    pub fn with_indent_step_twips(mut self, twips: u32) -> Self {
        self.indent_step_twips = twips;
        self
    }

    /// Set the highest style number treated as a heading.
    #[inline]
    pub fn with_max_heading_level(mut self, level: u8) -> Self {
        self.max_heading_level = level;
        self
    }
}
