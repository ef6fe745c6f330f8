//! Unified error types for docast.
//!
//! This module provides a unified error type that encompasses errors from the
//! format engines and the document layer, presenting a consistent API to users.
use thiserror::Error;

/// Main error type for docast operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RTF engine error
    #[error(transparent)]
    Rtf(#[from] crate::rtf::RtfError),

    /// Parse error occurred
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid or unreadable configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Optical character recognition failed for one attachment
    #[error("OCR failed for '{attachment}': {message}")]
    Ocr { attachment: String, message: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for docast operations.
pub type Result<T> = std::result::Result<T, Error>;
