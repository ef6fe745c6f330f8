//! Error types for RTF parsing.
//!
//! Malformed input is tolerated by the engine and never produces an error;
//! these variants cover failures around it.

use thiserror::Error;

/// Result type for RTF operations.
pub type RtfResult<T> = Result<T, RtfError>;

/// RTF parsing errors.
#[derive(Error, Debug)]
pub enum RtfError {
    /// Options rejected before parsing started
    #[error("Invalid RTF parse options: {0}")]
    InvalidOptions(String),

    /// Reading the source failed
    #[error("RTF I/O error: {0}")]
    Io(#[from] std::io::Error),
}
