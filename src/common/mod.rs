//! Common types and utilities shared across formats.
//!
//! This module provides the unified error type and the encoding helpers used
//! by the format engines.

// Submodule declarations
pub mod encoding;
pub mod error;

// Re-exports for convenience
pub use error::{Error, Result};
