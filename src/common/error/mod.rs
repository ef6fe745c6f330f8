//! Unified error types for docast.
//!
//! This module provides a unified error type that encompasses errors from the
//! RTF engine and the document layer, presenting a consistent API to users.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
