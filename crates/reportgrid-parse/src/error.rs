//! Error types for the parsing and interpreter layers.
//!
//! Uses [`thiserror`] for ergonomic error derivation. [`BackendError`]
//! converts into [`ReportError::Document`] at the crate boundary.

use reportgrid_core::ReportError;
use thiserror::Error;

/// Error type for PDF parsing backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error resolving font or encoding information.
    #[error("font error: {0}")]
    Font(String),

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    #[error("PDF is encrypted and needs a user password")]
    Encrypted,

    #[error("page index {index} out of range (0..{count})")]
    PageOutOfRange { index: usize, count: usize },
}

impl From<BackendError> for ReportError {
    fn from(err: BackendError) -> Self {
        ReportError::Document(err.to_string())
    }
}
