//! Error types for Piecewise

use thiserror::Error;

/// Result type alias for Piecewise operations
pub type Result<T> = std::result::Result<T, PiecewiseError>;

/// Piecewise error types
#[derive(Error, Debug)]
pub enum PiecewiseError {
    /// Input rejected before any work was done
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed, truncated or overflowing encoded buffer
    #[error("Decode error: {0}")]
    Decode(String),

    /// Outer byte compressor failed
    #[error("Compression error: {0}")]
    Compression(String),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PiecewiseError {
    pub(crate) fn truncated(what: &str) -> Self {
        PiecewiseError::Decode(format!("unexpected end of data while reading {}", what))
    }

    /// Check if the caller supplied bad input
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PiecewiseError::InvalidInput(_))
    }

    /// Check if error indicates a corrupt encoded buffer
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            PiecewiseError::Decode(_) | PiecewiseError::Compression(_)
        )
    }
}
