//! Error types for document extraction.

use thiserror::Error;

use crate::format::DocumentFormat;

/// Result type alias using the extraction error type.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while turning an upload into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The declared extension is not one of the supported formats.
    #[error("unsupported file type: {0:?}")]
    UnsupportedFormat(String),

    /// The converter could not produce text from the file.
    #[error("failed to extract text from {format} document: {reason}")]
    Extraction {
        format: DocumentFormat,
        reason: String,
    },

    /// Extraction succeeded but produced no text, and empty text is rejected.
    #[error("{0} document contains no extractable text")]
    EmptyText(DocumentFormat),

    /// Staging the upload on disk failed.
    #[error("failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),
}

impl ExtractError {
    /// Build an extraction failure for `format` from any displayable cause.
    pub fn extraction(format: DocumentFormat, reason: impl std::fmt::Display) -> Self {
        ExtractError::Extraction {
            format,
            reason: reason.to_string(),
        }
    }

    /// Returns true if the error is the user's choice of file rather than a
    /// problem with its contents.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, ExtractError::UnsupportedFormat(_))
    }
}
