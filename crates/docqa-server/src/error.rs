//! Error types for the server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use docqa_extract::{DocumentFormat, ExtractError};
use docqa_llm::LlmError;
use thiserror::Error;

/// Shown when an upload's extension is not PDF, Word or text.
pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Unsupported file type. Please upload a PDF, Word, or Text document.";

/// Shown when the generation backend fails.
pub const GENERATION_FAILED_MESSAGE: &str =
    "The document service could not generate a response. Please try again.";

// ─────────────────────────────────────────────────────────────────────────────
// Workflow Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Failures of a workflow operation. None of them leaves a partial write in
/// the session store.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The upload's extension is not a supported format.
    #[error("unsupported file type: {0:?}")]
    UnsupportedFormat(String),

    /// The converter could not read the document.
    #[error("failed to extract text from {format} document: {reason}")]
    Extraction {
        format: DocumentFormat,
        reason: String,
    },

    /// The document yielded no text and empty documents are rejected.
    #[error("{0} document contains no extractable text")]
    EmptyDocument(DocumentFormat),

    /// The upload could not be staged on disk.
    #[error("failed to stage upload: {0}")]
    Staging(std::io::Error),

    /// Summarization or question answering failed.
    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),
}

impl From<ExtractError> for WorkflowError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::UnsupportedFormat(ext) => WorkflowError::UnsupportedFormat(ext),
            ExtractError::Extraction { format, reason } => {
                WorkflowError::Extraction { format, reason }
            }
            ExtractError::EmptyText(format) => WorkflowError::EmptyDocument(format),
            ExtractError::Staging(e) => WorkflowError::Staging(e),
        }
    }
}

impl WorkflowError {
    /// HTTP status for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            WorkflowError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            WorkflowError::Extraction { .. } | WorkflowError::EmptyDocument(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            WorkflowError::Staging(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WorkflowError::Generation(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to show the user. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            WorkflowError::UnsupportedFormat(_) => UNSUPPORTED_FORMAT_MESSAGE.to_string(),
            WorkflowError::Extraction { format, .. } => format!(
                "Could not extract text from the uploaded {} document. The file may be damaged.",
                format
            ),
            WorkflowError::EmptyDocument(format) => format!(
                "The uploaded {} document does not contain any extractable text.",
                format
            ),
            WorkflowError::Staging(_) => "The upload could not be processed.".to_string(),
            WorkflowError::Generation(_) => GENERATION_FAILED_MESSAGE.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Bad request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body over the configured limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// A workflow operation failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Workflow(e) => e.status(),
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %error, "Server error");
        } else {
            tracing::warn!(status = %status, error = %error, "Client error");
        }

        let body = match self {
            ServerError::Workflow(e) => e.user_message(),
            ServerError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, body).into_response()
    }
}
