//! Error types for session operations.

/// Error type for session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A session identifier could not be parsed.
    #[error("Invalid session id: {0}")]
    InvalidId(String),
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, Error>;
