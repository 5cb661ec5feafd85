//! Error types for tabex-core

use thiserror::Error;

/// Result type alias using [`WriteError`]
pub type WriteResult<T> = std::result::Result<T, WriteError>;

/// Errors raised by a [`SheetWriter`](crate::SheetWriter) when it serializes
///
/// Every other writer call buffers in memory and cannot fail; only the final
/// serialize step touches the output stream.
#[derive(Debug, Error)]
pub enum WriteError {
    /// IO error while writing the output stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The container or part encoding failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A call sequence the writer cannot honor (e.g. a cell before any sheet)
    #[error("Invalid writer state: {0}")]
    InvalidState(String),
}

impl WriteError {
    /// Create a new encoding error with a message
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        WriteError::Encoding(msg.into())
    }
}
