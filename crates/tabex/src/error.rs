//! Error types for the export pipeline

use tabex_core::WriteError;
use thiserror::Error;

/// Result type alias using [`ExportError`]
pub type Result<T> = std::result::Result<T, ExportError>;

/// Fatal export failures
///
/// Everything recoverable is absorbed as a
/// [`Degradation`](crate::diagnostics::Degradation) instead.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The writer failed to serialize the workbook
    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    /// The layout handed over a box that was never committed
    #[error("Unfinished content box at column {col}, row {row}")]
    UnfinishedContent { col: u32, row: u32 },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while reading export configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A recognized key carried a value that cannot be parsed
    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A numeric value is outside its allowed range
    #[error("Value {value} for '{key}' is out of range ({min}..={max})")]
    OutOfRange {
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
