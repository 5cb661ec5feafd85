//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while packaging a workbook
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Workbook cannot be written in its current state
    #[error("Invalid workbook state: {0}")]
    InvalidState(String),
}

impl From<XlsxError> for tabex_core::WriteError {
    fn from(err: XlsxError) -> Self {
        match err {
            XlsxError::Io(e) => tabex_core::WriteError::Io(e),
            XlsxError::Zip(e) => tabex_core::WriteError::encoding(e.to_string()),
            XlsxError::InvalidState(msg) => tabex_core::WriteError::InvalidState(msg),
        }
    }
}
