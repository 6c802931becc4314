//! Error types for spectral response parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for spectral response operations.
pub type RsrResult<T> = Result<T, RsrError>;

/// Errors raised while reading a relative spectral response file.
#[derive(Error, Debug)]
pub enum RsrError {
    /// The file could not be opened or read
    #[error("failed to read spectral response file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fewer than one band column after wavelength and solar irradiance
    #[error("spectral response file needs at least 3 columns (wavelength, irradiance, band), found {columns}")]
    NoBands { columns: usize },

    /// A row could not be parsed
    #[error("invalid spectral response data at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The file holds no data rows
    #[error("spectral response file is empty")]
    Empty,
}

impl RsrError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
