//! Error types for product metadata reading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors raised while reading product metadata.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The metadata file could not be read
    #[error("failed to read metadata file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML
    #[error("XML parsing error at position {position}: {message}")]
    Xml { position: usize, message: String },

    /// An angle element holds something other than a number
    #[error("invalid value '{value}' in <{element}>")]
    InvalidAngle { element: String, value: String },
}
