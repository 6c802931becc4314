//! Error types for batch simulation.

use std::path::{Path, PathBuf};

use canopy_model::ModelError;
use product_metadata::MetadataError;
use rsr_parser::RsrError;
use thiserror::Error;

/// Errors that abort a simulation batch.
#[derive(Error, Debug)]
pub enum BatchError {
    /// Invalid configuration, reported before any sample is simulated.
    #[error("configuration error: {0}")]
    Config(String),

    /// An input could not be opened or read, or the output could not be written.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A sample table row holds a value that is not a number.
    #[error("invalid sample at line {line}: {message}")]
    InvalidSample { line: usize, message: String },

    /// The model failed for one sample; the whole batch is abandoned.
    #[error("simulation failed for sample {sample}: {source}")]
    Simulation {
        sample: usize,
        #[source]
        source: ModelError,
    },

    /// Spectral response file error.
    #[error(transparent)]
    Rsr(#[from] RsrError),

    /// Product metadata error.
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// The operating system refused to start a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// A worker thread panicked.
    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

impl BatchError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an I/O error bound to a path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether this error comes from opening, reading or writing a file.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Io { .. } | Self::Rsr(RsrError::Io { .. }) | Self::Metadata(MetadataError::Io { .. })
        )
    }
}

/// Result type for batch operations.
pub type Result<T> = std::result::Result<T, BatchError>;
