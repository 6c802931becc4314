//! Error types for model evaluation.

use bv_common::{GeometryError, IvName};
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while evaluating a simulation model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// `simulate` was called before the model received its inputs
    #[error("model is not configured: missing {0}")]
    NotConfigured(&'static str),

    /// The acquisition geometry cannot be simulated
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),

    /// A biophysical variable is outside the domain of the model
    #[error("invalid value {value} for {variable}")]
    InvalidVariable { variable: IvName, value: f64 },

    /// The output buffer does not match the model output length
    #[error("output buffer holds {actual} values, model produces {expected}")]
    OutputLength { expected: usize, actual: usize },

    /// The model produced NaN or infinity
    #[error("non-finite result in output {index}")]
    NonFinite { index: usize },
}
