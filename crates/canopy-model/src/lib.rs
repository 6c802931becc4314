//! Canopy reflectance models.
//!
//! A model is a stateful object: it is configured once with the sensor
//! spectral responses and the acquisition geometry, then fed one
//! biophysical sample at a time. Each evaluation writes the per-band
//! reflectances followed by the fractional cover and the fraction of
//! absorbed photosynthetically active radiation.
//!
//! Models are not shared between threads; every worker builds its own.

pub mod canopy;
pub mod error;
pub mod leaf;
pub mod prosail;

use std::sync::Arc;

use bv_common::{AcquisitionGeometry, BvSample};
use rsr_parser::SpectralResponseSet;

pub use error::{ModelError, ModelResult};
pub use prosail::ProSailLite;

/// Number of derived values appended after the band reflectances.
pub const DERIVED_OUTPUTS: usize = 2;

/// A simulation model evaluated sample by sample.
pub trait SimulationModel: Send {
    /// Set the sensor spectral responses. Determines the output length.
    fn set_response(&mut self, response: Arc<SpectralResponseSet>);

    /// Set the acquisition geometry used by every following evaluation.
    fn set_geometry(&mut self, geometry: AcquisitionGeometry);

    /// Set the biophysical sample of the next evaluation.
    fn set_sample(&mut self, sample: &BvSample);

    /// Number of values written by [`SimulationModel::simulate`].
    fn output_len(&self) -> usize;

    /// Evaluate the model for the current sample into `out`.
    fn simulate(&mut self, out: &mut [f64]) -> ModelResult<()>;
}
