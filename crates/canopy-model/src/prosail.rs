//! Leaf + canopy reflectance model integrated over sensor bands.

use std::sync::Arc;

use bv_common::{AcquisitionGeometry, BvSample, IvName};
use rsr_parser::SpectralResponseSet;
use tracing::trace;

use crate::canopy::{soil_reflectance, Canopy};
use crate::error::{ModelError, ModelResult};
use crate::leaf::LeafBiochemistry;
use crate::{SimulationModel, DERIVED_OUTPUTS};

/// Photosynthetically active radiation range (nm) and sampling step.
const PAR_RANGE: (f64, f64) = (400.0, 700.0);
const PAR_STEP: f64 = 10.0;

/// Analytic leaf optics coupled with a clumped canopy.
///
/// Band reflectances are the spectral canopy reflectance averaged with the
/// response-times-irradiance weights of each band. The two derived outputs
/// are the fractional cover and the fAPAR, the latter computed with the
/// absorption solar zenith of the geometry.
#[derive(Debug, Default)]
pub struct ProSailLite {
    response: Option<Arc<SpectralResponseSet>>,
    geometry: Option<AcquisitionGeometry>,
    sample: Option<BvSample>,
    // Reused across samples
    spectrum: Vec<f64>,
}

impl ProSailLite {
    pub fn new() -> Self {
        Self::default()
    }

    fn fapar(leaf: &LeafBiochemistry, canopy: &Canopy, zenith: f64) -> f64 {
        let steps = ((PAR_RANGE.1 - PAR_RANGE.0) / PAR_STEP) as usize + 1;
        let total: f64 = (0..steps)
            .map(|i| {
                let nm = PAR_RANGE.0 + i as f64 * PAR_STEP;
                canopy.absorbed_fraction(zenith, leaf.optics(nm).albedo())
            })
            .sum();
        total / steps as f64
    }
}

impl SimulationModel for ProSailLite {
    fn set_response(&mut self, response: Arc<SpectralResponseSet>) {
        trace!(
            bands = response.nb_bands(),
            wavelengths = response.wavelengths().len(),
            "Configuring model spectral responses"
        );
        self.spectrum = vec![0.0; response.wavelengths().len()];
        self.response = Some(response);
    }

    fn set_geometry(&mut self, geometry: AcquisitionGeometry) {
        self.geometry = Some(geometry);
    }

    fn set_sample(&mut self, sample: &BvSample) {
        self.sample = Some(*sample);
    }

    fn output_len(&self) -> usize {
        self.response.as_ref().map_or(0, |r| r.nb_bands()) + DERIVED_OUTPUTS
    }

    fn simulate(&mut self, out: &mut [f64]) -> ModelResult<()> {
        let expected = self.output_len();
        let response = self
            .response
            .as_ref()
            .ok_or(ModelError::NotConfigured("spectral responses"))?;
        let geometry = self.geometry.ok_or(ModelError::NotConfigured("geometry"))?;
        let sample = self.sample.ok_or(ModelError::NotConfigured("sample"))?;
        if out.len() != expected {
            return Err(ModelError::OutputLength {
                expected,
                actual: out.len(),
            });
        }
        geometry.validate()?;

        let leaf = LeafBiochemistry::from_sample(&sample)?;
        let canopy = Canopy::new(&sample, &geometry)?;
        let brightness = sample[IvName::Bs];

        for (value, wavelength) in self.spectrum.iter_mut().zip(response.wavelengths()) {
            let nm = wavelength * 1000.0;
            *value = canopy.reflectance(leaf.optics(nm), soil_reflectance(nm, brightness));
        }

        let nb_bands = response.nb_bands();
        for (band, value) in out[..nb_bands].iter_mut().enumerate() {
            *value = response.band_average(band, &self.spectrum);
        }
        out[nb_bands] = canopy.fractional_cover();
        out[nb_bands + 1] = Self::fapar(&leaf, &canopy, geometry.solar_zenith_absorption);

        if let Some(index) = out.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite { index });
        }
        Ok(())
    }
}
