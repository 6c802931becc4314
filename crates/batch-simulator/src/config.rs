//! Configuration of a simulation batch.

use std::path::PathBuf;

use bv_common::AcquisitionGeometry;
use serde::{Deserialize, Serialize};

use crate::error::{BatchError, Result};
use crate::noise::is_valid_variance;

/// Everything a batch run needs. Parsing of the values (CLI, YAML, env)
/// happens in the calling service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Biophysical variable sample table
    pub sample_file: PathBuf,

    /// Relative spectral response file
    pub rsr_file: PathBuf,

    /// Output file, one simulated spectrum per line
    pub output_file: PathBuf,

    /// Solar zenith angle (degrees)
    pub solar_zenith: f64,

    /// Solar zenith angle for the fAPAR simulation (degrees), defaults to `solar_zenith`
    #[serde(default)]
    pub solar_zenith_absorption: Option<f64>,

    /// Sensor zenith angle (degrees)
    pub sensor_zenith: f64,

    /// Relative azimuth angle (degrees)
    pub azimuth: f64,

    /// Product metadata whose angles replace the explicit ones
    #[serde(default)]
    pub metadata_file: Option<PathBuf>,

    /// Per-band noise variances: one value for all bands or one per band
    #[serde(default)]
    pub noise_variances: Option<Vec<f64>>,

    /// Requested worker thread count, capped by the hardware concurrency
    #[serde(default)]
    pub threads: Option<usize>,

    /// Seed making noise draws reproducible
    #[serde(default)]
    pub noise_seed: Option<u64>,
}

impl SimulationConfig {
    /// Configuration with the required fields and no optional features.
    pub fn new(
        sample_file: impl Into<PathBuf>,
        rsr_file: impl Into<PathBuf>,
        output_file: impl Into<PathBuf>,
        solar_zenith: f64,
        sensor_zenith: f64,
        azimuth: f64,
    ) -> Self {
        Self {
            sample_file: sample_file.into(),
            rsr_file: rsr_file.into(),
            output_file: output_file.into(),
            solar_zenith,
            solar_zenith_absorption: None,
            sensor_zenith,
            azimuth,
            metadata_file: None,
            noise_variances: None,
            threads: None,
            noise_seed: None,
        }
    }

    /// Geometry given by the explicit angles.
    pub fn explicit_geometry(&self) -> AcquisitionGeometry {
        let geometry = AcquisitionGeometry::new(self.solar_zenith, self.sensor_zenith, self.azimuth);
        match self.solar_zenith_absorption {
            Some(zenith) => geometry.with_absorption_zenith(zenith),
            None => geometry,
        }
    }

    /// Check the values that do not depend on input files.
    ///
    /// Noise variance counts are checked against the band count later, once
    /// the spectral response file is loaded.
    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(BatchError::config("thread count must be at least 1"));
        }

        if let Some(variances) = &self.noise_variances {
            if variances.is_empty() {
                return Err(BatchError::config("noise variance list is empty"));
            }
            if let Some(variance) = variances.iter().find(|v| !is_valid_variance(**v)) {
                return Err(BatchError::config(format!(
                    "noise variance {} must be a finite non-negative number",
                    variance
                )));
            }
        }

        let angles = [
            ("solar zenith", Some(self.solar_zenith)),
            ("absorption solar zenith", self.solar_zenith_absorption),
            ("sensor zenith", Some(self.sensor_zenith)),
            ("azimuth", Some(self.azimuth)),
        ];
        for (name, value) in angles {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(BatchError::config(format!("{} is not a finite number", name)));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig::new("bv.txt", "sensor.rsr", "out.txt", 30.0, 10.0, 0.0)
    }

    #[test]
    fn test_explicit_geometry() {
        let geometry = config().explicit_geometry();
        assert_eq!(geometry.solar_zenith, 30.0);
        assert_eq!(geometry.solar_zenith_absorption, 30.0);

        let mut with_absorption = config();
        with_absorption.solar_zenith_absorption = Some(40.0);
        assert_eq!(with_absorption.explicit_geometry().solar_zenith_absorption, 40.0);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_zero_threads_rejected() {
        let mut cfg = config();
        cfg.threads = Some(0);
        assert!(cfg.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_empty_noise_rejected() {
        let mut cfg = config();
        cfg.noise_variances = Some(vec![]);
        assert!(cfg.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_negative_noise_rejected() {
        let mut cfg = config();
        cfg.noise_variances = Some(vec![0.01, -0.5]);
        let err = cfg.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("-0.5"), "{}", err);
    }

    #[test]
    fn test_non_finite_angle_rejected() {
        let mut cfg = config();
        cfg.azimuth = f64::NAN;
        assert!(cfg.validate().unwrap_err().is_config());
    }
}
