//! Simulator configuration layers.
//!
//! Values come from command line flags (or their `PROSAIL_*` environment
//! variables) and an optional YAML file. Flags win over the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use batch_simulator::SimulationConfig;
use serde::{Deserialize, Serialize};

/// One source of configuration values, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub sample_file: Option<PathBuf>,
    pub rsr_file: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub solar_zenith: Option<f64>,
    pub solar_zenith_absorption: Option<f64>,
    pub sensor_zenith: Option<f64>,
    pub azimuth: Option<f64>,
    pub metadata_file: Option<PathBuf>,
    pub noise_variances: Option<Vec<f64>>,
    pub threads: Option<usize>,
    pub noise_seed: Option<u64>,
}

impl ConfigLayer {
    /// Load a layer from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Values of `self`, falling back to `lower` where unset.
    pub fn over(self, lower: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            sample_file: self.sample_file.or(lower.sample_file),
            rsr_file: self.rsr_file.or(lower.rsr_file),
            output_file: self.output_file.or(lower.output_file),
            solar_zenith: self.solar_zenith.or(lower.solar_zenith),
            solar_zenith_absorption: self.solar_zenith_absorption.or(lower.solar_zenith_absorption),
            sensor_zenith: self.sensor_zenith.or(lower.sensor_zenith),
            azimuth: self.azimuth.or(lower.azimuth),
            metadata_file: self.metadata_file.or(lower.metadata_file),
            noise_variances: self.noise_variances.or(lower.noise_variances),
            threads: self.threads.or(lower.threads),
            noise_seed: self.noise_seed.or(lower.noise_seed),
        }
    }

    /// Build the batch configuration, failing on the first missing value.
    pub fn into_simulation_config(self) -> Result<SimulationConfig> {
        Ok(SimulationConfig {
            sample_file: required(self.sample_file, "sample_file")?,
            rsr_file: required(self.rsr_file, "rsr_file")?,
            output_file: required(self.output_file, "output_file")?,
            solar_zenith: required(self.solar_zenith, "solar_zenith")?,
            solar_zenith_absorption: self.solar_zenith_absorption,
            sensor_zenith: required(self.sensor_zenith, "sensor_zenith")?,
            azimuth: required(self.azimuth, "azimuth")?,
            metadata_file: self.metadata_file,
            noise_variances: self.noise_variances,
            threads: self.threads,
            noise_seed: self.noise_seed,
        })
    }
}

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| anyhow!("Missing required setting '{}'", name))
}
