//! Additive Gaussian noise on simulated band reflectances.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::info;

use crate::error::{BatchError, Result};

/// One zero-mean normal distribution per reflectance band.
///
/// The configured value of a band is used as the scale of its distribution.
/// Only the band values are perturbed, the derived outputs that follow them
/// in a result row are left untouched.
#[derive(Debug, Clone)]
pub struct NoiseModel {
    variances: Vec<f64>,
    distributions: Vec<Normal<f64>>,
}

impl NoiseModel {
    /// Build the noise model for `nb_bands` bands.
    ///
    /// A single value is used for every band. Otherwise exactly one value per
    /// band is required.
    pub fn from_variances(variances: &[f64], nb_bands: usize) -> Result<Self> {
        let variances = match variances.len() {
            0 => return Err(BatchError::config("noise variance list is empty")),
            1 => {
                info!(
                    variance = variances[0],
                    bands = nb_bands,
                    "Using the same noise variance for all bands"
                );
                vec![variances[0]; nb_bands]
            }
            n if n == nb_bands => variances.to_vec(),
            n => {
                return Err(BatchError::config(format!(
                    "{} noise variances given for {} bands",
                    n, nb_bands
                )))
            }
        };

        if let Some((band, variance)) = variances.iter().enumerate().find(|(_, v)| !is_valid_variance(**v)) {
            return Err(BatchError::config(format!(
                "noise variance {} for band {} must be a finite non-negative number",
                variance, band
            )));
        }

        let distributions = variances
            .iter()
            .enumerate()
            .map(|(band, &variance)| {
                Normal::new(0.0, variance).map_err(|e| {
                    BatchError::config(format!("invalid noise variance {} for band {}: {}", variance, band, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for (band, variance) in variances.iter().enumerate() {
            info!(band, variance, "Noise variance");
        }

        Ok(Self {
            variances,
            distributions,
        })
    }

    pub fn nb_bands(&self) -> usize {
        self.variances.len()
    }

    pub fn variances(&self) -> &[f64] {
        &self.variances
    }

    /// Add one draw per band to the leading band values of `row`.
    pub fn perturb<R: Rng + ?Sized>(&self, rng: &mut R, row: &mut [f64]) {
        for (value, distribution) in row.iter_mut().zip(&self.distributions) {
            *value += distribution.sample(rng);
        }
    }
}

/// Whether `variance` can parameterize a band's noise distribution.
pub fn is_valid_variance(variance: f64) -> bool {
    variance >= 0.0 && variance.is_finite()
}

/// Generator owned by one worker.
///
/// Seeded from entropy unless a batch seed is given, in which case worker
/// `worker` uses `seed + worker`.
pub fn worker_rng(seed: Option<u64>, worker: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
        None => StdRng::from_entropy(),
    }
}
