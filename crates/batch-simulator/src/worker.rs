//! Sequential simulation of one contiguous block of samples.

use std::sync::Arc;

use bv_common::BvSample;
use canopy_model::SimulationModel;
use rand::rngs::StdRng;
use tracing::debug;

use crate::coordinator::BatchContext;
use crate::error::{BatchError, Result};
use crate::noise::{worker_rng, NoiseModel};

/// A worker owning its model and, when noise is enabled, its generator.
pub struct SimulationWorker<'a, M> {
    index: usize,
    offset: usize,
    model: M,
    noise: Option<(&'a NoiseModel, StdRng)>,
}

impl<'a, M: SimulationModel> SimulationWorker<'a, M> {
    /// Configure `model` from the shared context.
    ///
    /// `offset` is the batch index of the first sample handed to
    /// [`SimulationWorker::run`], used to report failures.
    pub fn new(index: usize, offset: usize, mut model: M, ctx: &BatchContext<'a>) -> Self {
        model.set_response(Arc::clone(&ctx.response));
        model.set_geometry(ctx.geometry);
        let noise = ctx
            .noise
            .map(|noise| (noise, worker_rng(ctx.noise_seed, index)));
        Self {
            index,
            offset,
            model,
            noise,
        }
    }

    /// Simulate `samples` into `out`, one row of `output_len` values per sample.
    ///
    /// The first model failure stops the worker.
    pub fn run(&mut self, samples: &[BvSample], out: &mut [f64]) -> Result<usize> {
        let width = self.model.output_len();
        if out.len() != samples.len() * width {
            return Err(BatchError::config(format!(
                "worker {} got {} output values for {} samples of width {}",
                self.index,
                out.len(),
                samples.len(),
                width
            )));
        }

        debug!(
            worker = self.index,
            first = self.offset,
            count = samples.len(),
            "Worker started"
        );

        for (i, (sample, row)) in samples.iter().zip(out.chunks_mut(width)).enumerate() {
            self.model.set_sample(sample);
            self.model
                .simulate(row)
                .map_err(|source| BatchError::Simulation {
                    sample: self.offset + i,
                    source,
                })?;
            if let Some((noise, rng)) = self.noise.as_mut() {
                noise.perturb(rng, row);
            }
        }

        Ok(samples.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use bv_common::AcquisitionGeometry;
    use canopy_model::ProSailLite;
    use rsr_parser::SpectralResponseSet;
    use test_utils::{bands, create_rsr_table, samples};

    fn context(noise: Option<&NoiseModel>, geometry: AcquisitionGeometry) -> BatchContext<'_> {
        let table = create_rsr_table(&bands::GREEN_RED_NIR);
        BatchContext {
            response: Arc::new(SpectralResponseSet::from_reader(Cursor::new(table)).unwrap()),
            geometry,
            noise,
            noise_seed: Some(3),
        }
    }

    fn batch() -> Vec<BvSample> {
        samples::ALL.iter().copied().map(BvSample::from_values).collect()
    }

    #[test]
    fn test_rows_match_single_evaluations() {
        let ctx = context(None, AcquisitionGeometry::new(30.0, 10.0, 0.0));
        let samples = batch();
        let mut out = vec![0.0; samples.len() * 5];
        let mut worker = SimulationWorker::new(0, 0, ProSailLite::new(), &ctx);
        assert_eq!(worker.run(&samples, &mut out).unwrap(), samples.len());

        let mut model = ProSailLite::new();
        model.set_response(Arc::clone(&ctx.response));
        model.set_geometry(ctx.geometry);
        let mut row = vec![0.0; 5];
        for (i, sample) in samples.iter().enumerate() {
            model.set_sample(sample);
            model.simulate(&mut row).unwrap();
            assert_eq!(&out[i * 5..(i + 1) * 5], &row[..]);
        }
    }

    #[test]
    fn test_noise_only_on_bands() {
        let noise = NoiseModel::from_variances(&[0.05], 3).unwrap();
        let clean_ctx = context(None, AcquisitionGeometry::new(30.0, 10.0, 0.0));
        let noisy_ctx = context(Some(&noise), AcquisitionGeometry::new(30.0, 10.0, 0.0));
        let samples = batch();

        let mut clean = vec![0.0; samples.len() * 5];
        let mut noisy = vec![0.0; samples.len() * 5];
        SimulationWorker::new(0, 0, ProSailLite::new(), &clean_ctx)
            .run(&samples, &mut clean)
            .unwrap();
        SimulationWorker::new(0, 0, ProSailLite::new(), &noisy_ctx)
            .run(&samples, &mut noisy)
            .unwrap();

        for (c, n) in clean.chunks(5).zip(noisy.chunks(5)) {
            assert_ne!(c[..3], n[..3]);
            assert_eq!(c[3..], n[3..]);
        }
    }

    #[test]
    fn test_failure_reports_batch_index() {
        let ctx = context(None, AcquisitionGeometry::new(30.0, 10.0, 0.0));
        let mut samples = batch();
        samples[2][bv_common::IvName::MLAI] = -1.0;
        let mut out = vec![0.0; samples.len() * 5];

        let err = SimulationWorker::new(1, 10, ProSailLite::new(), &ctx)
            .run(&samples, &mut out)
            .unwrap_err();
        assert!(matches!(err, BatchError::Simulation { sample: 12, .. }));
    }

    #[test]
    fn test_output_size_mismatch() {
        let ctx = context(None, AcquisitionGeometry::new(30.0, 10.0, 0.0));
        let samples = batch();
        let mut out = vec![0.0; 3];
        let err = SimulationWorker::new(0, 0, ProSailLite::new(), &ctx)
            .run(&samples, &mut out)
            .unwrap_err();
        assert!(err.is_config());
    }
}
