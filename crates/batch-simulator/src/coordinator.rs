//! Batch orchestration: inputs, worker threads, and output.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bv_common::{AcquisitionGeometry, BvSample};
use canopy_model::{ProSailLite, SimulationModel, DERIVED_OUTPUTS};
use product_metadata::{resolve_geometry, GeometrySource, ProductMetadata};
use rsr_parser::{RsrError, SpectralResponseSet};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::{BatchError, Result};
use crate::noise::NoiseModel;
use crate::partition::{effective_threads, Partition};
use crate::results::SimulationResults;
use crate::samples::read_sample_file;
use crate::worker::SimulationWorker;

/// Read-only state shared by every worker of a batch.
#[derive(Debug, Clone)]
pub struct BatchContext<'a> {
    pub response: Arc<SpectralResponseSet>,
    pub geometry: AcquisitionGeometry,
    pub noise: Option<&'a NoiseModel>,
    pub noise_seed: Option<u64>,
}

/// Simulate `samples` on `threads` workers and return the rows in sample order.
///
/// Each worker builds its own model with `factory` and writes only its own
/// block of the result buffer. All workers are joined before returning; the
/// first failure in worker order is reported.
pub fn simulate_batch<M, F>(
    samples: &[BvSample],
    ctx: &BatchContext<'_>,
    threads: usize,
    factory: &F,
) -> Result<SimulationResults>
where
    M: SimulationModel,
    F: Fn() -> M + Sync,
{
    let width = ctx.response.nb_bands() + DERIVED_OUTPUTS;
    let partition = Partition::new(samples.len(), threads);
    let ranges: Vec<_> = partition.ranges().collect();
    debug!(
        samples = partition.samples(),
        threads = partition.threads(),
        block_size = partition.block_size(),
        remainder = partition.remainder(),
        "Partitioned batch"
    );

    let mut results = SimulationResults::new(samples.len(), width);
    let blocks = results.split_ranges_mut(&ranges);

    thread::scope(|scope| -> Result<()> {
        let mut handles = Vec::with_capacity(ranges.len());
        for (worker, (range, block)) in ranges.iter().zip(blocks).enumerate() {
            let chunk = &samples[range.clone()];
            let offset = range.start;
            let handle = thread::Builder::new()
                .name(format!("prosail-worker-{}", worker))
                .spawn_scoped(scope, move || {
                    SimulationWorker::new(worker, offset, factory(), ctx).run(chunk, block)
                })
                .map_err(BatchError::ThreadSpawn)?;
            handles.push((worker, handle));
        }

        let mut outcome: Result<()> = Ok(());
        for (worker, handle) in handles {
            let joined = match handle.join() {
                Ok(Ok(count)) => {
                    debug!(worker, samples = count, "Worker finished");
                    continue;
                }
                Ok(Err(e)) => e,
                Err(_) => BatchError::WorkerPanicked { worker },
            };
            if outcome.is_ok() {
                outcome = Err(joined);
            }
        }
        outcome
    })?;

    Ok(results)
}

/// Outcome of a completed batch.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub samples: usize,
    pub bands: usize,
    pub threads: usize,
    pub geometry: AcquisitionGeometry,
    pub geometry_source: GeometrySource,
    pub output_file: PathBuf,
    pub elapsed: Duration,
}

/// Runs a whole batch from a [`SimulationConfig`].
pub struct BatchSimulator<F> {
    config: SimulationConfig,
    factory: F,
    hardware_threads: usize,
}

impl BatchSimulator<fn() -> ProSailLite> {
    /// Batch simulator using the [`ProSailLite`] model.
    pub fn prosail(config: SimulationConfig) -> Self {
        BatchSimulator::new(config, ProSailLite::new as fn() -> ProSailLite)
    }
}

impl<M, F> BatchSimulator<F>
where
    M: SimulationModel,
    F: Fn() -> M + Sync,
{
    pub fn new(config: SimulationConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            hardware_threads: num_cpus::get(),
        }
    }

    /// Override the detected hardware concurrency.
    pub fn with_hardware_threads(mut self, threads: usize) -> Self {
        self.hardware_threads = threads;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the batch and write its output file.
    ///
    /// Every configuration problem is reported before a worker starts. The
    /// output file is only created once all samples are simulated.
    pub fn run(&self) -> Result<BatchSummary> {
        let started = Instant::now();
        let config = &self.config;
        config.validate()?;

        let response = Arc::new(load_response(config)?);
        let nb_bands = response.nb_bands();

        let metadata = config
            .metadata_file
            .as_ref()
            .map(ProductMetadata::from_file)
            .transpose()?;
        let (geometry, geometry_source) = resolve_geometry(config.explicit_geometry(), metadata.as_ref());
        info!(
            solar_zenith = geometry.solar_zenith,
            solar_zenith_absorption = geometry.solar_zenith_absorption,
            sensor_zenith = geometry.sensor_zenith,
            relative_azimuth = geometry.relative_azimuth,
            "Acquisition geometry"
        );

        let noise = config
            .noise_variances
            .as_deref()
            .map(|variances| NoiseModel::from_variances(variances, nb_bands))
            .transpose()?;

        let samples = read_sample_file(&config.sample_file)?;
        info!(samples = samples.len(), path = %config.sample_file.display(), "Samples read");

        check_output_dir(&config.output_file)?;

        let threads = effective_threads(self.hardware_threads, config.threads);
        info!(threads, hardware = self.hardware_threads, "Threads used");

        let ctx = BatchContext {
            response,
            geometry,
            noise: noise.as_ref(),
            noise_seed: config.noise_seed,
        };
        let simulation_start = Instant::now();
        let results = simulate_batch(&samples, &ctx, threads, &self.factory)?;
        info!(
            samples = results.len(),
            elapsed_ms = simulation_start.elapsed().as_millis() as u64,
            "Samples processed"
        );

        results.save(&config.output_file)?;
        info!(path = %config.output_file.display(), "Results saved");

        Ok(BatchSummary {
            samples: samples.len(),
            bands: nb_bands,
            threads,
            geometry,
            geometry_source,
            output_file: config.output_file.clone(),
            elapsed: started.elapsed(),
        })
    }
}

fn load_response(config: &SimulationConfig) -> Result<SpectralResponseSet> {
    let response = SpectralResponseSet::load(&config.rsr_file).map_err(|e| match e {
        RsrError::NoBands { columns } => BatchError::config(format!(
            "spectral response file {} has {} columns, no band to simulate",
            config.rsr_file.display(),
            columns
        )),
        other => other.into(),
    })?;

    info!(bands = response.nb_bands(), "Simulating spectral bands");
    for (band, band_response) in response.bands().iter().enumerate() {
        let (start, end) = band_response.interval();
        info!(band, start, end, "Band interval");
    }
    Ok(response)
}

/// Fail early when the output file could not be created in its directory.
///
/// The file itself is left untouched until the results are saved.
fn check_output_dir(output: &Path) -> Result<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let metadata = fs::metadata(dir).map_err(|e| BatchError::io(dir, e))?;
    if !metadata.is_dir() {
        return Err(BatchError::io(
            dir,
            io::Error::new(io::ErrorKind::NotFound, "output directory is not a directory"),
        ));
    }
    if metadata.permissions().readonly() {
        return Err(BatchError::io(
            dir,
            io::Error::new(io::ErrorKind::PermissionDenied, "output directory is read-only"),
        ));
    }
    debug!(dir = %dir.display(), "Output directory ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use canopy_model::ModelResult;
    use test_utils::{bands, create_rsr_table, create_sample_rows};

    fn response() -> Arc<SpectralResponseSet> {
        let table = create_rsr_table(&bands::GREEN_RED_NIR);
        Arc::new(SpectralResponseSet::from_reader(Cursor::new(table)).unwrap())
    }

    fn context(noise: Option<&NoiseModel>) -> BatchContext<'_> {
        BatchContext {
            response: response(),
            geometry: AcquisitionGeometry::new(30.0, 10.0, 0.0),
            noise,
            noise_seed: None,
        }
    }

    fn batch(count: usize) -> Vec<BvSample> {
        create_sample_rows(count, 11)
            .into_iter()
            .map(BvSample::from_values)
            .collect()
    }

    /// Writes the sample's MLAI into every output value.
    #[derive(Default)]
    struct EchoModel {
        width: usize,
        lai: f64,
    }

    impl SimulationModel for EchoModel {
        fn set_response(&mut self, response: Arc<SpectralResponseSet>) {
            self.width = response.nb_bands() + DERIVED_OUTPUTS;
        }

        fn set_geometry(&mut self, _geometry: AcquisitionGeometry) {}

        fn set_sample(&mut self, sample: &BvSample) {
            self.lai = sample[bv_common::IvName::MLAI];
        }

        fn output_len(&self) -> usize {
            self.width
        }

        fn simulate(&mut self, out: &mut [f64]) -> ModelResult<()> {
            out.fill(self.lai);
            Ok(())
        }
    }

    #[test]
    fn test_order_preserved_for_any_thread_count() {
        let samples = batch(23);
        let ctx = context(None);
        for threads in [1, 2, 3, 7, 23, 40] {
            let results = simulate_batch(&samples, &ctx, threads, &EchoModel::default).unwrap();
            assert_eq!(results.len(), samples.len());
            for (row, sample) in results.rows().zip(&samples) {
                assert!(row.iter().all(|v| *v == sample[bv_common::IvName::MLAI]));
            }
        }
    }

    #[test]
    fn test_one_model_per_worker() {
        let built = AtomicUsize::new(0);
        let factory = || {
            built.fetch_add(1, Ordering::SeqCst);
            EchoModel::default()
        };
        simulate_batch(&batch(10), &context(None), 4, &factory).unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_empty_batch() {
        let results = simulate_batch(&[], &context(None), 3, &ProSailLite::new).unwrap();
        assert!(results.is_empty());
        assert_eq!(results.width(), 5);
    }

    #[test]
    fn test_single_failure_aborts_batch() {
        let mut samples = batch(12);
        samples[9][bv_common::IvName::MLAI] = -2.0;
        let err = simulate_batch(&samples, &context(None), 3, &ProSailLite::new).unwrap_err();
        assert!(matches!(err, BatchError::Simulation { sample: 9, .. }));
    }

    #[test]
    fn test_worker_panic_reported() {
        struct PanickingModel;
        impl SimulationModel for PanickingModel {
            fn set_response(&mut self, _response: Arc<SpectralResponseSet>) {}
            fn set_geometry(&mut self, _geometry: AcquisitionGeometry) {}
            fn set_sample(&mut self, _sample: &BvSample) {}
            fn output_len(&self) -> usize {
                5
            }
            fn simulate(&mut self, _out: &mut [f64]) -> ModelResult<()> {
                panic!("model exploded");
            }
        }

        let err = simulate_batch(&batch(4), &context(None), 2, &|| PanickingModel).unwrap_err();
        assert!(matches!(err, BatchError::WorkerPanicked { worker: 0 }));
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let noise = NoiseModel::from_variances(&[0.01], 3).unwrap();
        let ctx = BatchContext {
            noise_seed: Some(99),
            ..context(Some(&noise))
        };
        let samples = batch(9);
        let first = simulate_batch(&samples, &ctx, 3, &ProSailLite::new).unwrap();
        let second = simulate_batch(&samples, &ctx, 3, &ProSailLite::new).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_output_dir_checked_without_creating_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.txt");
        check_output_dir(&output).unwrap();
        assert!(!output.exists());

        let err = check_output_dir(&dir.path().join("missing/out.txt")).unwrap_err();
        assert!(err.is_io(), "{}", err);
    }

    #[test]
    fn test_bare_output_name_uses_current_dir() {
        check_output_dir(Path::new("out.txt")).unwrap();
    }
}
