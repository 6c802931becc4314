//! ProSail batch simulator.
//!
//! Simulates the sensor band reflectances, fractional cover and fAPAR of
//! every sample of a biophysical variable table.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use batch_simulator::BatchSimulator;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use config::ConfigLayer;

#[derive(Parser, Debug)]
#[command(name = "prosail-simulator")]
#[command(about = "Simulate sensor reflectances from biophysical variable samples")]
struct Args {
    /// YAML configuration file, overridden by flags
    #[arg(short, long, env = "PROSAIL_CONFIG")]
    config: Option<PathBuf>,

    /// Biophysical variable sample table
    #[arg(long = "bvfile", env = "PROSAIL_BV_FILE")]
    sample_file: Option<PathBuf>,

    /// Relative spectral response file
    #[arg(long = "rsrfile", env = "PROSAIL_RSR_FILE")]
    rsr_file: Option<PathBuf>,

    /// Output file for the simulated reflectances
    #[arg(short, long = "out", env = "PROSAIL_OUTPUT")]
    output_file: Option<PathBuf>,

    /// Solar zenith angle (degrees)
    #[arg(long = "solarzenith", env = "PROSAIL_SOLAR_ZENITH", allow_hyphen_values = true)]
    solar_zenith: Option<f64>,

    /// Solar zenith angle used for the fAPAR (degrees)
    #[arg(long = "solarzenithf", env = "PROSAIL_SOLAR_ZENITH_FAPAR", allow_hyphen_values = true)]
    solar_zenith_absorption: Option<f64>,

    /// Sensor zenith angle (degrees)
    #[arg(long = "sensorzenith", env = "PROSAIL_SENSOR_ZENITH", allow_hyphen_values = true)]
    sensor_zenith: Option<f64>,

    /// Relative azimuth angle (degrees)
    #[arg(long, env = "PROSAIL_AZIMUTH", allow_hyphen_values = true)]
    azimuth: Option<f64>,

    /// Product metadata providing the acquisition angles
    #[arg(long = "xml", env = "PROSAIL_METADATA")]
    metadata_file: Option<PathBuf>,

    /// Noise variance, one value for all bands or one per band
    #[arg(long = "noisevar", env = "PROSAIL_NOISE_VAR", value_delimiter = ',')]
    noise_variances: Option<Vec<f64>>,

    /// Number of worker threads, capped by the available cores
    #[arg(long, env = "PROSAIL_THREADS")]
    threads: Option<usize>,

    /// Seed for reproducible noise
    #[arg(long = "seed", env = "PROSAIL_NOISE_SEED")]
    noise_seed: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "PROSAIL_JSON_LOGS")]
    json_logs: bool,
}

impl Args {
    fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            sample_file: self.sample_file.clone(),
            rsr_file: self.rsr_file.clone(),
            output_file: self.output_file.clone(),
            solar_zenith: self.solar_zenith,
            solar_zenith_absorption: self.solar_zenith_absorption,
            sensor_zenith: self.sensor_zenith,
            azimuth: self.azimuth,
            metadata_file: self.metadata_file.clone(),
            noise_variances: self.noise_variances.clone(),
            threads: self.threads,
            noise_seed: self.noise_seed,
        }
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let builder = fmt().with_env_filter(filter).with_target(true).with_thread_names(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs);

    let file_layer = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "Loading configuration file");
            ConfigLayer::from_yaml(path)?
        }
        None => ConfigLayer::default(),
    };
    let config = args
        .layer()
        .over(file_layer)
        .into_simulation_config()
        .context("Incomplete simulation configuration")?;

    info!("Starting ProSail batch simulation");
    let summary = BatchSimulator::prosail(config)
        .run()
        .context("Batch simulation failed")?;

    info!(
        samples = summary.samples,
        bands = summary.bands,
        threads = summary.threads,
        output = %summary.output_file.display(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "Simulation complete"
    );
    Ok(())
}
