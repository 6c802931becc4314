//! Parallel batch simulation of sensor reflectances.
//!
//! A batch reads a table of biophysical variable samples, simulates every
//! sample with a canopy reflectance model for the bands of a sensor, and
//! writes one line per sample in input order:
//!
//! ```text
//! <band 1> <band 2> ... <band n> <fcover> <fapar>
//! ```
//!
//! Samples are split in contiguous blocks, one per worker thread. Each
//! worker owns its model instance and noise generator, and writes only its
//! own block of the result buffer.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod noise;
pub mod partition;
pub mod results;
pub mod samples;
pub mod worker;

pub use config::SimulationConfig;
pub use coordinator::{simulate_batch, BatchContext, BatchSimulator, BatchSummary};
pub use error::{BatchError, Result};
pub use noise::{worker_rng, NoiseModel};
pub use partition::{effective_threads, Partition};
pub use results::SimulationResults;
pub use samples::{parse_samples, read_sample_file};
pub use worker::SimulationWorker;
