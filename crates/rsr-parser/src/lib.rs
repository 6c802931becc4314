//! Relative spectral response (RSR) reader.
//!
//! An RSR file is a whitespace separated text table. Each row holds a
//! wavelength in micrometers, the solar irradiance at that wavelength, and
//! one response value per sensor band:
//!
//! ```text
//! 0.400 1.714 0.00 0.00 0.00
//! 0.405 1.722 0.12 0.00 0.00
//! ...
//! ```
//!
//! The band count is therefore the column count minus two.

pub mod error;
pub mod response;

pub use error::{RsrError, RsrResult};
pub use response::{count_columns, BandResponse, SpectralResponseSet};
