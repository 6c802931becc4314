//! Spectral response set loading and band integration.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{RsrError, RsrResult};

/// Number of leading columns that are not bands (wavelength, solar irradiance).
const LEADING_COLUMNS: usize = 2;

/// Count the columns of an RSR file from its first data row.
pub fn count_columns<P: AsRef<Path>>(path: P) -> RsrResult<usize> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| RsrError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| RsrError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(data) = data_row(&line) {
            return Ok(data.split_whitespace().count());
        }
    }
    Ok(0)
}

/// Returns the row content if the line carries data (not blank, not a comment).
fn data_row(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        None
    } else {
        Some(trimmed)
    }
}

/// Response curve of a single band, sampled on the set's wavelength grid.
#[derive(Debug, Clone, PartialEq)]
pub struct BandResponse {
    values: Vec<f64>,
    interval: (f64, f64),
}

impl BandResponse {
    fn new(values: Vec<f64>, wavelengths: &[f64]) -> Self {
        let first = values.iter().position(|&v| v > 0.0);
        let last = values.iter().rposition(|&v| v > 0.0);
        let interval = match (first, last) {
            (Some(first), Some(last)) => (wavelengths[first], wavelengths[last]),
            _ => (
                wavelengths.first().copied().unwrap_or(0.0),
                wavelengths.last().copied().unwrap_or(0.0),
            ),
        };
        Self { values, interval }
    }

    /// Response values, one per wavelength of the set.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Wavelength bounds (µm) where the band responds.
    pub fn interval(&self) -> (f64, f64) {
        self.interval
    }
}

/// All bands of a sensor, sharing one wavelength grid and solar irradiance curve.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralResponseSet {
    wavelengths: Vec<f64>,
    solar_irradiance: Vec<f64>,
    bands: Vec<BandResponse>,
}

impl SpectralResponseSet {
    /// Build a set from in-memory curves.
    ///
    /// `band_values[b][i]` is the response of band `b` at `wavelengths[i]`.
    pub fn new(
        wavelengths: Vec<f64>,
        solar_irradiance: Vec<f64>,
        band_values: Vec<Vec<f64>>,
    ) -> RsrResult<Self> {
        if wavelengths.is_empty() {
            return Err(RsrError::Empty);
        }
        if band_values.is_empty() {
            return Err(RsrError::NoBands {
                columns: LEADING_COLUMNS,
            });
        }
        if solar_irradiance.len() != wavelengths.len() {
            return Err(RsrError::parse(
                0,
                format!(
                    "{} irradiance values for {} wavelengths",
                    solar_irradiance.len(),
                    wavelengths.len()
                ),
            ));
        }
        if let Some(bad) = band_values.iter().position(|b| b.len() != wavelengths.len()) {
            return Err(RsrError::parse(
                0,
                format!(
                    "band {} has {} values for {} wavelengths",
                    bad,
                    band_values[bad].len(),
                    wavelengths.len()
                ),
            ));
        }

        let bands = band_values
            .into_iter()
            .map(|values| BandResponse::new(values, &wavelengths))
            .collect();

        Ok(Self {
            wavelengths,
            solar_irradiance,
            bands,
        })
    }

    /// Load an RSR file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> RsrResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| RsrError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            RsrError::Io { source, .. } => RsrError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        debug!(path = %path.display(), bands = set.nb_bands(), rows = set.wavelengths.len(), "Loaded spectral responses");
        Ok(set)
    }

    /// Parse RSR rows from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> RsrResult<Self> {
        let mut columns: Option<usize> = None;
        let mut wavelengths = Vec::new();
        let mut irradiance = Vec::new();
        let mut band_values: Vec<Vec<f64>> = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|source| RsrError::Io {
                path: Default::default(),
                source,
            })?;
            let Some(row) = data_row(&line) else {
                continue;
            };

            let values = row
                .split_whitespace()
                .map(|token| {
                    token
                        .parse::<f64>()
                        .map_err(|_| RsrError::parse(line_no, format!("'{}' is not a number", token)))
                })
                .collect::<RsrResult<Vec<f64>>>()?;

            let expected = match columns {
                Some(expected) => expected,
                None => {
                    if values.len() <= LEADING_COLUMNS {
                        return Err(RsrError::NoBands {
                            columns: values.len(),
                        });
                    }
                    band_values = vec![Vec::new(); values.len() - LEADING_COLUMNS];
                    columns = Some(values.len());
                    values.len()
                }
            };
            if values.len() != expected {
                return Err(RsrError::parse(
                    line_no,
                    format!("expected {} columns, found {}", expected, values.len()),
                ));
            }

            wavelengths.push(values[0]);
            irradiance.push(values[1]);
            for (band, value) in band_values.iter_mut().zip(&values[LEADING_COLUMNS..]) {
                band.push(*value);
            }
        }

        if columns.is_none() {
            return Err(RsrError::Empty);
        }
        Self::new(wavelengths, irradiance, band_values)
    }

    /// Number of sensor bands.
    pub fn nb_bands(&self) -> usize {
        self.bands.len()
    }

    /// Band responses in file order.
    pub fn bands(&self) -> &[BandResponse] {
        &self.bands
    }

    /// Wavelength grid (µm).
    pub fn wavelengths(&self) -> &[f64] {
        &self.wavelengths
    }

    /// Solar irradiance on the wavelength grid.
    pub fn solar_irradiance(&self) -> &[f64] {
        &self.solar_irradiance
    }

    /// Average a spectrum sampled on the wavelength grid over one band,
    /// weighting each wavelength by response times solar irradiance.
    ///
    /// Falls back to an unweighted response average when the irradiance
    /// column is zero over the whole band.
    pub fn band_average(&self, band: usize, spectrum: &[f64]) -> f64 {
        let response = self.bands[band].values();
        let mut weighted = 0.0;
        let mut total = 0.0;
        for ((r, e), s) in response.iter().zip(&self.solar_irradiance).zip(spectrum) {
            let w = r * e;
            weighted += w * s;
            total += w;
        }
        if total > 0.0 {
            return weighted / total;
        }

        let mut weighted = 0.0;
        let mut total = 0.0;
        for (r, s) in response.iter().zip(spectrum) {
            weighted += r * s;
            total += r;
        }
        if total > 0.0 {
            weighted / total
        } else {
            0.0
        }
    }
}
