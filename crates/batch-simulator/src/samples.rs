//! Biophysical variable sample table reader.
//!
//! The first line of a table is a header and is discarded. Every following
//! line holds whitespace separated values read positionally in
//! [`IvName::ALL`] order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bv_common::{BvSample, IvName};
use tracing::{debug, warn};

use crate::error::{BatchError, Result};

/// Read a sample table from a file.
pub fn read_sample_file(path: impl AsRef<Path>) -> Result<Vec<BvSample>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| BatchError::io(path, e))?;
    parse_samples(BufReader::new(file)).map_err(|e| match e {
        BatchError::Io { source, .. } => BatchError::io(path, source),
        other => other,
    })
}

/// Parse a sample table.
///
/// Blank lines are skipped. A line with fewer values than variables keeps
/// zeros in the missing trailing fields, extra values are ignored.
pub fn parse_samples<R: BufRead>(reader: R) -> Result<Vec<BvSample>> {
    let mut samples = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| BatchError::io("<sample table>", e))?;
        let line_no = idx + 1;

        if line_no == 1 {
            debug!(header = line.trim(), "Skipping sample table header");
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        let mut sample = BvSample::default();
        let mut count = 0;
        for (name, token) in IvName::ALL.iter().zip(line.split_whitespace()) {
            sample[*name] = token.parse::<f64>().map_err(|_| BatchError::InvalidSample {
                line: line_no,
                message: format!("{} value '{}' is not a number", name, token),
            })?;
            count += 1;
        }

        if count < IvName::COUNT {
            warn!(
                line = line_no,
                found = count,
                expected = IvName::COUNT,
                "Short sample row, missing variables set to 0"
            );
        }

        samples.push(sample);
    }

    Ok(samples)
}
