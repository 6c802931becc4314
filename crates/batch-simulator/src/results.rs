//! Result arena of a batch and its text serialisation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use tracing::debug;

use crate::error::{BatchError, Result};

/// Simulated rows of a batch stored in one flat buffer.
///
/// Row `i` holds the result of sample `i`: the band reflectances followed
/// by the fractional cover and the fAPAR.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResults {
    width: usize,
    values: Vec<f64>,
}

impl SimulationResults {
    /// Zeroed results for `rows` samples of `width` values each.
    pub fn new(rows: usize, width: usize) -> Self {
        Self {
            width,
            values: vec![0.0; rows * width],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn len(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.values.len() / self.width
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.width)?;
        self.values.get(start..start + self.width)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.width.max(1))
    }

    /// Split the buffer into the disjoint row blocks of `ranges`.
    ///
    /// Ranges must be contiguous, in order, and start at row 0. Each returned
    /// slice holds `range.len() * width` values.
    pub fn split_ranges_mut(&mut self, ranges: &[Range<usize>]) -> Vec<&mut [f64]> {
        let mut rest: &mut [f64] = &mut self.values;
        let mut blocks = Vec::with_capacity(ranges.len());
        for range in ranges {
            let (block, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * self.width);
            blocks.push(block);
            rest = tail;
        }
        blocks
    }

    /// Write one line per row, every value followed by a space.
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for row in self.rows() {
            for value in row {
                write!(writer, "{} ", value)?;
            }
            writeln!(writer)?;
        }
        writer.flush()
    }

    /// Create `path` and write the results to it.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| BatchError::io(path, e))?;
        self.write_to(BufWriter::new(file))
            .map_err(|e| BatchError::io(path, e))?;
        debug!(path = %path.display(), rows = self.len(), "Results written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows() {
        let mut results = SimulationResults::new(2, 3);
        results.values.copy_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(results.len(), 2);
        assert_eq!(results.row(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(results.row(2), None);
        assert_eq!(results.rows().count(), 2);
    }

    #[test]
    fn test_split_ranges() {
        let mut results = SimulationResults::new(5, 2);
        {
            let blocks = results.split_ranges_mut(&[0..2, 2..2, 2..5]);
            assert_eq!(blocks.iter().map(|b| b.len()).collect::<Vec<_>>(), vec![4, 0, 6]);
            for (i, block) in blocks.into_iter().enumerate() {
                block.fill(i as f64);
            }
        }
        assert_eq!(results.row(0), Some(&[0.0, 0.0][..]));
        assert_eq!(results.row(4), Some(&[2.0, 2.0][..]));
    }

    #[test]
    fn test_line_format() {
        let mut results = SimulationResults::new(2, 2);
        results.values.copy_from_slice(&[0.5, 1.0, 0.25, 0.125]);
        let mut out = Vec::new();
        results.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.5 1 \n0.25 0.125 \n");
    }

    #[test]
    fn test_empty_output() {
        let results = SimulationResults::new(0, 5);
        assert!(results.is_empty());
        let mut out = Vec::new();
        results.write_to(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_save_to_missing_directory() {
        let results = SimulationResults::new(1, 2);
        let err = results.save("/nonexistent/dir/out.txt").unwrap_err();
        assert!(err.is_io());
    }
}
