//! Test data generators for sample tables, spectral responses and product metadata.
//!
//! These generators create predictable, verifiable inputs that can be used
//! across the test suite without committing data files.

use std::path::{Path, PathBuf};

use crate::fixtures::{SAMPLE_HEADER, SAMPLE_WIDTH};

/// First wavelength of generated RSR tables (µm).
pub const RSR_FIRST_WAVELENGTH: f64 = 0.40;
/// Wavelength step of generated RSR tables (µm).
pub const RSR_STEP: f64 = 0.005;
/// Number of rows of generated RSR tables (0.400 to 1.000 µm).
pub const RSR_ROWS: usize = 121;

/// Temporary directory for generated inputs and run outputs, removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("prosail_test_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Creates an RSR text table with boxcar band responses.
///
/// Each band responds with `1.0` between its bounds (inclusive) and `0.0`
/// elsewhere. The irradiance column decreases linearly from 1.9 to 1.0.
///
/// # Example
///
/// ```
/// use test_utils::create_rsr_table;
///
/// let table = create_rsr_table(&[(0.5, 0.6), (0.7, 0.8)]);
/// let first = table.lines().next().unwrap();
/// assert_eq!(first.split_whitespace().count(), 4);
/// ```
pub fn create_rsr_table(bands: &[(f64, f64)]) -> String {
    let mut table = String::new();
    for row in 0..RSR_ROWS {
        let wavelength = RSR_FIRST_WAVELENGTH + row as f64 * RSR_STEP;
        let irradiance = 1.9 - 0.9 * row as f64 / (RSR_ROWS - 1) as f64;
        table.push_str(&format!("{:.3} {:.4}", wavelength, irradiance));
        for &(lo, hi) in bands {
            // Compare on the rounded grid to avoid floating point drift at the bounds
            let inside = wavelength >= lo - 1e-9 && wavelength <= hi + 1e-9;
            table.push_str(if inside { " 1.0" } else { " 0.0" });
        }
        table.push('\n');
    }
    table
}

/// Writes an RSR table into `dir` and returns its path.
pub fn write_rsr_file(dir: &Path, bands: &[(f64, f64)]) -> PathBuf {
    let path = dir.join("sensor.rsr");
    std::fs::write(&path, create_rsr_table(bands)).expect("Failed to write RSR file");
    path
}

/// Creates a sample table: a header line then one row per sample.
pub fn create_sample_table(rows: &[[f64; SAMPLE_WIDTH]]) -> String {
    let mut table = String::from(SAMPLE_HEADER);
    table.push('\n');
    for row in rows {
        let line = row
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        table.push_str(&line);
        table.push('\n');
    }
    table
}

/// Writes a sample table into `dir` and returns its path.
pub fn write_sample_table(dir: &Path, rows: &[[f64; SAMPLE_WIDTH]]) -> PathBuf {
    let path = dir.join("samples.txt");
    std::fs::write(&path, create_sample_table(rows)).expect("Failed to write sample table");
    path
}

/// Creates `count` deterministic samples spread over plausible variable ranges.
///
/// The same `seed` always yields the same rows.
pub fn create_sample_rows(count: usize, seed: u32) -> Vec<[f64; SAMPLE_WIDTH]> {
    // (min, max) per variable in canonical order
    const RANGES: [(f64, f64); SAMPLE_WIDTH] = [
        (0.0, 7.0),
        (30.0, 80.0),
        (0.3, 1.0),
        (0.05, 0.5),
        (1.2, 2.2),
        (15.0, 90.0),
        (2.0, 20.0),
        (0.002, 0.02),
        (0.6, 0.85),
        (0.0, 1.0),
        (0.5, 1.5),
    ];

    (0..count)
        .map(|i| {
            let mut row = [0.0; SAMPLE_WIDTH];
            for (j, (lo, hi)) in RANGES.iter().enumerate() {
                let unit = (simple_hash(i as u32, j as u32, seed) % 10_000) as f64 / 10_000.0;
                row[j] = lo + unit * (hi - lo);
            }
            row
        })
        .collect()
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates Sentinel-2 style tile metadata.
///
/// `sun` is (zenith, azimuth); `bands` lists (bandId, zenith, azimuth) viewing angles.
pub fn create_sentinel2_metadata(sun: (f64, f64), bands: &[(u32, f64, f64)]) -> String {
    let mut viewing = String::new();
    for &(band_id, zenith, azimuth) in bands {
        viewing.push_str(&format!(
            r#"        <Mean_Viewing_Incidence_Angle bandId="{}">
          <ZENITH_ANGLE unit="deg">{}</ZENITH_ANGLE>
          <AZIMUTH_ANGLE unit="deg">{}</AZIMUTH_ANGLE>
        </Mean_Viewing_Incidence_Angle>
"#,
            band_id, zenith, azimuth
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<n1:Level-2A_Tile_ID xmlns:n1="https://psd-14.sentinel2.eo.esa.int/PSD/S2_PDI_Level-2A_Tile_Metadata.xsd">
  <n1:General_Info>
    <SPACECRAFT_NAME>Sentinel-2A</SPACECRAFT_NAME>
  </n1:General_Info>
  <n1:Geometric_Info>
    <Tile_Angles>
      <Mean_Sun_Angle>
        <ZENITH_ANGLE unit="deg">{}</ZENITH_ANGLE>
        <AZIMUTH_ANGLE unit="deg">{}</AZIMUTH_ANGLE>
      </Mean_Sun_Angle>
      <Mean_Viewing_Incidence_Angle_List>
{}      </Mean_Viewing_Incidence_Angle_List>
    </Tile_Angles>
  </n1:Geometric_Info>
</n1:Level-2A_Tile_ID>
"#,
        sun.0, sun.1, viewing
    )
}

/// Creates MACCS style metadata with global (not per band) viewing angles.
pub fn create_maccs_metadata(mission: &str, sun: (f64, f64), view: (f64, f64)) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Earth_Explorer_Header>
  <Fixed_Header>
    <Mission>{}</Mission>
  </Fixed_Header>
  <Variable_Header>
    <Specific_Product_Header>
      <Product_Information>
        <Mean_Value_List>
          <Sun_Angles>
            <Zenith unit="deg">{}</Zenith>
            <Azimuth unit="deg">{}</Azimuth>
          </Sun_Angles>
          <Mean_Viewing_Angle>
            <Zenith unit="deg">{}</Zenith>
            <Azimuth unit="deg">{}</Azimuth>
          </Mean_Viewing_Angle>
        </Mean_Value_List>
      </Product_Information>
    </Specific_Product_Header>
  </Variable_Header>
</Earth_Explorer_Header>
"#,
        mission, sun.0, sun.1, view.0, view.1
    )
}

/// Creates metadata carrying solar angles but no viewing angles.
pub fn create_metadata_without_view_angles(mission: &str, sun: (f64, f64)) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Dimap_Document>
  <Dataset_Sources>
    <Mission>{}</Mission>
  </Dataset_Sources>
  <Solar_Angles>
    <Zenith>{}</Zenith>
    <Azimuth>{}</Azimuth>
  </Solar_Angles>
</Dimap_Document>
"#,
        mission, sun.0, sun.1
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_holds_generated_files() {
        let dir = temp_test_dir();
        assert!(dir.path().to_string_lossy().contains("prosail_test_"));
        let rsr = write_rsr_file(dir.path(), &[(0.5, 0.6)]);
        let samples = write_sample_table(dir.path(), &[[1.0; SAMPLE_WIDTH]]);
        assert!(rsr.starts_with(dir.path()) && rsr.exists());
        assert!(samples.starts_with(dir.path()) && samples.exists());
    }

    #[test]
    fn test_rsr_table_shape() {
        let table = create_rsr_table(&[(0.5, 0.6), (0.7, 0.8), (0.9, 0.95)]);
        assert_eq!(table.lines().count(), RSR_ROWS);
        for line in table.lines() {
            assert_eq!(line.split_whitespace().count(), 5);
        }
    }

    #[test]
    fn test_rsr_band_bounds() {
        let table = create_rsr_table(&[(0.5, 0.6)]);
        let active: Vec<f64> = table
            .lines()
            .filter(|l| l.ends_with(" 1.0"))
            .map(|l| l.split_whitespace().next().unwrap().parse().unwrap())
            .collect();
        assert_eq!(active.first().copied(), Some(0.5));
        assert_eq!(active.last().copied(), Some(0.6));
        assert_eq!(active.len(), 21);
    }

    #[test]
    fn test_sample_table_rows() {
        let table = create_sample_table(&crate::samples::ALL);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], SAMPLE_HEADER);
        assert_eq!(lines[1].split_whitespace().count(), SAMPLE_WIDTH);
    }

    #[test]
    fn test_sample_rows_are_deterministic() {
        let a = create_sample_rows(20, 7);
        let b = create_sample_rows(20, 7);
        let c = create_sample_rows(20, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.iter().all(|row| row[0] >= 0.0 && row[0] <= 7.0));
    }
}
