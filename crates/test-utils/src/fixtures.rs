//! Common test fixtures for ProSail batch tests.
//!
//! Sample rows use the canonical variable order
//! `MLAI ALA CrownCover HsD N Cab Car Cdm CwRel Cbp Bs`.

/// Number of values in a sample table row.
pub const SAMPLE_WIDTH: usize = 11;

/// Header line of a sample table.
pub const SAMPLE_HEADER: &str = "MLAI ALA CrownCover HsD N Cab Car Cdm CwRel Cbp Bs";

/// Representative biophysical samples.
pub mod samples {
    use super::SAMPLE_WIDTH;

    /// Healthy crop canopy
    pub const CROP: [f64; SAMPLE_WIDTH] =
        [3.0, 60.0, 0.95, 0.1, 1.5, 45.0, 9.0, 0.005, 0.75, 0.0, 1.0];

    /// Sparse canopy over bright soil
    pub const SPARSE: [f64; SAMPLE_WIDTH] =
        [0.5, 45.0, 0.4, 0.2, 1.8, 25.0, 5.0, 0.004, 0.6, 0.2, 1.4];

    /// Dense, dark green canopy
    pub const DENSE: [f64; SAMPLE_WIDTH] =
        [6.0, 70.0, 1.0, 0.05, 1.3, 70.0, 14.0, 0.008, 0.8, 0.0, 0.7];

    /// No vegetation at all
    pub const BARE_SOIL: [f64; SAMPLE_WIDTH] =
        [0.0, 50.0, 1.0, 0.1, 1.5, 0.0, 0.0, 0.0, 0.5, 0.0, 1.0];

    /// All fixtures, in a stable order.
    pub const ALL: [[f64; SAMPLE_WIDTH]; 4] = [CROP, SPARSE, DENSE, BARE_SOIL];
}

/// Common acquisition geometries as (solar zenith, sensor zenith, relative azimuth).
pub mod geometry {
    /// Sun at 30°, sensor at 10°, principal plane
    pub const SCENARIO: (f64, f64, f64) = (30.0, 10.0, 0.0);

    /// Sun and sensor both at nadir
    pub const NADIR: (f64, f64, f64) = (0.0, 0.0, 0.0);

    /// Low sun, oblique view, cross plane
    pub const OBLIQUE: (f64, f64, f64) = (60.0, 35.0, 90.0);
}

/// Band layouts as (lower, upper) wavelength bounds in micrometers.
pub mod bands {
    /// Green, red, near infrared
    pub const GREEN_RED_NIR: [(f64, f64); 3] = [(0.54, 0.58), (0.65, 0.68), (0.78, 0.89)];

    /// Blue, green, red, near infrared
    pub const BGRN: [(f64, f64); 4] = [
        (0.46, 0.52),
        (0.54, 0.58),
        (0.65, 0.68),
        (0.78, 0.89),
    ];
}
