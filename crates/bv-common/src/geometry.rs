//! Acquisition geometry: the sun/sensor angles of a simulated observation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid acquisition geometry.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("{angle} must be in [0, 90) degrees, got {value}")]
    ZenithOutOfRange { angle: &'static str, value: f64 },

    #[error("{angle} is not a finite number")]
    NotFinite { angle: &'static str },
}

/// Zenith/azimuth pair, in degrees, as reported by product metadata.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeanAngles {
    pub zenith: f64,
    pub azimuth: f64,
}

impl MeanAngles {
    pub fn new(zenith: f64, azimuth: f64) -> Self {
        Self { zenith, azimuth }
    }
}

/// Angles shared by every sample of a batch. All values are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionGeometry {
    /// Solar zenith used for reflectance
    pub solar_zenith: f64,
    /// Solar zenith used for the absorption (fAPAR) index
    pub solar_zenith_absorption: f64,
    /// Sensor (view) zenith
    pub sensor_zenith: f64,
    /// Relative azimuth between sun and sensor
    pub relative_azimuth: f64,
}

impl AcquisitionGeometry {
    /// Geometry where the absorption index uses the same solar zenith as reflectance.
    pub fn new(solar_zenith: f64, sensor_zenith: f64, relative_azimuth: f64) -> Self {
        Self {
            solar_zenith,
            solar_zenith_absorption: solar_zenith,
            sensor_zenith,
            relative_azimuth,
        }
    }

    /// Override the solar zenith used for the absorption index.
    pub fn with_absorption_zenith(mut self, zenith: f64) -> Self {
        self.solar_zenith_absorption = zenith;
        self
    }

    /// Check every angle is finite and zenith angles lie below the horizon limit.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let zeniths = [
            ("solar zenith", self.solar_zenith),
            ("absorption solar zenith", self.solar_zenith_absorption),
            ("sensor zenith", self.sensor_zenith),
        ];
        for (angle, value) in zeniths {
            if !value.is_finite() {
                return Err(GeometryError::NotFinite { angle });
            }
            if !(0.0..90.0).contains(&value) {
                return Err(GeometryError::ZenithOutOfRange { angle, value });
            }
        }
        if !self.relative_azimuth.is_finite() {
            return Err(GeometryError::NotFinite {
                angle: "relative azimuth",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorption_zenith_defaults_to_solar() {
        let geometry = AcquisitionGeometry::new(30.0, 10.0, 0.0);
        assert_eq!(geometry.solar_zenith_absorption, 30.0);

        let geometry = geometry.with_absorption_zenith(45.0);
        assert_eq!(geometry.solar_zenith, 30.0);
        assert_eq!(geometry.solar_zenith_absorption, 45.0);
    }

    #[test]
    fn test_validate() {
        assert!(AcquisitionGeometry::new(30.0, 10.0, 120.0).validate().is_ok());

        let err = AcquisitionGeometry::new(90.0, 10.0, 0.0).validate().unwrap_err();
        assert_eq!(
            err,
            GeometryError::ZenithOutOfRange {
                angle: "solar zenith",
                value: 90.0
            }
        );

        let err = AcquisitionGeometry::new(30.0, f64::NAN, 0.0).validate().unwrap_err();
        assert_eq!(err, GeometryError::NotFinite { angle: "sensor zenith" });
    }
}
