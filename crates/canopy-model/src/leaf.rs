//! Leaf optical properties from leaf biochemistry.
//!
//! Specific absorption curves are smooth analytic approximations of the
//! pigment, water and dry matter absorption features.

use bv_common::{BvSample, IvName};

use crate::error::{ModelError, ModelResult};

/// Reflectance of the leaf surface (air/cuticle interface).
const SURFACE_REFLECTANCE: f64 = 0.04;

/// Scales total absorption to the optical path through the leaf interior.
const PATH_FACTOR: f64 = 1.5;

/// Leaf constituent contents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafBiochemistry {
    /// Structure parameter (number of compact layers)
    pub n: f64,
    /// Chlorophyll a+b (µg/cm²)
    pub cab: f64,
    /// Carotenoids (µg/cm²)
    pub car: f64,
    /// Brown pigments (arbitrary units)
    pub cbp: f64,
    /// Equivalent water thickness (g/cm²)
    pub cw: f64,
    /// Dry matter (g/cm²)
    pub cdm: f64,
}

impl LeafBiochemistry {
    /// Leaf contents of a sample. Water content is derived from dry matter
    /// and relative water content: `Cw = Cdm * CwRel / (1 - CwRel)`.
    pub fn from_sample(sample: &BvSample) -> ModelResult<Self> {
        let n = sample[IvName::N];
        if !(n > 0.0) {
            return Err(ModelError::InvalidVariable {
                variable: IvName::N,
                value: n,
            });
        }
        let cw_rel = sample[IvName::CwRel];
        if !(0.0..1.0).contains(&cw_rel) {
            return Err(ModelError::InvalidVariable {
                variable: IvName::CwRel,
                value: cw_rel,
            });
        }
        let cdm = sample[IvName::Cdm].max(0.0);

        Ok(Self {
            n,
            cab: sample[IvName::Cab].max(0.0),
            car: sample[IvName::Car].max(0.0),
            cbp: sample[IvName::Cbp].max(0.0),
            cw: cdm * cw_rel / (1.0 - cw_rel),
            cdm,
        })
    }

    /// Total absorption coefficient at `wavelength_nm`.
    pub fn absorption(&self, wavelength_nm: f64) -> f64 {
        self.cab * chlorophyll_absorption(wavelength_nm)
            + self.car * carotenoid_absorption(wavelength_nm)
            + self.cbp * brown_absorption(wavelength_nm)
            + self.cw * water_absorption(wavelength_nm)
            + self.cdm * dry_matter_absorption(wavelength_nm)
    }

    /// Leaf reflectance and transmittance at `wavelength_nm`.
    pub fn optics(&self, wavelength_nm: f64) -> LeafOptics {
        let interior = (-PATH_FACTOR * self.absorption(wavelength_nm)).exp();
        // More layers send more of the scattered light back
        let back_fraction = 1.0 - 1.0 / (self.n + 1.0);
        let scattered = (1.0 - SURFACE_REFLECTANCE) * interior;
        LeafOptics {
            reflectance: SURFACE_REFLECTANCE + scattered * back_fraction,
            transmittance: scattered * (1.0 - back_fraction),
        }
    }
}

/// Hemispherical reflectance and transmittance of a leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafOptics {
    pub reflectance: f64,
    pub transmittance: f64,
}

impl LeafOptics {
    /// Single scattering albedo.
    pub fn albedo(&self) -> f64 {
        self.reflectance + self.transmittance
    }
}

fn gaussian(x: f64, center: f64, width: f64) -> f64 {
    let d = (x - center) / width;
    (-0.5 * d * d).exp()
}

fn logistic(x: f64, center: f64, width: f64) -> f64 {
    1.0 / (1.0 + (-(x - center) / width).exp())
}

/// cm²/µg
fn chlorophyll_absorption(nm: f64) -> f64 {
    0.060 * gaussian(nm, 430.0, 30.0)
        + 0.045 * gaussian(nm, 675.0, 25.0)
        + 0.012 * gaussian(nm, 600.0, 60.0)
}

/// cm²/µg
fn carotenoid_absorption(nm: f64) -> f64 {
    0.12 * gaussian(nm, 470.0, 35.0)
}

fn brown_absorption(nm: f64) -> f64 {
    0.8 * (-(nm - 400.0) / 250.0).exp()
}

/// cm⁻¹
fn water_absorption(nm: f64) -> f64 {
    0.05 + 0.5 * gaussian(nm, 970.0, 35.0)
        + 1.0 * gaussian(nm, 1200.0, 40.0)
        + 25.0 * gaussian(nm, 1450.0, 70.0)
        + 110.0 * gaussian(nm, 1940.0, 90.0)
        + 60.0 * logistic(nm, 2450.0, 60.0)
}

/// cm²/g
fn dry_matter_absorption(nm: f64) -> f64 {
    20.0 + 400.0 * logistic(nm, 1600.0, 150.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn green_leaf() -> LeafBiochemistry {
        LeafBiochemistry {
            n: 1.5,
            cab: 40.0,
            car: 8.0,
            cbp: 0.0,
            cw: 0.012,
            cdm: 0.005,
        }
    }

    #[test]
    fn test_red_edge() {
        let leaf = green_leaf();
        let red = leaf.optics(670.0);
        let nir = leaf.optics(850.0);
        assert!(red.reflectance < 0.12, "red {:?}", red);
        assert!(nir.reflectance > 0.4, "nir {:?}", nir);
    }

    #[test]
    fn test_energy_conservation() {
        let leaf = green_leaf();
        for nm in (400..2500).step_by(50) {
            let optics = leaf.optics(nm as f64);
            assert!(optics.reflectance >= 0.0 && optics.transmittance >= 0.0);
            assert!(optics.albedo() <= 1.0);
        }
    }

    #[test]
    fn test_more_chlorophyll_darkens_red() {
        let pale = LeafBiochemistry { cab: 10.0, ..green_leaf() };
        let dark = LeafBiochemistry { cab: 80.0, ..green_leaf() };
        assert!(dark.optics(675.0).reflectance < pale.optics(675.0).reflectance);
    }

    #[test]
    fn test_water_from_relative_content() {
        let mut sample = BvSample::default();
        sample[IvName::N] = 1.5;
        sample[IvName::Cdm] = 0.004;
        sample[IvName::CwRel] = 0.75;

        let leaf = LeafBiochemistry::from_sample(&sample).unwrap();
        assert!((leaf.cw - 0.012).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_structure_parameter() {
        let sample = BvSample::default();
        let err = LeafBiochemistry::from_sample(&sample).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidVariable {
                variable: IvName::N,
                ..
            }
        ));
    }
}
