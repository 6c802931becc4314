//! Clumped turbid-medium canopy over a Lambertian soil.

use std::f64::consts::FRAC_2_PI;

use bv_common::{AcquisitionGeometry, BvSample, IvName};

use crate::error::{ModelError, ModelResult};
use crate::leaf::LeafOptics;

/// Mean projection of leaf area with a single inclination angle onto a
/// plane normal to a direction of zenith `zenith`. Both angles in radians.
pub fn leaf_projection(zenith: f64, inclination: f64) -> f64 {
    let cos_product = inclination.cos() * zenith.cos();
    let x = zenith.tan() * inclination.tan();
    if x <= 1.0 {
        cos_product
    } else {
        cos_product * (1.0 + FRAC_2_PI * ((x * x - 1.0).sqrt() - (1.0 / x).acos()))
    }
}

/// Soil reflectance at `wavelength_nm`, scaled by the brightness factor.
pub fn soil_reflectance(wavelength_nm: f64, brightness: f64) -> f64 {
    let slope = ((wavelength_nm - 400.0) / 1800.0).clamp(0.0, 1.0);
    (brightness.max(0.0) * (0.06 + 0.22 * slope)).min(1.0)
}

/// Reflectance of an optically deep canopy of leaves with albedo `albedo`.
fn infinite_reflectance(albedo: f64) -> f64 {
    let root = (1.0 - albedo.clamp(0.0, 1.0)).sqrt();
    (1.0 - root) / (1.0 + root)
}

/// Structure and gap probabilities of a canopy under a fixed geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canopy {
    /// Fraction of ground covered by crowns
    cover: f64,
    /// Leaf area index inside crowns
    crown_lai: f64,
    /// Leaf inclination (radians)
    inclination: f64,
    /// Gap probability in the view direction
    view_gap: f64,
    /// Joint sun/view gap probability, hot spot included
    bidirectional_gap: f64,
}

impl Canopy {
    pub fn new(sample: &BvSample, geometry: &AcquisitionGeometry) -> ModelResult<Self> {
        let lai = sample[IvName::MLAI];
        if !lai.is_finite() || lai < 0.0 {
            return Err(ModelError::InvalidVariable {
                variable: IvName::MLAI,
                value: lai,
            });
        }
        let cover = sample[IvName::CrownCover].clamp(0.0, 1.0);
        let crown_lai = if cover > 0.0 { lai / cover } else { 0.0 };
        let inclination = sample[IvName::ALA].clamp(0.0, 89.9).to_radians();

        let sun = geometry.solar_zenith.to_radians();
        let view = geometry.sensor_zenith.to_radians();
        let ks = leaf_projection(sun, inclination) / sun.cos();
        let ko = leaf_projection(view, inclination) / view.cos();

        let sun_gap = (-ks * crown_lai).exp();
        let view_gap = (-ko * crown_lai).exp();

        let (tan_s, tan_o) = (sun.tan(), view.tan());
        let distance = (tan_s * tan_s + tan_o * tan_o
            - 2.0 * tan_s * tan_o * geometry.relative_azimuth.to_radians().cos())
        .max(0.0)
        .sqrt();
        let hot_spot = sample[IvName::HsD];
        let correlation = if hot_spot > 0.0 {
            (-distance / hot_spot).exp()
        } else {
            0.0
        };
        let bidirectional_gap = (-(ks + ko) * crown_lai + (ks * ko).sqrt() * crown_lai * correlation)
            .exp()
            .min(sun_gap.min(view_gap));

        Ok(Self {
            cover,
            crown_lai,
            inclination,
            view_gap,
            bidirectional_gap,
        })
    }

    /// Scene reflectance for the given leaf optics and soil reflectance.
    pub fn reflectance(&self, leaf: LeafOptics, soil: f64) -> f64 {
        let deep = infinite_reflectance(leaf.albedo());
        let crowns = deep * (1.0 - self.view_gap) + soil * self.bidirectional_gap;
        self.cover * crowns + (1.0 - self.cover) * soil
    }

    /// Fraction of the ground hidden by leaves when viewed from nadir.
    pub fn fractional_cover(&self) -> f64 {
        self.cover * (1.0 - (-self.inclination.cos() * self.crown_lai).exp())
    }

    /// Fraction of direct light from `zenith_deg` intercepted by leaves.
    pub fn interception(&self, zenith_deg: f64) -> f64 {
        let zenith = zenith_deg.to_radians();
        let k = leaf_projection(zenith, self.inclination) / zenith.cos();
        self.cover * (1.0 - (-k * self.crown_lai).exp())
    }

    /// Fraction of radiation from `zenith_deg` absorbed by a canopy whose
    /// leaves have the given albedo.
    pub fn absorbed_fraction(&self, zenith_deg: f64, albedo: f64) -> f64 {
        (self.interception(zenith_deg) * (1.0 - infinite_reflectance(albedo))).clamp(0.0, 1.0)
    }
}
