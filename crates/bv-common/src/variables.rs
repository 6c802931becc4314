//! Biophysical variables and the fixed-size samples built from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// Biophysical input variables, in the canonical column order of a sample table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IvName {
    /// Mean leaf area index (m²/m²)
    MLAI,
    /// Average leaf inclination angle (degrees)
    ALA,
    /// Fraction of the ground covered by crowns
    CrownCover,
    /// Hot-spot size parameter
    HsD,
    /// Leaf structure parameter (number of layers)
    N,
    /// Chlorophyll a+b content (µg/cm²)
    Cab,
    /// Carotenoid content (µg/cm²)
    Car,
    /// Dry matter content (g/cm²)
    Cdm,
    /// Relative water content
    CwRel,
    /// Brown pigments content
    Cbp,
    /// Soil brightness factor
    Bs,
}

impl IvName {
    /// Number of variables in a sample.
    pub const COUNT: usize = 11;

    /// All variables in canonical order.
    pub const ALL: [IvName; IvName::COUNT] = [
        IvName::MLAI,
        IvName::ALA,
        IvName::CrownCover,
        IvName::HsD,
        IvName::N,
        IvName::Cab,
        IvName::Car,
        IvName::Cdm,
        IvName::CwRel,
        IvName::Cbp,
        IvName::Bs,
    ];

    /// Column position of this variable.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name used in sample table headers.
    pub fn as_str(self) -> &'static str {
        match self {
            IvName::MLAI => "MLAI",
            IvName::ALA => "ALA",
            IvName::CrownCover => "CrownCover",
            IvName::HsD => "HsD",
            IvName::N => "N",
            IvName::Cab => "Cab",
            IvName::Car => "Car",
            IvName::Cdm => "Cdm",
            IvName::CwRel => "CwRel",
            IvName::Cbp => "Cbp",
            IvName::Bs => "Bs",
        }
    }
}

impl fmt::Display for IvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IvName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IvName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown biophysical variable: {}", s))
    }
}

/// One row of a sample table: a value for every [`IvName`].
///
/// Values not present in the source row are left at `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BvSample {
    values: [f64; IvName::COUNT],
}

impl BvSample {
    /// Build a sample from values given in canonical order.
    pub fn from_values(values: [f64; IvName::COUNT]) -> Self {
        Self { values }
    }

    /// Values in canonical order.
    pub fn values(&self) -> &[f64; IvName::COUNT] {
        &self.values
    }

    /// Space separated header line naming every variable.
    pub fn header() -> String {
        IvName::ALL
            .iter()
            .map(|name| name.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Index<IvName> for BvSample {
    type Output = f64;

    fn index(&self, name: IvName) -> &f64 {
        &self.values[name.index()]
    }
}

impl IndexMut<IvName> for BvSample {
    fn index_mut(&mut self, name: IvName) -> &mut f64 {
        &mut self.values[name.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_matches_index() {
        for (i, name) in IvName::ALL.iter().enumerate() {
            assert_eq!(name.index(), i);
        }
        assert_eq!(IvName::ALL.len(), IvName::COUNT);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("mlai".parse::<IvName>().unwrap(), IvName::MLAI);
        assert_eq!("CwRel".parse::<IvName>().unwrap(), IvName::CwRel);
        assert!("LAI".parse::<IvName>().is_err());
    }

    #[test]
    fn test_sample_indexing() {
        let mut sample = BvSample::default();
        sample[IvName::Cab] = 40.0;
        sample[IvName::Bs] = 1.2;

        assert_eq!(sample[IvName::Cab], 40.0);
        assert_eq!(sample.values()[5], 40.0);
        assert_eq!(sample.values()[10], 1.2);
        assert_eq!(sample[IvName::MLAI], 0.0);
    }

    #[test]
    fn test_header() {
        let header = BvSample::header();
        assert!(header.starts_with("MLAI ALA CrownCover"));
        assert!(header.ends_with("Cbp Bs"));
    }
}
