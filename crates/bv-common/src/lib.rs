//! Common types shared by every crate of the ProSail batch workspace.

pub mod geometry;
pub mod variables;

pub use geometry::{AcquisitionGeometry, GeometryError, MeanAngles};
pub use variables::{BvSample, IvName};
