//! Acquisition geometry from satellite product metadata.
//!
//! Reads the mean solar and viewing angles of a product from its XML
//! metadata (Sentinel-2 tile metadata, MACCS/THEIA headers, DIMAP-like
//! documents) and resolves the geometry used for a simulation batch.

pub mod error;
pub mod metadata;
pub mod resolve;

pub use error::{MetadataError, MetadataResult};
pub use metadata::ProductMetadata;
pub use resolve::{resolve_geometry, GeometrySource};
