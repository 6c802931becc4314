//! Choosing the batch geometry from explicit angles and optional metadata.

use bv_common::AcquisitionGeometry;
use tracing::{info, warn};

use crate::metadata::ProductMetadata;

/// Where the angles of a resolved geometry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometrySource {
    /// Angles given explicitly by configuration
    Explicit,
    /// Viewing angles of the first band of the product
    BandAngles,
    /// Product-wide viewing angles
    GlobalAngles,
}

/// Resolve the acquisition geometry of a batch.
///
/// When metadata carries solar and viewing angles they replace the explicit
/// solar zenith, sensor zenith and relative azimuth. The absorption solar
/// zenith always keeps its configured value. Metadata without usable angles
/// is reported and the explicit geometry is kept.
pub fn resolve_geometry(
    explicit: AcquisitionGeometry,
    metadata: Option<&ProductMetadata>,
) -> (AcquisitionGeometry, GeometrySource) {
    let Some(metadata) = metadata else {
        return (explicit, GeometrySource::Explicit);
    };

    let (sensor, source) = if metadata.has_band_mean_angles() {
        (metadata.band_sensor_mean_angles(0), GeometrySource::BandAngles)
    } else if metadata.has_global_mean_angles() {
        (metadata.sensor_mean_angles(), GeometrySource::GlobalAngles)
    } else {
        (None, GeometrySource::Explicit)
    };

    match (metadata.solar_mean_angles(), sensor, metadata.relative_azimuth()) {
        (Some(solar), Some(sensor), Some(relative_azimuth)) => {
            let geometry = AcquisitionGeometry {
                solar_zenith: solar.zenith,
                solar_zenith_absorption: explicit.solar_zenith_absorption,
                sensor_zenith: sensor.zenith,
                relative_azimuth,
            };
            info!(
                mission = metadata.mission_name(),
                solar_zenith = geometry.solar_zenith,
                sensor_zenith = geometry.sensor_zenith,
                relative_azimuth = geometry.relative_azimuth,
                source = ?source,
                "Using angles from product metadata"
            );
            (geometry, source)
        }
        _ => {
            warn!(
                mission = metadata.mission_name(),
                "There are no angles for this mission, keeping configured angles"
            );
            (explicit, GeometrySource::Explicit)
        }
    }
}
