//! Streaming extraction of mean angles from product metadata XML.

use std::path::Path;

use bv_common::MeanAngles;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{MetadataError, MetadataResult};

/// Elements holding the mean solar angles.
const SUN_CONTAINERS: &[&[u8]] = &[b"Mean_Sun_Angle", b"Sun_Angles", b"Solar_Angles", b"Sun_Angle"];

/// Elements holding mean viewing angles. A `bandId` attribute makes them band specific.
const VIEW_CONTAINERS: &[&[u8]] = &[
    b"Mean_Viewing_Incidence_Angle",
    b"Mean_Viewing_Angle",
    b"Viewing_Angles",
    b"Viewing_Angle",
    b"Incidence_Angles",
];

const ZENITH_ELEMENTS: &[&[u8]] = &[b"ZENITH_ANGLE", b"Zenith", b"Zenith_Angle"];
const AZIMUTH_ELEMENTS: &[&[u8]] = &[b"AZIMUTH_ANGLE", b"Azimuth", b"Azimuth_Angle"];
const MISSION_ELEMENTS: &[&[u8]] = &[b"SPACECRAFT_NAME", b"Mission", b"Platform", b"PLATFORM"];

/// Mean acquisition angles of a product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductMetadata {
    mission: Option<String>,
    solar: Option<MeanAngles>,
    band_sensor: Vec<(u32, MeanAngles)>,
    global_sensor: Option<MeanAngles>,
}

impl ProductMetadata {
    /// Read and parse a metadata file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> MetadataResult<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = Self::from_xml(&xml)?;
        debug!(
            path = %path.display(),
            mission = metadata.mission_name(),
            band_angles = metadata.band_sensor.len(),
            "Parsed product metadata"
        );
        Ok(metadata)
    }

    /// Parse metadata from an XML document.
    pub fn from_xml(xml: &str) -> MetadataResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut state = ParseState::default();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => state.start(&e),
                Ok(Event::Text(t)) => {
                    if state.leaf.is_some() {
                        let text = t.unescape().map_err(|e| MetadataError::Xml {
                            position: reader.buffer_position(),
                            message: e.to_string(),
                        })?;
                        state.text.push_str(&text);
                    }
                }
                Ok(Event::End(_)) => state.end()?,
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(MetadataError::Xml {
                        position: reader.buffer_position(),
                        message: e.to_string(),
                    })
                }
                _ => {}
            }
            buf.clear();
        }

        let mut metadata = state.metadata;
        metadata.band_sensor.sort_by_key(|(band, _)| *band);
        Ok(metadata)
    }

    /// Mission or platform name, `"unknown"` when absent.
    pub fn mission_name(&self) -> &str {
        self.mission.as_deref().unwrap_or("unknown")
    }

    /// Mean solar angles, if present.
    pub fn solar_mean_angles(&self) -> Option<MeanAngles> {
        self.solar
    }

    /// Whether per-band viewing angles are present.
    pub fn has_band_mean_angles(&self) -> bool {
        !self.band_sensor.is_empty()
    }

    /// Whether product-wide viewing angles are present.
    pub fn has_global_mean_angles(&self) -> bool {
        self.global_sensor.is_some()
    }

    /// Viewing angles of the `band`-th band, bands ordered by id.
    pub fn band_sensor_mean_angles(&self, band: usize) -> Option<MeanAngles> {
        self.band_sensor.get(band).map(|(_, angles)| *angles)
    }

    /// Product-wide viewing angles, or the average over bands when only
    /// per-band angles exist.
    pub fn sensor_mean_angles(&self) -> Option<MeanAngles> {
        if let Some(global) = self.global_sensor {
            return Some(global);
        }
        if self.band_sensor.is_empty() {
            return None;
        }
        let n = self.band_sensor.len() as f64;
        let (zenith, azimuth) = self
            .band_sensor
            .iter()
            .fold((0.0, 0.0), |(z, a), (_, angles)| (z + angles.zenith, a + angles.azimuth));
        Some(MeanAngles::new(zenith / n, azimuth / n))
    }

    /// Relative azimuth between sun and sensor, folded into [0, 180] degrees.
    pub fn relative_azimuth(&self) -> Option<f64> {
        let solar = self.solar?;
        let sensor = self.sensor_mean_angles()?;
        Some(fold_relative_azimuth(solar.azimuth - sensor.azimuth))
    }
}

/// Fold an azimuth difference into [0, 180] degrees.
pub(crate) fn fold_relative_azimuth(difference: f64) -> f64 {
    let wrapped = (difference + 180.0).rem_euclid(360.0) - 180.0;
    wrapped.abs()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    Sun,
    View { band: Option<u32> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Leaf {
    Zenith,
    Azimuth,
    Mission,
}

#[derive(Default)]
struct ParseState {
    depth: usize,
    container: Option<(Container, usize)>,
    zenith: Option<f64>,
    azimuth: Option<f64>,
    leaf: Option<(Leaf, usize, String)>,
    text: String,
    metadata: ProductMetadata,
}

impl ParseState {
    fn start(&mut self, e: &BytesStart<'_>) {
        self.depth += 1;
        let local = e.local_name();
        let name = local.as_ref();

        if self.container.is_none() {
            if SUN_CONTAINERS.contains(&name) {
                self.open_container(Container::Sun);
                return;
            }
            if VIEW_CONTAINERS.contains(&name) {
                self.open_container(Container::View { band: band_id(e) });
                return;
            }
        }

        if let Some((_, container_depth)) = self.container {
            if self.depth == container_depth + 1 {
                if ZENITH_ELEMENTS.contains(&name) {
                    self.open_leaf(Leaf::Zenith, name);
                } else if AZIMUTH_ELEMENTS.contains(&name) {
                    self.open_leaf(Leaf::Azimuth, name);
                }
            }
        } else if self.metadata.mission.is_none() && MISSION_ELEMENTS.contains(&name) {
            self.open_leaf(Leaf::Mission, name);
        }
    }

    fn open_container(&mut self, container: Container) {
        self.container = Some((container, self.depth));
        self.zenith = None;
        self.azimuth = None;
    }

    fn open_leaf(&mut self, leaf: Leaf, name: &[u8]) {
        self.leaf = Some((leaf, self.depth, String::from_utf8_lossy(name).into_owned()));
        self.text.clear();
    }

    fn end(&mut self) -> MetadataResult<()> {
        if let Some((leaf, depth, element)) = self.leaf.take() {
            if depth == self.depth {
                self.close_leaf(leaf, element)?;
            } else {
                self.leaf = Some((leaf, depth, element));
            }
        }

        if let Some((container, depth)) = self.container {
            if depth == self.depth {
                self.close_container(container);
                self.container = None;
            }
        }

        self.depth = self.depth.saturating_sub(1);
        Ok(())
    }

    fn close_leaf(&mut self, leaf: Leaf, element: String) -> MetadataResult<()> {
        let text = self.text.trim();
        match leaf {
            Leaf::Mission => {
                if !text.is_empty() {
                    self.metadata.mission = Some(text.to_string());
                }
            }
            Leaf::Zenith | Leaf::Azimuth => {
                let value = text.parse::<f64>().map_err(|_| MetadataError::InvalidAngle {
                    element,
                    value: text.to_string(),
                })?;
                if leaf == Leaf::Zenith {
                    self.zenith = Some(value);
                } else {
                    self.azimuth = Some(value);
                }
            }
        }
        self.text.clear();
        Ok(())
    }

    fn close_container(&mut self, container: Container) {
        // A container without a zenith carries no usable angles
        let Some(zenith) = self.zenith.take() else {
            return;
        };
        let angles = MeanAngles::new(zenith, self.azimuth.take().unwrap_or(0.0));

        match container {
            Container::Sun => {
                if self.metadata.solar.is_none() {
                    self.metadata.solar = Some(angles);
                }
            }
            Container::View { band: Some(band) } => self.metadata.band_sensor.push((band, angles)),
            Container::View { band: None } => {
                if self.metadata.global_sensor.is_none() {
                    self.metadata.global_sensor = Some(angles);
                }
            }
        }
    }
}

fn band_id(e: &BytesStart<'_>) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == b"bandId")
        .and_then(|attr| String::from_utf8_lossy(&attr.value).trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{
        assert_approx_eq, create_maccs_metadata, create_metadata_without_view_angles,
        create_sentinel2_metadata,
    };

    #[test]
    fn test_sentinel2_band_angles() {
        let xml = create_sentinel2_metadata(
            (35.5, 160.0),
            &[(1, 6.0, 100.0), (0, 5.0, 104.0), (2, 7.0, 102.0)],
        );
        let metadata = ProductMetadata::from_xml(&xml).unwrap();

        assert_eq!(metadata.mission_name(), "Sentinel-2A");
        assert_eq!(metadata.solar_mean_angles(), Some(MeanAngles::new(35.5, 160.0)));
        assert!(metadata.has_band_mean_angles());
        assert!(!metadata.has_global_mean_angles());

        // ordered by bandId, not document order
        assert_eq!(
            metadata.band_sensor_mean_angles(0),
            Some(MeanAngles::new(5.0, 104.0))
        );
        assert_eq!(metadata.band_sensor_mean_angles(3), None);

        let mean = metadata.sensor_mean_angles().unwrap();
        assert_approx_eq!(mean.zenith, 6.0, 1e-12);
        assert_approx_eq!(mean.azimuth, 102.0, 1e-12);
        assert_approx_eq!(metadata.relative_azimuth().unwrap(), 58.0, 1e-12);
    }

    #[test]
    fn test_maccs_global_angles() {
        let xml = create_maccs_metadata("SENTINEL2B", (40.0, 150.0), (8.0, 290.0));
        let metadata = ProductMetadata::from_xml(&xml).unwrap();

        assert_eq!(metadata.mission_name(), "SENTINEL2B");
        assert!(!metadata.has_band_mean_angles());
        assert!(metadata.has_global_mean_angles());
        assert_eq!(metadata.sensor_mean_angles(), Some(MeanAngles::new(8.0, 290.0)));
        // 150 - 290 = -140
        assert_approx_eq!(metadata.relative_azimuth().unwrap(), 140.0, 1e-12);
    }

    #[test]
    fn test_missing_view_angles() {
        let xml = create_metadata_without_view_angles("SPOT4", (50.0, 120.0));
        let metadata = ProductMetadata::from_xml(&xml).unwrap();

        assert_eq!(metadata.mission_name(), "SPOT4");
        assert_eq!(metadata.solar_mean_angles(), Some(MeanAngles::new(50.0, 120.0)));
        assert!(!metadata.has_band_mean_angles());
        assert!(!metadata.has_global_mean_angles());
        assert_eq!(metadata.relative_azimuth(), None);
    }

    #[test]
    fn test_angle_grids_are_ignored() {
        let xml = r#"
<Tile_Angles>
  <Sun_Angles_Grid>
    <Zenith><Values_List><VALUES>30 31 32</VALUES></Values_List></Zenith>
  </Sun_Angles_Grid>
  <Mean_Sun_Angle>
    <ZENITH_ANGLE unit="deg">31.0</ZENITH_ANGLE>
    <AZIMUTH_ANGLE unit="deg">140.0</AZIMUTH_ANGLE>
  </Mean_Sun_Angle>
</Tile_Angles>"#;
        let metadata = ProductMetadata::from_xml(xml).unwrap();
        assert_eq!(metadata.solar_mean_angles(), Some(MeanAngles::new(31.0, 140.0)));
        assert_eq!(metadata.mission_name(), "unknown");
    }

    #[test]
    fn test_invalid_angle_value() {
        let xml = "<Mean_Sun_Angle><ZENITH_ANGLE>high</ZENITH_ANGLE></Mean_Sun_Angle>";
        let err = ProductMetadata::from_xml(xml).unwrap_err();
        match err {
            MetadataError::InvalidAngle { element, value } => {
                assert_eq!(element, "ZENITH_ANGLE");
                assert_eq!(value, "high");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_xml() {
        let err = ProductMetadata::from_xml("<a><b></a>").unwrap_err();
        assert!(matches!(err, MetadataError::Xml { .. }));
    }

    #[test]
    fn test_fold_relative_azimuth() {
        assert_approx_eq!(fold_relative_azimuth(0.0), 0.0, 1e-12);
        assert_approx_eq!(fold_relative_azimuth(-140.0), 140.0, 1e-12);
        assert_approx_eq!(fold_relative_azimuth(270.0), 90.0, 1e-12);
        assert_approx_eq!(fold_relative_azimuth(-190.0), 170.0, 1e-12);
        assert_approx_eq!(fold_relative_azimuth(180.0), 180.0, 1e-12);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VENUS_HDR.xml");
        std::fs::write(&path, create_maccs_metadata("VENUS", (20.0, 100.0), (3.0, 10.0))).unwrap();

        let metadata = ProductMetadata::from_file(&path).unwrap();
        assert_eq!(metadata.mission_name(), "VENUS");
        assert_approx_eq!(metadata.relative_azimuth().unwrap(), 90.0, 1e-12);
    }

    #[test]
    fn test_from_file_missing() {
        let err = ProductMetadata::from_file("/nonexistent/MTD_TL.xml").unwrap_err();
        assert!(matches!(err, MetadataError::Io { .. }));
    }
}
