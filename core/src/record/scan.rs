use crate::geo::coords::{resolve_coordinate, CoordField, LonLat};
use crate::geo::time;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One geo-tagged road observation as returned by the scan endpoints.
///
/// Coordinates may arrive under two field pairs: the link-matched pair
/// (`link_lot`/`link_lat`) and the raw pair (`lot`/`lat`). Resolution
/// prefers the link pair. Fields outside the known schema are preserved
/// verbatim in `extra` rather than probed dynamically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_dt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<CoordField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lot: Option<CoordField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_lat: Option<CoordField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_lot: Option<CoordField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_img_file_nm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dvc_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ScanItem {
    /// Resolved coordinates, link pair first, regardless of validity.
    pub fn coordinates(&self) -> Option<LonLat> {
        let lon = resolve_coordinate(self.link_lot.as_ref(), self.lot.as_ref())?;
        let lat = resolve_coordinate(self.link_lat.as_ref(), self.lat.as_ref())?;
        Some(LonLat::new(lon, lat))
    }

    /// Coordinates passing map validity, or `None` for unmappable records.
    pub fn map_position(&self) -> Option<LonLat> {
        self.coordinates().filter(LonLat::is_map_valid)
    }

    pub fn capture_time(&self) -> Option<NaiveDateTime> {
        self.capture_dt.as_deref().and_then(time::parse_capture)
    }
}
