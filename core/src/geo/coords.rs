use serde::{Deserialize, Serialize};

/// Longitude/latitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Euclidean distance in degree units, the metric the movement model uses.
    pub fn distance_deg(&self, other: &LonLat) -> f64 {
        let dlon = other.lon - self.lon;
        let dlat = other.lat - self.lat;
        (dlon * dlon + dlat * dlat).sqrt()
    }

    /// A pair is renderable only when both components are finite, inside the
    /// WGS84 envelope, and not the (0,0) "no fix" sentinel.
    pub fn is_map_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && (-180.0..=180.0).contains(&self.lon)
            && (-90.0..=90.0).contains(&self.lat)
            && !(self.lon == 0.0 && self.lat == 0.0)
    }
}

/// Coordinate component as it appears on the wire: a JSON number or a
/// numeric string, depending on which upstream system produced the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CoordField {
    Number(f64),
    Text(String),
}

impl CoordField {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CoordField::Number(n) => Some(*n),
            CoordField::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Resolves one coordinate component with documented precedence: when the
/// link-matched field is present it wins outright, even if unparsable; the
/// plain field is consulted only when the link field is absent.
pub fn resolve_coordinate(link: Option<&CoordField>, plain: Option<&CoordField>) -> Option<f64> {
    match link {
        Some(field) => field.as_f64(),
        None => plain.and_then(CoordField::as_f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_treated_as_no_fix() {
        assert!(!LonLat::new(0.0, 0.0).is_map_valid());
        assert!(LonLat::new(0.0, 0.1).is_map_valid());
    }

    #[test]
    fn out_of_envelope_pairs_are_invalid() {
        assert!(!LonLat::new(-190.0, 10.0).is_map_valid());
        assert!(!LonLat::new(10.0, 95.0).is_map_valid());
        assert!(!LonLat::new(f64::NAN, 10.0).is_map_valid());
    }

    #[test]
    fn link_field_takes_priority_over_plain() {
        let link = CoordField::Number(127.1);
        let plain = CoordField::Number(126.9);
        assert_eq!(resolve_coordinate(Some(&link), Some(&plain)), Some(127.1));
        assert_eq!(resolve_coordinate(None, Some(&plain)), Some(126.9));
    }

    #[test]
    fn string_coordinates_parse() {
        let field = CoordField::Text(" 37.5665 ".into());
        assert_eq!(field.as_f64(), Some(37.5665));
        assert_eq!(CoordField::Text("n/a".into()).as_f64(), None);
    }

    #[test]
    fn distance_is_euclidean_in_degrees() {
        let a = LonLat::new(0.0, 0.0);
        let b = LonLat::new(0.0003, 0.0004);
        assert!((a.distance_deg(&b) - 0.0005).abs() < 1e-12);
    }
}
