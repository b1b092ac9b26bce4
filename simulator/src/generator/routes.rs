use scancore::geo::coords::LonLat;
use scancore::record::device::RoadPath;

/// Patrol routes around the default monitoring area. Waypoints are ordered
/// and devices cycle through them endlessly.
pub fn route_catalog() -> Vec<RoadPath> {
    vec![
        RoadPath {
            id: "lakeview-arterial".into(),
            name: "Lakeview Arterial".into(),
            points: vec![
                LonLat::new(-122.0340, 47.3698),
                LonLat::new(-122.0205, 47.3622),
                LonLat::new(-122.0082, 47.3525),
            ],
        },
        RoadPath {
            id: "harbor-loop".into(),
            name: "Harbor Loop".into(),
            points: vec![
                LonLat::new(-122.0601, 47.3804),
                LonLat::new(-122.0483, 47.3861),
                LonLat::new(-122.0352, 47.3912),
            ],
        },
        RoadPath {
            id: "summit-highway".into(),
            name: "Summit Highway".into(),
            points: vec![
                LonLat::new(-122.0897, 47.3551),
                LonLat::new(-122.0604, 47.3603),
                LonLat::new(-122.0311, 47.3549),
            ],
        },
        RoadPath {
            id: "river-parkway".into(),
            name: "River Parkway".into(),
            points: vec![
                LonLat::new(-122.0553, 47.3401),
                LonLat::new(-122.0421, 47.3463),
                LonLat::new(-122.0287, 47.3524),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_has_mappable_waypoints() {
        for route in route_catalog() {
            assert!(route.points.len() >= 3, "route {}", route.id);
            assert!(route.points.iter().all(LonLat::is_map_valid));
        }
    }
}
