use crate::generator::routes::route_catalog;
use crate::scenario::config::ScenarioConfig;
use anyhow::Context;
use chrono::{Duration as ChronoDuration, NaiveDateTime};
use rand::{rngs::StdRng, Rng, SeedableRng};
use scancore::geo::coords::{CoordField, LonLat};
use scancore::geo::time::parse_capture;
use scancore::record::device::{
    DeviceStatus, HazardType, Severity, SimulatedDevice, SOURCES,
};
use scancore::record::scan::ScanItem;
use std::collections::VecDeque;

/// Builds the initial device fleet. Deterministic per seed so scenarios
/// replay consistently.
pub fn generate_fleet(config: &ScenarioConfig, now: NaiveDateTime) -> Vec<SimulatedDevice> {
    let routes = route_catalog();
    let mut rng = StdRng::seed_from_u64(config.seed);

    (0..config.device_count)
        .map(|i| {
            let hazard_type = HazardType::ALL[i % HazardType::ALL.len()];
            let roll: f64 = rng.gen();
            let level = if roll > 0.7 {
                Severity::High
            } else if roll > 0.4 {
                Severity::Medium
            } else {
                Severity::Low
            };
            let base_value = match level {
                Severity::High => 70.0,
                Severity::Medium => 40.0,
                Severity::Low => 15.0,
            };

            let path = routes[i % routes.len()].clone();
            let start = rng.gen_range(0..path.points.len().saturating_sub(1).max(1));
            let position = path.waypoint(start);

            SimulatedDevice {
                id: i as u32 + 1,
                device_id: format!("DEV-{:03}", i + 1),
                hazard_type,
                level,
                value: base_value + rng.gen_range(0.0..25.0),
                source: SOURCES[i % SOURCES.len()].to_string(),
                description: hazard_type.description().to_string(),
                status: if rng.gen::<f64>() > 0.15 {
                    DeviceStatus::Active
                } else {
                    DeviceStatus::Inactive
                },
                confidence: 75 + rng.gen_range(0..25),
                speed_kmh: 30.0 + rng.gen_range(0.0..50.0),
                heading_deg: rng.gen_range(0.0..360.0),
                position,
                target: path.waypoint(start + 1),
                path_index: start,
                path,
                trail: VecDeque::from([position]),
                last_update: now,
            }
        })
        .collect()
}

/// Builds the synthetic scan history the list endpoint serves: records
/// spread across the configured date range along the route catalog. A few
/// records carry a (0,0) no-fix position or only the plain coordinate pair,
/// matching the rough edges of real scanner exports.
pub fn generate_scans(config: &ScenarioConfig) -> anyhow::Result<Vec<ScanItem>> {
    let routes = route_catalog();
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(1));
    let start = parse_capture(&config.range_start)
        .with_context(|| format!("parsing scenario range_start {:?}", config.range_start))?;

    let per_day = config.scans_per_day.max(1);
    let slot_seconds = (86_400 / per_day as i64).max(1);
    let mut scans = Vec::with_capacity(config.scan_days as usize * per_day);
    let mut counter = 0u32;

    for day in 0..config.scan_days {
        for slot in 0..per_day {
            counter += 1;
            let capture = start
                + ChronoDuration::days(day as i64)
                + ChronoDuration::seconds(slot as i64 * slot_seconds + rng.gen_range(0..60));

            let route = &routes[(day as usize + slot) % routes.len()];
            let leg = rng.gen_range(0..route.points.len() - 1);
            let from = route.points[leg];
            let to = route.points[leg + 1];
            let t: f64 = rng.gen();
            let position = LonLat::new(
                from.lon + (to.lon - from.lon) * t + rng.gen_range(-0.002..0.002),
                from.lat + (to.lat - from.lat) * t + rng.gen_range(-0.002..0.002),
            );

            let scan_id = format!("scan-{counter:04}");
            let mut item = ScanItem {
                scan_id: Some(scan_id.clone()),
                capture_dt: Some(capture.format("%Y-%m-%dT%H:%M:%S").to_string()),
                road_img_file_nm: Some(format!("scans/{scan_id}.jpg")),
                dvc_id: Some(format!("DEV-{:03}", 1 + counter % config.device_count.max(1) as u32)),
                ..Default::default()
            };

            if counter % 23 == 0 {
                // Occasional no-fix record; excluded from the map but still
                // counted in stats and date groups.
                item.lot = Some(CoordField::Number(0.0));
                item.lat = Some(CoordField::Number(0.0));
            } else if counter % 7 == 0 {
                item.lot = Some(CoordField::Text(format!("{:.6}", position.lon)));
                item.lat = Some(CoordField::Text(format!("{:.6}", position.lat)));
            } else {
                item.link_lot = Some(CoordField::Number(position.lon));
                item.link_lat = Some(CoordField::Number(position.lat));
            }

            scans.push(item);
        }
    }

    Ok(scans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fleet_generation_is_deterministic_per_seed() {
        let config = ScenarioConfig::from_args(12, 99, 1000);
        let now = parse_capture("2025-07-20T00:00:00").unwrap();
        let first = generate_fleet(&config, now);
        let second = generate_fleet(&config, now);

        assert_eq!(first.len(), 12);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.device_id, b.device_id);
            assert_eq!(a.position, b.position);
            assert_eq!(a.value, b.value);
        }
    }

    #[test]
    fn devices_start_on_their_paths_with_seeded_trails() {
        let config = ScenarioConfig::from_args(8, 3, 1000);
        let now = parse_capture("2025-07-20T00:00:00").unwrap();
        for device in generate_fleet(&config, now) {
            assert!(device.path.points.contains(&device.position));
            assert_eq!(device.trail.len(), 1);
            assert_eq!(device.target, device.path.waypoint(device.path_index + 1));
        }
    }

    #[test]
    fn scan_history_covers_the_date_range() {
        let mut config = ScenarioConfig::from_args(5, 1, 1000);
        config.scan_days = 3;
        config.scans_per_day = 10;
        let scans = generate_scans(&config).unwrap();
        assert_eq!(scans.len(), 30);

        let mappable = scans.iter().filter(|s| s.map_position().is_some()).count();
        assert!(mappable < scans.len());
        assert!(mappable > scans.len() / 2);

        let days: std::collections::BTreeSet<_> = scans
            .iter()
            .filter_map(|s| s.capture_time())
            .map(|t| t.date())
            .collect();
        assert_eq!(days.len(), 3);
    }

    #[test]
    fn unparsable_range_start_is_a_contextual_error() {
        let mut config = ScenarioConfig::default();
        config.range_start = "not a date".into();
        let error = generate_scans(&config).unwrap_err();
        assert!(error.to_string().contains("range_start"));
    }
}
