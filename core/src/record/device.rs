use crate::geo::coords::LonLat;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Hazard classes reported by road scanners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardType {
    Crack,
    Pothole,
    Debris,
    WaterDamage,
    SurfaceWear,
    BarrierDamage,
}

impl HazardType {
    pub const ALL: [HazardType; 6] = [
        HazardType::Crack,
        HazardType::Pothole,
        HazardType::Debris,
        HazardType::WaterDamage,
        HazardType::SurfaceWear,
        HazardType::BarrierDamage,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HazardType::Crack => "crack",
            HazardType::Pothole => "pothole",
            HazardType::Debris => "debris",
            HazardType::WaterDamage => "water_damage",
            HazardType::SurfaceWear => "surface_wear",
            HazardType::BarrierDamage => "barrier_damage",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HazardType::Crack => "road crack detected",
            HazardType::Pothole => "pothole risk zone",
            HazardType::Debris => "road debris sighted",
            HazardType::WaterDamage => "water damage section",
            HazardType::SurfaceWear => "severe surface wear",
            HazardType::BarrierDamage => "guardrail damage",
        }
    }

    pub fn color(&self) -> [u8; 3] {
        match self {
            HazardType::Crack => [59, 130, 246],
            HazardType::Pothole => [245, 158, 11],
            HazardType::Debris => [239, 68, 68],
            HazardType::WaterDamage => [16, 185, 129],
            HazardType::SurfaceWear => [139, 92, 246],
            HazardType::BarrierDamage => [249, 115, 22],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Low, Severity::Medium, Severity::High];

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn color(&self) -> [u8; 3] {
        match self {
            Severity::Low => [34, 197, 94],
            Severity::Medium => [245, 158, 11],
            Severity::High => [239, 68, 68],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Inactive,
}

/// Observation sources a record can originate from.
pub const SOURCES: [&str; 6] = [
    "patrol-vehicle",
    "inspection-vehicle",
    "monitor-van",
    "drone-unit",
    "fixed-sensor",
    "iot-terminal",
];

/// Closed reference path a simulated device patrols. Waypoints are ordered
/// and the path wraps; a path always carries at least one waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadPath {
    pub id: String,
    pub name: String,
    pub points: Vec<LonLat>,
}

impl RoadPath {
    pub fn waypoint(&self, index: usize) -> LonLat {
        self.points[index % self.points.len()]
    }
}

/// Maximum retained trail positions; the oldest entry is evicted first.
pub const TRAIL_LIMIT: usize = 10;

/// One simulated road scanner with live movement state. Advanced once per
/// tick by the interpolator via full-list replacement, never concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedDevice {
    pub id: u32,
    pub device_id: String,
    pub hazard_type: HazardType,
    pub level: Severity,
    pub value: f64,
    pub source: String,
    pub description: String,
    pub status: DeviceStatus,
    pub confidence: u8,
    pub speed_kmh: f64,
    pub heading_deg: f64,
    pub position: LonLat,
    pub target: LonLat,
    pub path: RoadPath,
    pub path_index: usize,
    pub trail: VecDeque<LonLat>,
    pub last_update: NaiveDateTime,
}

impl SimulatedDevice {
    pub fn is_active(&self) -> bool {
        self.status == DeviceStatus::Active
    }

    /// Appends a trail position, evicting from the front past the limit.
    pub fn push_trail(&mut self, position: LonLat, limit: usize) {
        self.trail.push_back(position);
        while self.trail.len() > limit {
            self.trail.pop_front();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn test_device(id: u32) -> SimulatedDevice {
        let path = RoadPath {
            id: "test-road".into(),
            name: "Test Road".into(),
            points: vec![
                LonLat::new(0.0, 0.0),
                LonLat::new(0.0005, 0.0),
                LonLat::new(0.0005, 0.0005),
            ],
        };
        SimulatedDevice {
            id,
            device_id: format!("DEV-{id:03}"),
            hazard_type: HazardType::Crack,
            level: Severity::Medium,
            value: 40.0,
            source: SOURCES[0].into(),
            description: HazardType::Crack.description().into(),
            status: DeviceStatus::Active,
            confidence: 90,
            speed_kmh: 45.0,
            heading_deg: 0.0,
            position: path.points[0],
            target: path.points[1],
            path: path.clone(),
            path_index: 0,
            trail: VecDeque::from([path.points[0]]),
            last_update: NaiveDate::from_ymd_opt(2025, 7, 20)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn trail_evicts_oldest_entries_first() {
        let mut device = test_device(1);
        for i in 0..25 {
            device.push_trail(LonLat::new(i as f64, 0.0), TRAIL_LIMIT);
        }
        assert_eq!(device.trail.len(), TRAIL_LIMIT);
        assert_eq!(device.trail.front().unwrap().lon, 15.0);
        assert_eq!(device.trail.back().unwrap().lon, 24.0);
    }

    #[test]
    fn path_waypoints_wrap() {
        let device = test_device(1);
        assert_eq!(device.path.waypoint(3), device.path.waypoint(0));
    }
}
