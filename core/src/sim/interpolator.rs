use crate::geo::coords::LonLat;
use crate::record::device::{SimulatedDevice, TRAIL_LIMIT};
use chrono::NaiveDateTime;
use rand::Rng;
use std::time::Duration;

pub const DEFAULT_SPEED_DEG_PER_SEC: f64 = 0.0001;
/// Below this remaining distance a device snaps onto its target waypoint.
pub const SNAP_THRESHOLD_DEG: f64 = 0.001;
/// Severity values never decay below this floor.
pub const VALUE_FLOOR: f64 = 5.0;

/// Advances simulated devices along their reference paths at a fixed speed.
///
/// Pure transform: the previous tick's list goes in, a fresh list comes out,
/// so downstream readers always observe a consistent snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator {
    pub speed_deg_per_sec: f64,
    pub snap_threshold_deg: f64,
    pub trail_limit: usize,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self {
            speed_deg_per_sec: DEFAULT_SPEED_DEG_PER_SEC,
            snap_threshold_deg: SNAP_THRESHOLD_DEG,
            trail_limit: TRAIL_LIMIT,
        }
    }
}

impl Interpolator {
    pub fn advance_fleet<R: Rng>(
        &self,
        fleet: &[SimulatedDevice],
        elapsed: Duration,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Vec<SimulatedDevice> {
        fleet
            .iter()
            .map(|device| self.advance_device(device, elapsed, now, rng))
            .collect()
    }

    fn advance_device<R: Rng>(
        &self,
        device: &SimulatedDevice,
        elapsed: Duration,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> SimulatedDevice {
        if !device.is_active() {
            return device.clone();
        }

        let mut next = device.clone();
        let delta_lon = device.target.lon - device.position.lon;
        let delta_lat = device.target.lat - device.position.lat;
        let distance = device.position.distance_deg(&device.target);

        if distance < self.snap_threshold_deg {
            next.position = device.target;
            next.path_index = (device.path_index + 1) % device.path.points.len();
            next.target = device.path.waypoint(next.path_index);
        } else {
            let travel = self.speed_deg_per_sec * elapsed.as_secs_f64();
            let ratio = (travel / distance).min(1.0);
            next.position = LonLat::new(
                device.position.lon + delta_lon * ratio,
                device.position.lat + delta_lat * ratio,
            );
        }

        let reached = next.position;
        next.push_trail(reached, self.trail_limit);
        next.value = (device.value + (rng.gen::<f64>() - 0.5) * 5.0).max(VALUE_FLOOR);
        next.heading_deg = delta_lat.atan2(delta_lon).to_degrees();
        next.last_update = now;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::device::tests::test_device;
    use crate::record::device::DeviceStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 7, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn distance_to_target_strictly_decreases_until_snap() {
        let interpolator = Interpolator::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut device = test_device(1);
        device.position = LonLat::new(0.0, 0.0);
        device.target = LonLat::new(0.005, 0.0);

        let mut previous = device.position.distance_deg(&device.target);
        for _ in 0..30 {
            device = interpolator
                .advance_fleet(&[device], Duration::from_secs(1), now(), &mut rng)
                .remove(0);
            let remaining = device.position.distance_deg(&device.target);
            if device.position == device.target || device.path_index != 0 {
                break;
            }
            assert!(remaining < previous);
            previous = remaining;
        }
    }

    #[test]
    fn short_hop_snaps_and_advances_the_path_index() {
        let interpolator = Interpolator::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut device = test_device(1);
        device.position = LonLat::new(0.0, 0.0);
        device.target = LonLat::new(0.0005, 0.0);
        device.path_index = 0;

        let next = interpolator
            .advance_fleet(&[device], Duration::from_secs(1), now(), &mut rng)
            .remove(0);
        assert_eq!(next.position, LonLat::new(0.0005, 0.0));
        assert_eq!(next.path_index, 1);
        assert_eq!(next.target, next.path.waypoint(1));
    }

    #[test]
    fn trail_stays_bounded_over_many_ticks() {
        let interpolator = Interpolator::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut fleet = vec![test_device(1)];
        for _ in 0..50 {
            fleet = interpolator.advance_fleet(&fleet, Duration::from_secs(1), now(), &mut rng);
        }
        assert!(fleet[0].trail.len() <= TRAIL_LIMIT);
    }

    #[test]
    fn value_never_drops_below_the_floor() {
        let interpolator = Interpolator::default();
        let mut rng = StdRng::seed_from_u64(11);
        let mut fleet = vec![test_device(1)];
        fleet[0].value = VALUE_FLOOR;
        for _ in 0..40 {
            fleet = interpolator.advance_fleet(&fleet, Duration::from_secs(1), now(), &mut rng);
            assert!(fleet[0].value >= VALUE_FLOOR);
        }
    }

    #[test]
    fn inactive_devices_pass_through_unchanged() {
        let interpolator = Interpolator::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut device = test_device(2);
        device.status = DeviceStatus::Inactive;
        let before = device.clone();

        let next = interpolator
            .advance_fleet(&[device], Duration::from_secs(1), now(), &mut rng)
            .remove(0);
        assert_eq!(next.position, before.position);
        assert_eq!(next.trail, before.trail);
        assert_eq!(next.last_update, before.last_update);
    }

    #[test]
    fn movement_never_overshoots_the_target() {
        let interpolator = Interpolator {
            speed_deg_per_sec: 1.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(9);
        let mut device = test_device(1);
        device.position = LonLat::new(0.0, 0.0);
        device.target = LonLat::new(0.002, 0.0);

        let next = interpolator
            .advance_fleet(&[device], Duration::from_secs(10), now(), &mut rng)
            .remove(0);
        assert_eq!(next.position, LonLat::new(0.002, 0.0));
    }
}
