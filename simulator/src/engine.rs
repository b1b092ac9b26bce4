use chrono::NaiveDateTime;
use rand::{rngs::StdRng, SeedableRng};
use scancore::record::device::SimulatedDevice;
use scancore::sim::interpolator::Interpolator;
use scancore::telemetry::log::EventLog;
use std::time::Duration;

/// Owns the live fleet and advances it once per tick. The fleet is replaced
/// wholesale each tick so published snapshots are always consistent.
pub struct FleetEngine {
    fleet: Vec<SimulatedDevice>,
    interpolator: Interpolator,
    rng: StdRng,
    log: EventLog,
    ticks: u64,
}

impl FleetEngine {
    pub fn new(fleet: Vec<SimulatedDevice>, interpolator: Interpolator, seed: u64) -> Self {
        Self {
            fleet,
            interpolator,
            rng: StdRng::seed_from_u64(seed),
            log: EventLog::new("engine"),
            ticks: 0,
        }
    }

    pub fn tick(&mut self, elapsed: Duration, now: NaiveDateTime) -> &[SimulatedDevice] {
        self.fleet = self
            .interpolator
            .advance_fleet(&self.fleet, elapsed, now, &mut self.rng);
        self.ticks += 1;
        if self.ticks % 60 == 0 {
            let active = self.fleet.iter().filter(|d| d.is_active()).count();
            self.log
                .record(&format!("tick {} -> {} active devices", self.ticks, active));
        }
        &self.fleet
    }

    pub fn snapshot(&self) -> &[SimulatedDevice] {
        &self.fleet
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::fleet::generate_fleet;
    use crate::scenario::config::ScenarioConfig;
    use scancore::geo::time::parse_capture;
    use scancore::record::device::TRAIL_LIMIT;

    #[test]
    fn ticks_preserve_fleet_size_and_trail_bounds() {
        let config = ScenarioConfig::from_args(10, 5, 1000);
        let now = parse_capture("2025-07-20T08:00:00").unwrap();
        let fleet = generate_fleet(&config, now);
        let mut engine = FleetEngine::new(fleet, config.interpolator(), config.seed);

        for i in 0..30 {
            let now = now + chrono::Duration::seconds(i);
            let snapshot = engine.tick(Duration::from_secs(1), now);
            assert_eq!(snapshot.len(), 10);
            assert!(snapshot.iter().all(|d| d.trail.len() <= TRAIL_LIMIT));
        }
        assert_eq!(engine.ticks(), 30);
    }

    #[test]
    fn active_devices_make_progress() {
        let config = ScenarioConfig::from_args(6, 2, 1000);
        let now = parse_capture("2025-07-20T08:00:00").unwrap();
        let fleet = generate_fleet(&config, now);
        let origins: Vec<_> = fleet.iter().map(|d| d.position).collect();
        let mut engine = FleetEngine::new(fleet, config.interpolator(), config.seed);

        for i in 0..120 {
            engine.tick(Duration::from_secs(1), now + chrono::Duration::seconds(i));
        }
        let moved = engine
            .snapshot()
            .iter()
            .zip(&origins)
            .filter(|(device, origin)| device.is_active() && device.position != **origin)
            .count();
        assert!(moved > 0);
    }
}
