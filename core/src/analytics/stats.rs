use crate::record::device::{Severity, SimulatedDevice};

/// Headline numbers for the stat cards, computed over the filtered fleet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetStats {
    pub active: usize,
    pub high: usize,
    pub avg_value: i64,
    pub avg_speed: i64,
}

impl FleetStats {
    pub fn compute(filtered: &[SimulatedDevice]) -> Self {
        let active = filtered.len();
        let high = filtered
            .iter()
            .filter(|d| d.level == Severity::High)
            .count();
        Self {
            active,
            high,
            avg_value: mean_rounded(filtered.iter().map(|d| d.value).sum(), active),
            avg_speed: mean_rounded(filtered.iter().map(|d| d.speed_kmh).sum(), active),
        }
    }
}

/// Arithmetic mean rounded to the nearest integer; 0 — never NaN — for an
/// empty set.
pub fn mean_rounded(sum: f64, count: usize) -> i64 {
    if count == 0 {
        0
    } else {
        (sum / count as f64).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::device::tests::test_device;

    #[test]
    fn empty_set_yields_zero_not_nan() {
        let stats = FleetStats::compute(&[]);
        assert_eq!(stats.avg_value, 0);
        assert_eq!(stats.avg_speed, 0);
        assert_eq!(stats.active, 0);
    }

    #[test]
    fn averages_round_to_nearest_integer() {
        let mut a = test_device(1);
        a.value = 10.0;
        a.speed_kmh = 31.0;
        let mut b = test_device(2);
        b.value = 15.0;
        b.speed_kmh = 32.0;
        b.level = Severity::High;

        let stats = FleetStats::compute(&[a, b]);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.high, 1);
        assert_eq!(stats.avg_value, 13);
        assert_eq!(stats.avg_speed, 32);
    }
}
