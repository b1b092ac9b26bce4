use crate::record::device::{HazardType, Severity, SimulatedDevice};

/// Hazard-type/severity filter over the fleet. `None` is the all-pass
/// choice; inactive devices never pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetFilter {
    pub hazard_type: Option<HazardType>,
    pub severity: Option<Severity>,
}

impl FleetFilter {
    pub fn matches(&self, device: &SimulatedDevice) -> bool {
        self.hazard_type.map_or(true, |t| device.hazard_type == t)
            && self.severity.map_or(true, |s| device.level == s)
            && device.is_active()
    }

    pub fn apply(&self, fleet: &[SimulatedDevice]) -> Vec<SimulatedDevice> {
        fleet
            .iter()
            .filter(|device| self.matches(device))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::device::tests::test_device;
    use crate::record::device::DeviceStatus;

    fn fleet() -> Vec<SimulatedDevice> {
        let mut a = test_device(1);
        a.hazard_type = HazardType::Crack;
        a.level = Severity::High;

        let mut b = test_device(2);
        b.hazard_type = HazardType::Pothole;
        b.level = Severity::Low;

        let mut c = test_device(3);
        c.hazard_type = HazardType::Crack;
        c.level = Severity::Low;
        c.status = DeviceStatus::Inactive;

        vec![a, b, c]
    }

    #[test]
    fn inactive_devices_never_pass() {
        let filter = FleetFilter::default();
        let filtered = filter.apply(&fleet());
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|d| d.is_active()));
    }

    #[test]
    fn type_and_severity_filters_combine() {
        let filter = FleetFilter {
            hazard_type: Some(HazardType::Crack),
            severity: Some(Severity::High),
        };
        let filtered = filter.apply(&fleet());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn filtering_is_idempotent() {
        let filter = FleetFilter {
            hazard_type: Some(HazardType::Crack),
            severity: None,
        };
        let once = filter.apply(&fleet());
        let twice = filter.apply(&once);
        assert_eq!(once.len(), twice.len());
        let ids_once: Vec<u32> = once.iter().map(|d| d.id).collect();
        let ids_twice: Vec<u32> = twice.iter().map(|d| d.id).collect();
        assert_eq!(ids_once, ids_twice);
    }
}
