pub mod device;
pub mod scan;

pub use device::{DeviceStatus, HazardType, RoadPath, Severity, SimulatedDevice};
pub use scan::ScanItem;
