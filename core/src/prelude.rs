//! Convenience re-exports for the types most consumers touch.

pub use crate::config::{ApiConfig, ConfigError};
pub use crate::geo::coords::LonLat;
pub use crate::geo::viewport::{ViewState, Viewport};
pub use crate::nav::controller::{
    DateFilter, DetailState, Effects, NavigationController, Phase,
};
pub use crate::record::device::{
    DeviceStatus, HazardType, RoadPath, Severity, SimulatedDevice,
};
pub use crate::record::scan::ScanItem;
pub use crate::remote::gate::{RequestGate, RequestToken};
pub use crate::remote::protocol::{FetchError, ListQuery};
