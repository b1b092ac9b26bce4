//! Core domain logic for the RoadScan monitoring platform.
//!
//! The modules hold everything the dashboard binaries share: the scan/device
//! record model, coordinate and timestamp utilities, the navigation/playback
//! controller, the movement interpolator, zoom-dependent map-layer builders,
//! and the wire protocol spoken between the visualizer and the scan bridge.
//! Nothing in this crate performs I/O; timers and network calls live in the
//! binaries and feed their results back through the types defined here.

pub mod analytics;
pub mod config;
pub mod geo;
pub mod layers;
pub mod nav;
pub mod prelude;
pub mod record;
pub mod remote;
pub mod sim;
pub mod telemetry;

pub use prelude::{Effects, NavigationController, ScanItem, ViewState};
