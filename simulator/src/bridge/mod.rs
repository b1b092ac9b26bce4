pub mod server;

pub use server::{BridgeState, ScanBridge};
