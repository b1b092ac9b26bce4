pub mod coords;
pub mod time;
pub mod viewport;

pub use coords::{CoordField, LonLat};
pub use viewport::{ViewState, Viewport};
