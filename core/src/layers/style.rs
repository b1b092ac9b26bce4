//! Marker palette and animation constants shared by the layer builders.

pub type Rgba = [u8; 4];

/// Zoom strictly above this renders individual points; at or below it the
/// trajectory line mode is used. Single hysteresis-free cutover.
pub const POINT_MODE_MIN_ZOOM: f64 = 13.000_01;

pub const REGULAR_FILL: Rgba = [34, 197, 94, 180];
pub const REGULAR_OUTLINE: Rgba = [34, 197, 94, 100];
pub const REGULAR_RADIUS: f32 = 4.0;

pub const SELECTED_FILL: Rgba = [239, 68, 68, 255];
pub const SELECTED_OUTLINE: Rgba = [255, 255, 255, 200];
pub const SELECTED_RADIUS: f32 = 8.0;
pub const GLOW_FILL: Rgba = [239, 68, 68, 50];

pub const SEGMENT_REGULAR: Rgba = [34, 197, 94, 120];
pub const SEGMENT_SELECTED: Rgba = [239, 68, 68, 200];
pub const SEGMENT_WIDTH: f32 = 3.0;

pub const KEY_POINT_OUTLINE: Rgba = [255, 255, 255, 180];
/// Line mode down-samples to roughly this many key-point markers.
pub const KEY_POINT_TARGET: usize = 20;

pub const LABEL_COLOR: Rgba = [255, 255, 255, 220];
pub const LABEL_BACKGROUND: Rgba = [0, 0, 0, 160];
pub const LABEL_SIZE: f32 = 12.0;

pub const MARKER_TRANSITION_MS: u64 = 800;
pub const COLOR_TRANSITION_MS: u64 = 400;

pub const TRAIL_WIDTH: f32 = 2.0;
pub const HEADING_TICK_DEG: f64 = 0.0006;
