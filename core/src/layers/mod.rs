pub mod builder;
pub mod style;

pub use builder::{
    build_fleet_layers, build_scan_layers, render_mode, Label, LineLayer, MapLayer, PointLayer,
    PointMarker, RenderMode, Segment, Transition,
};
