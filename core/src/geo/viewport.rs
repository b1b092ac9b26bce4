use crate::geo::coords::LonLat;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Default camera center and zoom used before any record is focused.
pub const DEFAULT_CENTER: LonLat = LonLat {
    lon: -122.03415,
    lat: 47.369821,
};
pub const DEFAULT_ZOOM: f64 = 11.0;
pub const DEFAULT_PITCH: f64 = 45.0;

/// Navigation never zooms below this level when centering on a record.
pub const MIN_FOCUS_ZOOM: f64 = 15.0;
pub const MAP_TRANSITION_MS: u64 = 1200;

const TILE_SIZE: f64 = 256.0;

/// Camera descriptor for the map view. Owned by the navigation controller;
/// direct user interaction overwrites it without running navigation logic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_ms: Option<u64>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            longitude: DEFAULT_CENTER.lon,
            latitude: DEFAULT_CENTER.lat,
            zoom: DEFAULT_ZOOM,
            pitch: DEFAULT_PITCH,
            bearing: 0.0,
            transition_ms: None,
        }
    }
}

impl ViewState {
    pub fn center(&self) -> LonLat {
        LonLat::new(self.longitude, self.latitude)
    }

    /// Re-centers on a target, raising zoom to the focused minimum but never
    /// lowering it, with a bounded transition.
    pub fn focus_on(&self, target: LonLat) -> ViewState {
        ViewState {
            longitude: target.lon,
            latitude: target.lat,
            zoom: self.zoom.max(MIN_FOCUS_ZOOM),
            transition_ms: Some(MAP_TRANSITION_MS),
            ..*self
        }
    }

    /// The same camera with any pending transition cleared.
    pub fn settled(mut self) -> ViewState {
        self.transition_ms = None;
        self
    }
}

/// Screen-space mapping of a camera over a canvas of known size, using the
/// Web Mercator projection.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub view: ViewState,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(view: ViewState, width: f64, height: f64) -> Self {
        Self {
            view,
            width,
            height,
        }
    }

    fn world_scale(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.view.zoom)
    }

    fn to_world(point: LonLat) -> (f64, f64) {
        let x = (point.lon + 180.0) / 360.0;
        let lat_rad = point.lat.to_radians();
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
        (x, y)
    }

    /// Projects a geographic position to canvas pixel coordinates.
    pub fn project(&self, point: LonLat) -> (f64, f64) {
        let scale = self.world_scale();
        let (wx, wy) = Self::to_world(point);
        let (cx, cy) = Self::to_world(self.view.center());
        (
            self.width / 2.0 + (wx - cx) * scale,
            self.height / 2.0 + (wy - cy) * scale,
        )
    }

    /// Inverse of [`Viewport::project`], for hit-testing and drag panning.
    pub fn unproject(&self, x: f64, y: f64) -> LonLat {
        let scale = self.world_scale();
        let (cx, cy) = Self::to_world(self.view.center());
        let wx = cx + (x - self.width / 2.0) / scale;
        let wy = cy + (y - self.height / 2.0) / scale;
        let lon = wx * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * wy)).sinh().atan().to_degrees();
        LonLat::new(lon, lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_never_lowers_zoom() {
        let mut view = ViewState::default();
        view.zoom = 16.5;
        let focused = view.focus_on(LonLat::new(10.0, 20.0));
        assert_eq!(focused.zoom, 16.5);

        view.zoom = 11.0;
        let focused = view.focus_on(LonLat::new(10.0, 20.0));
        assert_eq!(focused.zoom, MIN_FOCUS_ZOOM);
        assert_eq!(focused.transition_ms, Some(MAP_TRANSITION_MS));
    }

    #[test]
    fn center_projects_to_canvas_middle() {
        let viewport = Viewport::new(ViewState::default(), 800.0, 600.0);
        let (x, y) = viewport.project(viewport.view.center());
        assert!((x - 400.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
    }

    #[test]
    fn unproject_inverts_project() {
        let viewport = Viewport::new(ViewState::default(), 800.0, 600.0);
        let point = LonLat::new(-122.01, 47.36);
        let (x, y) = viewport.project(point);
        let back = viewport.unproject(x, y);
        assert!((back.lon - point.lon).abs() < 1e-9);
        assert!((back.lat - point.lat).abs() < 1e-9);
    }
}
