use crate::geo::coords::LonLat;
use crate::geo::time;
use crate::layers::style::{self, Rgba};
use crate::record::device::SimulatedDevice;
use crate::record::scan::ScanItem;
use chrono::NaiveDateTime;

/// Animation durations a renderer should apply between successive builds.
/// Line-segment geometry is allowed to snap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub position_ms: u64,
    pub color_ms: u64,
    pub radius_ms: u64,
}

impl Transition {
    pub fn marker() -> Self {
        Self {
            position_ms: style::MARKER_TRANSITION_MS,
            color_ms: style::COLOR_TRANSITION_MS,
            radius_ms: style::COLOR_TRANSITION_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointMarker {
    pub id: Option<String>,
    pub position: LonLat,
    pub fill: Rgba,
    pub radius: f32,
    pub outline: Option<(Rgba, f32)>,
    pub pickable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLayer {
    pub id: &'static str,
    pub markers: Vec<PointMarker>,
    pub transition: Option<Transition>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: LonLat,
    pub to: LonLat,
    pub color: Rgba,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayer {
    pub id: &'static str,
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub id: &'static str,
    pub position: LonLat,
    pub text: String,
    pub color: Rgba,
    pub background: Rgba,
    pub size: f32,
}

/// One drawable unit; renderers draw layers in list order, first at the
/// bottom.
#[derive(Debug, Clone, PartialEq)]
pub enum MapLayer {
    Points(PointLayer),
    Lines(LineLayer),
    Label(Label),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Point,
    Line,
}

/// Mode is purely a function of current zoom, recomputed per viewport change.
pub fn render_mode(zoom: f64) -> RenderMode {
    if zoom > style::POINT_MODE_MIN_ZOOM {
        RenderMode::Point
    } else {
        RenderMode::Line
    }
}

/// Builds the drawable layers for the valid scan list at the given zoom.
///
/// Point mode renders every record individually with the selection
/// emphasized; line mode favors trajectory legibility, connecting the
/// time-ordered records and down-sampling to key-point markers.
pub fn build_scan_layers(
    items: &[ScanItem],
    selected_id: Option<&str>,
    zoom: f64,
) -> Vec<MapLayer> {
    if items.is_empty() {
        return Vec::new();
    }

    match render_mode(zoom) {
        RenderMode::Point => point_mode_layers(items, selected_id),
        RenderMode::Line => line_mode_layers(items, selected_id),
    }
}

fn is_selected(item: &ScanItem, selected_id: Option<&str>) -> bool {
    selected_id.is_some() && item.scan_id.as_deref() == selected_id
}

fn point_mode_layers(items: &[ScanItem], selected_id: Option<&str>) -> Vec<MapLayer> {
    let mut layers = Vec::new();

    let regular: Vec<PointMarker> = items
        .iter()
        .filter(|item| !is_selected(item, selected_id))
        .filter_map(|item| {
            let position = item.map_position()?;
            Some(PointMarker {
                id: item.scan_id.clone(),
                position,
                fill: style::REGULAR_FILL,
                radius: style::REGULAR_RADIUS,
                outline: Some((style::REGULAR_OUTLINE, 1.0)),
                pickable: true,
            })
        })
        .collect();
    if !regular.is_empty() {
        layers.push(MapLayer::Points(PointLayer {
            id: "points-regular",
            markers: regular,
            transition: Some(Transition::marker()),
        }));
    }

    let selected = items.iter().find(|item| is_selected(item, selected_id));
    if let Some(item) = selected {
        if let Some(position) = item.map_position() {
            // Glow halo first so it draws beneath the selected marker.
            layers.push(MapLayer::Points(PointLayer {
                id: "points-selected-glow",
                markers: vec![PointMarker {
                    id: None,
                    position,
                    fill: style::GLOW_FILL,
                    radius: style::SELECTED_RADIUS * 2.0,
                    outline: None,
                    pickable: false,
                }],
                transition: Some(Transition::marker()),
            }));
            layers.push(MapLayer::Points(PointLayer {
                id: "points-selected",
                markers: vec![PointMarker {
                    id: item.scan_id.clone(),
                    position,
                    fill: style::SELECTED_FILL,
                    radius: style::SELECTED_RADIUS,
                    outline: Some((style::SELECTED_OUTLINE, 2.0)),
                    pickable: true,
                }],
                transition: Some(Transition::marker()),
            }));
            layers.push(MapLayer::Label(Label {
                id: "selected-label",
                position,
                text: time::display_capture(item.capture_dt.as_deref()),
                color: style::LABEL_COLOR,
                background: style::LABEL_BACKGROUND,
                size: style::LABEL_SIZE,
            }));
        }
    }

    layers
}

fn line_mode_layers(items: &[ScanItem], selected_id: Option<&str>) -> Vec<MapLayer> {
    let mut sorted: Vec<&ScanItem> = items.iter().collect();
    sorted.sort_by_key(|item| item.capture_time().unwrap_or(NaiveDateTime::MIN));

    let mut layers = Vec::new();

    if sorted.len() > 1 {
        let mut segments = Vec::with_capacity(sorted.len() - 1);
        for pair in sorted.windows(2) {
            let (Some(from), Some(to)) = (pair[0].map_position(), pair[1].map_position()) else {
                continue;
            };
            let adjacent_to_selection =
                is_selected(pair[0], selected_id) || is_selected(pair[1], selected_id);
            segments.push(Segment {
                from,
                to,
                color: if adjacent_to_selection {
                    style::SEGMENT_SELECTED
                } else {
                    style::SEGMENT_REGULAR
                },
                width: style::SEGMENT_WIDTH,
            });
        }
        if !segments.is_empty() {
            layers.push(MapLayer::Lines(LineLayer {
                id: "trajectory",
                segments,
            }));
        }
    }

    let step = (sorted.len() / style::KEY_POINT_TARGET).max(1);
    let key_points: Vec<PointMarker> = sorted
        .iter()
        .enumerate()
        .filter(|(i, _)| i % step == 0)
        .filter_map(|(_, &item)| {
            let position = item.map_position()?;
            let selected = is_selected(item, selected_id);
            Some(PointMarker {
                id: item.scan_id.clone(),
                position,
                fill: if selected {
                    style::SELECTED_FILL
                } else {
                    style::REGULAR_FILL
                },
                radius: if selected {
                    (style::SELECTED_RADIUS - 1.0).max(6.0)
                } else {
                    (style::REGULAR_RADIUS - 1.0).max(3.0)
                },
                outline: Some((style::KEY_POINT_OUTLINE, 1.0)),
                pickable: true,
            })
        })
        .collect();
    if !key_points.is_empty() {
        layers.push(MapLayer::Points(PointLayer {
            id: "key-points",
            markers: key_points,
            transition: None,
        }));
    }

    layers
}

/// Builds drawable layers for the simulated fleet: optional fading trails,
/// severity-colored markers, and a short heading tick per active device.
pub fn build_fleet_layers(fleet: &[SimulatedDevice], show_trails: bool) -> Vec<MapLayer> {
    let mut layers = Vec::new();

    if show_trails {
        let mut segments = Vec::new();
        for device in fleet.iter().filter(|d| d.is_active()) {
            let trail: Vec<LonLat> = device.trail.iter().copied().collect();
            let steps = trail.len().saturating_sub(1);
            for (i, pair) in trail.windows(2).enumerate() {
                let [r, g, b] = device.level.color();
                // Older segments fade out toward the tail.
                let alpha = (40 + (i + 1) * 160 / steps.max(1)) as u8;
                segments.push(Segment {
                    from: pair[0],
                    to: pair[1],
                    color: [r, g, b, alpha],
                    width: style::TRAIL_WIDTH,
                });
            }
        }
        if !segments.is_empty() {
            layers.push(MapLayer::Lines(LineLayer {
                id: "fleet-trails",
                segments,
            }));
        }
    }

    let mut heading_ticks = Vec::new();
    let markers: Vec<PointMarker> = fleet
        .iter()
        .map(|device| {
            let [r, g, b] = device.level.color();
            let alpha = if device.is_active() { 230 } else { 90 };
            if device.is_active() {
                let heading = device.heading_deg.to_radians();
                heading_ticks.push(Segment {
                    from: device.position,
                    to: LonLat::new(
                        device.position.lon + heading.cos() * style::HEADING_TICK_DEG,
                        device.position.lat + heading.sin() * style::HEADING_TICK_DEG,
                    ),
                    color: [255, 255, 255, 170],
                    width: 1.5,
                });
            }
            PointMarker {
                id: Some(device.device_id.clone()),
                position: device.position,
                fill: [r, g, b, alpha],
                radius: 3.0 + (device.value / 25.0) as f32,
                outline: Some(([255, 255, 255, 120], 1.0)),
                pickable: false,
            }
        })
        .collect();

    if !heading_ticks.is_empty() {
        layers.push(MapLayer::Lines(LineLayer {
            id: "fleet-headings",
            segments: heading_ticks,
        }));
    }
    if !markers.is_empty() {
        layers.push(MapLayer::Points(PointLayer {
            id: "fleet-markers",
            markers,
            transition: Some(Transition::marker()),
        }));
    }

    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::coords::CoordField;
    use crate::record::device::tests::test_device;

    fn scan(id: &str, minute: u32, lon: f64, lat: f64) -> ScanItem {
        ScanItem {
            scan_id: Some(id.into()),
            capture_dt: Some(format!("2025-07-20T10:{minute:02}:00")),
            lot: Some(CoordField::Number(lon)),
            lat: Some(CoordField::Number(lat)),
            ..Default::default()
        }
    }

    fn items(count: usize) -> Vec<ScanItem> {
        (0..count)
            .map(|i| {
                scan(
                    &format!("s{i}"),
                    i as u32 % 60,
                    126.9 + i as f64 * 0.001,
                    37.5,
                )
            })
            .collect()
    }

    #[test]
    fn zoom_above_cutover_selects_point_mode() {
        assert_eq!(render_mode(13.5), RenderMode::Point);
        assert_eq!(render_mode(12.0), RenderMode::Line);
        assert_eq!(render_mode(style::POINT_MODE_MIN_ZOOM), RenderMode::Line);
    }

    #[test]
    fn point_mode_emits_glow_beneath_selection_and_a_label() {
        let layers = build_scan_layers(&items(5), Some("s2"), 14.0);
        let ids: Vec<&str> = layers
            .iter()
            .map(|layer| match layer {
                MapLayer::Points(p) => p.id,
                MapLayer::Lines(l) => l.id,
                MapLayer::Label(l) => l.id,
            })
            .collect();
        assert_eq!(
            ids,
            vec![
                "points-regular",
                "points-selected-glow",
                "points-selected",
                "selected-label"
            ]
        );

        let MapLayer::Points(regular) = &layers[0] else {
            panic!("expected point layer");
        };
        assert_eq!(regular.markers.len(), 4);
    }

    #[test]
    fn line_mode_connects_records_and_downsamples_key_points() {
        let layers = build_scan_layers(&items(100), Some("s10"), 12.0);
        let MapLayer::Lines(lines) = &layers[0] else {
            panic!("expected line layer");
        };
        assert_eq!(lines.segments.len(), 99);
        let highlighted = lines
            .segments
            .iter()
            .filter(|s| s.color == style::SEGMENT_SELECTED)
            .count();
        assert_eq!(highlighted, 2);

        let MapLayer::Points(keys) = &layers[1] else {
            panic!("expected key-point layer");
        };
        assert_eq!(keys.markers.len(), 20);
        assert!(keys.transition.is_none());
    }

    #[test]
    fn small_lists_keep_every_key_point() {
        let layers = build_scan_layers(&items(7), None, 11.0);
        let MapLayer::Points(keys) = layers.last().unwrap() else {
            panic!("expected key-point layer");
        };
        assert_eq!(keys.markers.len(), 7);
    }

    #[test]
    fn empty_input_builds_no_layers() {
        assert!(build_scan_layers(&[], None, 14.0).is_empty());
    }

    #[test]
    fn fleet_layers_include_trails_only_when_enabled() {
        let mut device = test_device(1);
        device.push_trail(LonLat::new(0.001, 0.0), 10);
        device.push_trail(LonLat::new(0.002, 0.0), 10);
        let fleet = vec![device];

        let with_trails = build_fleet_layers(&fleet, true);
        assert!(with_trails
            .iter()
            .any(|l| matches!(l, MapLayer::Lines(lines) if lines.id == "fleet-trails")));

        let without = build_fleet_layers(&fleet, false);
        assert!(!without
            .iter()
            .any(|l| matches!(l, MapLayer::Lines(lines) if lines.id == "fleet-trails")));
    }
}
