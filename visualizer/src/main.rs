use iced::{
    keyboard::{self, key::Named, Key, Modifiers},
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, image, row, scrollable, text, Column, Container,
    },
    Alignment, Color, Element, Event, Length, Point, Rectangle, Renderer, Subscription, Task,
    Theme,
};
use scancore::analytics::{build_chart_data, group_by_date, FleetFilter, FleetStats};
use scancore::config::{ApiConfig, DEFAULT_LIST_LIMIT};
use scancore::geo::coords::LonLat;
use scancore::geo::time::display_capture;
use scancore::geo::viewport::{ViewState, Viewport};
use scancore::layers::{build_fleet_layers, build_scan_layers, MapLayer, Transition};
use scancore::nav::controller::{
    DateFilter, DetailState, Effects, NavigationController, Phase,
};
use scancore::record::device::{HazardType, Severity, SimulatedDevice};
use scancore::record::scan::ScanItem;
use scancore::remote::gate::{RequestGate, RequestToken};
use scancore::remote::protocol::{sort_by_capture, FetchError, ListData, ListResponse};
use scancore::telemetry::metrics::DashboardMetrics;
use std::collections::HashMap;
use std::time::{Duration, Instant};

fn main() -> iced::Result {
    iced::application(Dashboard::boot, Dashboard::update, Dashboard::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Dashboard) -> String {
    "RoadScan Dashboard".into()
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}

fn application_subscription(state: &Dashboard) -> Subscription<Message> {
    let mut subscriptions = vec![keyboard::listen().filter_map(|event| match event {
        keyboard::Event::KeyPressed { key, modifiers, .. } => handle_key(key, modifiers),
        _ => None,
    })];

    if state.config.is_some() {
        subscriptions.push(time::every(Duration::from_secs(1)).map(|_| Message::FleetTick));
    }

    // The playback timer is derived from controller state, so a speed or
    // playing change replaces it; two timers are never live at once.
    if let Some(period) = state.controller.playback_period() {
        subscriptions.push(time::every(period).map(|_| Message::PlaybackTick));
    }

    if state.camera.is_animating() || state.animator.is_animating(Instant::now()) {
        subscriptions.push(time::every(Duration::from_millis(50)).map(|_| Message::AnimationTick));
    }

    Subscription::batch(subscriptions)
}

fn handle_key(key: Key, _modifiers: Modifiers) -> Option<Message> {
    match key.as_ref() {
        Key::Named(Named::ArrowLeft) => Some(Message::Previous),
        Key::Named(Named::ArrowRight) => Some(Message::Next),
        Key::Named(Named::Space) => Some(Message::TogglePlay),
        Key::Named(Named::Escape) => Some(Message::CloseDetail),
        _ => None,
    }
}

const SPEED_STEPS: [f64; 4] = [0.5, 1.0, 2.0, 4.0];
const MIN_ZOOM: f64 = 2.0;
const MAX_ZOOM: f64 = 20.0;

#[derive(Debug, Clone)]
enum Message {
    ListFetched(RequestToken, Result<ListData, FetchError>),
    Reload,
    DetailFetched(String, Result<ScanItem, FetchError>),
    ImageFetched(String, Result<image::Handle, String>),
    FleetTick,
    FleetFetched(Result<Vec<SimulatedDevice>, FetchError>),
    PlaybackTick,
    AnimationTick,
    Previous,
    Next,
    TogglePlay,
    CycleSpeed,
    CloseDetail,
    DateSelected(DateFilter),
    CycleHazardFilter,
    CycleSeverityFilter,
    ToggleTrails,
    MarkerClicked(String),
    CameraChanged(ViewState),
}

#[derive(Debug, Clone, Default)]
enum ImageState {
    #[default]
    None,
    Loading(String),
    Ready(image::Handle),
    Failed(String),
}

struct Dashboard {
    config: Option<ApiConfig>,
    controller: NavigationController,
    fleet: Vec<SimulatedDevice>,
    fleet_filter: FleetFilter,
    show_trails: bool,
    list_gate: RequestGate,
    list_loading: bool,
    list_error: Option<String>,
    list_total: usize,
    detail_image: ImageState,
    camera: CameraAnimation,
    animator: MarkerAnimator,
    metrics: DashboardMetrics,
    status: String,
}

impl Dashboard {
    fn empty(status: String) -> Self {
        let view = ViewState::default();
        Self {
            config: None,
            controller: NavigationController::new(view),
            fleet: Vec::new(),
            fleet_filter: FleetFilter::default(),
            show_trails: true,
            list_gate: RequestGate::new(),
            list_loading: false,
            list_error: None,
            list_total: 0,
            detail_image: ImageState::None,
            camera: CameraAnimation::new(view),
            animator: MarkerAnimator::new(),
            metrics: DashboardMetrics::new(),
            status,
        }
    }

    fn boot() -> (Self, Task<Message>) {
        match ApiConfig::from_env() {
            Ok(config) => {
                let mut dashboard = Dashboard::empty("Fetching scan history...".into());
                dashboard.config = Some(config.clone());
                let token = dashboard.list_gate.issue();
                dashboard.list_loading = true;
                dashboard.metrics.record_list_fetch();
                (
                    dashboard,
                    Task::perform(fetch_scan_list(config), move |result| {
                        Message::ListFetched(token, result)
                    }),
                )
            }
            Err(error) => (
                Dashboard::empty(format!("Configuration error: {error}")),
                Task::none(),
            ),
        }
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::ListFetched(token, result) => {
                if !state.list_gate.admits(token) {
                    // A newer fetch superseded this one; its late result is
                    // discarded rather than applied.
                    return Task::none();
                }
                state.list_loading = false;
                match result {
                    Ok(data) => {
                        state.list_total = data.total;
                        state.list_error = None;
                        state.status = format!(
                            "Loaded {} of {} scan records",
                            data.count, data.total
                        );
                        state.detail_image = ImageState::None;
                        let effects = state.controller.set_items(data.items);
                        state.camera.follow(state.controller.view());
                        state.perform_effects(effects)
                    }
                    Err(error) if error.is_cancellation() => Task::none(),
                    Err(error) => {
                        state.metrics.record_error();
                        state.list_error = Some(error.to_string());
                        state.status = "Scan history unavailable".into();
                        Task::none()
                    }
                }
            }
            Message::Reload => {
                let Some(config) = state.config.clone() else {
                    return Task::none();
                };
                let token = state.list_gate.issue();
                state.list_loading = true;
                state.list_error = None;
                state.metrics.record_list_fetch();
                Task::perform(fetch_scan_list(config), move |result| {
                    Message::ListFetched(token, result)
                })
            }
            Message::DetailFetched(id, result) => {
                if let Err(error) = &result {
                    if !error.is_cancellation() {
                        state.metrics.record_error();
                    }
                }
                let image_file = result
                    .as_ref()
                    .ok()
                    .and_then(|item| item.road_img_file_nm.clone());
                state.controller.apply_detail(&id, result);

                if matches!(state.controller.detail(), DetailState::Loaded(_)) {
                    if let (Some(config), Some(file)) = (state.config.clone(), image_file) {
                        let url = config.image_url(&file);
                        state.detail_image = ImageState::Loading(url.clone());
                        let url_for_message = url.clone();
                        return Task::perform(fetch_image(url), move |result| {
                            Message::ImageFetched(url_for_message.clone(), result)
                        });
                    }
                    state.detail_image = ImageState::None;
                }
                Task::none()
            }
            Message::ImageFetched(url, result) => {
                let expected = matches!(&state.detail_image, ImageState::Loading(pending) if *pending == url);
                if expected {
                    state.detail_image = match result {
                        Ok(handle) => ImageState::Ready(handle),
                        // Broken images degrade to a placeholder, nothing
                        // else in the view is affected.
                        Err(reason) => ImageState::Failed(reason),
                    };
                }
                Task::none()
            }
            Message::FleetTick => {
                let Some(config) = state.config.clone() else {
                    return Task::none();
                };
                Task::perform(fetch_fleet(config), Message::FleetFetched)
            }
            Message::FleetFetched(result) => {
                match result {
                    Ok(fleet) => {
                        state.metrics.record_tick();
                        let duration =
                            Duration::from_millis(Transition::marker().position_ms);
                        for device in &fleet {
                            state.animator.retarget(
                                &device.device_id,
                                device.position,
                                duration,
                            );
                        }
                        state
                            .animator
                            .retain(fleet.iter().map(|d| d.device_id.as_str()));
                        state.fleet = fleet;
                    }
                    Err(error) => {
                        state.metrics.record_error();
                        state.status = format!("Fleet poll failed: {error}");
                    }
                }
                Task::none()
            }
            Message::PlaybackTick => {
                let effects = state.controller.go_next();
                state.camera.follow(state.controller.view());
                state.perform_effects(effects)
            }
            Message::AnimationTick => {
                state.camera.tick(Instant::now());
                Task::none()
            }
            Message::Previous => {
                let effects = state.controller.go_previous();
                state.camera.follow(state.controller.view());
                state.perform_effects(effects)
            }
            Message::Next => {
                let effects = state.controller.go_next();
                state.camera.follow(state.controller.view());
                state.perform_effects(effects)
            }
            Message::TogglePlay => {
                state.controller.toggle_play();
                Task::none()
            }
            Message::CycleSpeed => {
                let current = state.controller.speed();
                let position = SPEED_STEPS
                    .iter()
                    .position(|s| (s - current).abs() < f64::EPSILON)
                    .unwrap_or(1);
                let next = SPEED_STEPS[(position + 1) % SPEED_STEPS.len()];
                state.controller.set_speed(next);
                Task::none()
            }
            Message::CloseDetail => {
                state.controller.close_detail();
                state.detail_image = ImageState::None;
                Task::none()
            }
            Message::DateSelected(filter) => {
                state.detail_image = ImageState::None;
                let effects = state.controller.set_date_filter(filter);
                state.camera.follow(state.controller.view());
                state.perform_effects(effects)
            }
            Message::CycleHazardFilter => {
                state.fleet_filter.hazard_type =
                    cycle_option(state.fleet_filter.hazard_type, &HazardType::ALL);
                Task::none()
            }
            Message::CycleSeverityFilter => {
                state.fleet_filter.severity =
                    cycle_option(state.fleet_filter.severity, &Severity::ALL);
                Task::none()
            }
            Message::ToggleTrails => {
                state.show_trails = !state.show_trails;
                Task::none()
            }
            Message::MarkerClicked(id) => {
                let effects = state.controller.on_marker_clicked(&id);
                state.camera.follow(state.controller.view());
                state.perform_effects(effects)
            }
            Message::CameraChanged(view) => {
                state.controller.set_view(view);
                state.camera.jump(view);
                Task::none()
            }
        }
    }

    fn perform_effects(&mut self, effects: Effects) -> Task<Message> {
        let Some(id) = effects.fetch_detail else {
            return Task::none();
        };
        let Some(config) = self.config.clone() else {
            return Task::none();
        };
        self.metrics.record_detail_fetch();
        self.detail_image = ImageState::None;
        let id_for_message = id.clone();
        Task::perform(fetch_scan_detail(config, id), move |result| {
            Message::DetailFetched(id_for_message.clone(), result)
        })
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let map = Canvas::new(MapCanvas {
            layers: state.display_layers(),
            view: state.camera.current(),
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let mut layout = row![
            state.side_panel(),
            column![map, state.navigation_controls()]
                .spacing(8)
                .width(Length::Fill),
        ]
        .spacing(12)
        .align_y(Alignment::Start)
        .padding(12);

        if !matches!(state.controller.detail(), DetailState::Idle) {
            layout = layout.push(state.detail_panel());
        }

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Current drawable layers: time-ordered scans beneath the live fleet,
    /// with animated positions applied to layers that declare transitions.
    fn display_layers(&self) -> Vec<MapLayer> {
        let now = Instant::now();
        let filtered_fleet = self.fleet_filter.apply(&self.fleet);
        let mut layers = build_scan_layers(
            self.controller.valid_items(),
            self.controller.selected_id(),
            self.camera.current().zoom,
        );
        layers.extend(build_fleet_layers(&filtered_fleet, self.show_trails));

        layers
            .into_iter()
            .map(|layer| match layer {
                MapLayer::Points(mut points) if points.transition.is_some() => {
                    for marker in &mut points.markers {
                        if let Some(id) = &marker.id {
                            if let Some(position) = self.animator.displayed(id, now) {
                                marker.position = position;
                            }
                        }
                    }
                    MapLayer::Points(points)
                }
                other => other,
            })
            .collect()
    }

    fn side_panel(&self) -> Element<'_, Message> {
        let filtered = self.fleet_filter.apply(&self.fleet);
        let stats = FleetStats::compute(&filtered);
        let charts = build_chart_data(&filtered, &self.fleet);
        let snapshot = self.metrics.snapshot();

        let mut status_column = column![
            text("RoadScan").size(26),
            text(&self.status).size(14),
        ]
        .spacing(6);
        if self.list_loading {
            status_column = status_column.push(text("Loading scan history...").size(12));
        }
        if let Some(error) = &self.list_error {
            status_column = status_column
                .push(text(format!("Error: {error}")).size(12))
                .push(button("Reload").on_press(Message::Reload).padding(6));
        }
        status_column = status_column.push(
            text(format!(
                "{} records · {} mappable · {}",
                self.list_total,
                self.controller.valid_items().len(),
                phase_label(self.controller.phase()),
            ))
            .size(12),
        );
        status_column = status_column.push(
            text(format!(
                "fetches {}+{} · ticks {} · errors {}",
                snapshot.list_fetches,
                snapshot.detail_fetches,
                snapshot.ticks,
                snapshot.errors
            ))
            .size(11),
        );

        let date_list = self.date_filter_panel();

        let filter_row = column![
            text("Fleet filters").size(16),
            row![
                button(text(format!(
                    "Type: {}",
                    self.fleet_filter
                        .hazard_type
                        .map(|t| t.label())
                        .unwrap_or("all")
                )).size(12))
                .on_press(Message::CycleHazardFilter)
                .padding(6),
                button(text(format!(
                    "Severity: {}",
                    self.fleet_filter
                        .severity
                        .map(|s| s.label())
                        .unwrap_or("all")
                )).size(12))
                .on_press(Message::CycleSeverityFilter)
                .padding(6),
                button(
                    text(if self.show_trails { "Trails: on" } else { "Trails: off" }).size(12)
                )
                .on_press(Message::ToggleTrails)
                .padding(6),
            ]
            .spacing(6),
        ]
        .spacing(6);

        let stats_block = column![
            text("Fleet status").size(16),
            text(format!(
                "active {} · high {} · avg severity {} · avg speed {}",
                stats.active, stats.high, stats.avg_value, stats.avg_speed
            ))
            .size(12),
        ]
        .spacing(4);

        let mut pie_lines = Column::new().spacing(2);
        for slice in &charts.pie {
            pie_lines = pie_lines.push(text(format!("{} — {}", slice.name, slice.value)).size(11));
        }

        let mut source_lines = Column::new().spacing(2);
        for bucket in charts.sources.iter().filter(|b| b.count > 0) {
            source_lines = source_lines.push(
                text(format!(
                    "{} — {} (avg {})",
                    bucket.name, bucket.count, bucket.avg_severity
                ))
                .size(11),
            );
        }

        let trend = charts
            .time_series
            .last()
            .map(|point| {
                format!(
                    "last {} samples: high {} · medium {} · low {}",
                    charts.time_series.len(),
                    point.high,
                    point.medium,
                    point.low
                )
            })
            .unwrap_or_else(|| "no samples yet".to_string());

        let panel = column![
            status_column,
            date_list,
            filter_row,
            stats_block,
            text("Hazards by type").size(16),
            pie_lines,
            text("By source").size(16),
            source_lines,
            text("Trend").size(16),
            text(trend).size(11),
        ]
        .spacing(12)
        .padding(12)
        .width(Length::Fixed(340.0));

        scrollable(panel).height(Length::Fill).into()
    }

    fn date_filter_panel(&self) -> Element<'_, Message> {
        let groups = group_by_date(self.controller.items());
        let selected = self.controller.date_filter();

        let all_label = if selected == DateFilter::All {
            "• All dates".to_string()
        } else {
            "All dates".to_string()
        };
        let mut list = Column::new().spacing(4).push(
            button(text(all_label).size(12))
                .on_press(Message::DateSelected(DateFilter::All))
                .padding(6),
        );
        for group in &groups {
            let active = selected == DateFilter::Day(group.date);
            let label = format!(
                "{}{} ({})",
                if active { "• " } else { "" },
                group.label,
                group.items.len()
            );
            list = list.push(
                button(text(label).size(12))
                    .on_press(Message::DateSelected(DateFilter::Day(group.date)))
                    .padding(6),
            );
        }

        column![text("Capture dates").size(16), list]
            .spacing(6)
            .into()
    }

    fn navigation_controls(&self) -> Element<'_, Message> {
        let total = self.controller.valid_items().len();
        let position = if total == 0 {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.controller.current_index() + 1, total)
        };
        let play_label = if self.controller.is_playing() {
            "Pause"
        } else {
            "Play"
        };

        row![
            button(text("Prev").size(14))
                .on_press(Message::Previous)
                .padding(8),
            button(text(play_label).size(14))
                .on_press(Message::TogglePlay)
                .padding(8),
            button(text("Next").size(14))
                .on_press(Message::Next)
                .padding(8),
            button(text(format!("Speed x{}", self.controller.speed())).size(14))
                .on_press(Message::CycleSpeed)
                .padding(8),
            text(position).size(14),
        ]
        .spacing(10)
        .align_y(Alignment::Center)
        .padding(6)
        .into()
    }

    fn detail_panel(&self) -> Element<'_, Message> {
        let mut panel = column![
            row![
                text("Scan detail").size(18),
                button(text("Close").size(12))
                    .on_press(Message::CloseDetail)
                    .padding(6),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
        ]
        .spacing(8);

        match self.controller.detail() {
            DetailState::Idle => {}
            DetailState::Loading(id) => {
                panel = panel.push(text(format!("Loading {id}...")).size(12));
            }
            DetailState::Failed(message) => {
                panel = panel.push(text(format!("Detail unavailable: {message}")).size(12));
            }
            DetailState::Loaded(item) => {
                panel = panel.push(
                    text(format!(
                        "id: {}",
                        item.scan_id.as_deref().unwrap_or("-")
                    ))
                    .size(12),
                );
                panel = panel.push(
                    text(format!(
                        "captured: {}",
                        display_capture(item.capture_dt.as_deref())
                    ))
                    .size(12),
                );
                panel = panel.push(
                    text(format!("device: {}", item.dvc_id.as_deref().unwrap_or("-"))).size(12),
                );
                if let Some(position) = item.coordinates() {
                    panel = panel.push(
                        text(format!("position: {:.5}, {:.5}", position.lon, position.lat))
                            .size(12),
                    );
                }
                match &self.detail_image {
                    ImageState::Ready(handle) => {
                        panel = panel.push(
                            image(handle.clone()).width(Length::Fixed(280.0)),
                        );
                    }
                    ImageState::Loading(_) => {
                        panel = panel.push(text("Loading image...").size(12));
                    }
                    ImageState::Failed(_) => {
                        panel = panel.push(text("[ image unavailable ]").size(12));
                    }
                    ImageState::None => {}
                }
                if !item.extra.is_empty() {
                    let mut extras = Column::new().spacing(2);
                    for (key, value) in item.extra.iter().take(8) {
                        extras = extras.push(text(format!("{key}: {value}")).size(11));
                    }
                    panel = panel
                        .push(text("Additional fields").size(14))
                        .push(extras);
                }
            }
        }

        Container::new(scrollable(panel.padding(12)).height(Length::Fill))
            .width(Length::Fixed(320.0))
            .into()
    }
}

async fn fetch_scan_list(config: ApiConfig) -> Result<ListData, FetchError> {
    let query = config.list_query(DEFAULT_LIST_LIMIT);
    let url = query.url(&config.base_url);
    let client = reqwest::Client::new();
    let response = client
        .get(&url)
        .bearer_auth(&config.token)
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let envelope = response
        .json::<ListResponse>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))?;
    let mut data = envelope.data;
    sort_by_capture(&mut data.items);
    Ok(data)
}

async fn fetch_scan_detail(config: ApiConfig, scan_id: String) -> Result<ScanItem, FetchError> {
    let client = reqwest::Client::new();
    let response = client
        .get(config.detail_url(&scan_id))
        .bearer_auth(&config.token)
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        // The error body is stringified into the surfaced message.
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<scancore::remote::protocol::DetailResponse>()
        .await
        .map(|envelope| envelope.data)
        .map_err(|e| FetchError::Decode(e.to_string()))
}

async fn fetch_fleet(config: ApiConfig) -> Result<Vec<SimulatedDevice>, FetchError> {
    let response = reqwest::get(config.fleet_url())
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    response
        .json::<Vec<SimulatedDevice>>()
        .await
        .map_err(|e| FetchError::Decode(e.to_string()))
}

async fn fetch_image(url: String) -> Result<image::Handle, String> {
    let response = reqwest::get(&url).await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    let bytes = response.bytes().await.map_err(|e| e.to_string())?;
    Ok(image::Handle::from_bytes(bytes.to_vec()))
}

fn cycle_option<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => match all.iter().position(|v| *v == value) {
            Some(index) if index + 1 < all.len() => Some(all[index + 1]),
            _ => None,
        },
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::Browsing => "browsing",
        Phase::Playing => "playing",
    }
}

/// Eases the displayed camera toward the controller's target view so
/// navigation glides instead of snapping. Direct drags bypass it entirely.
#[derive(Debug)]
struct CameraAnimation {
    current: ViewState,
    from: ViewState,
    target: ViewState,
    started: Instant,
    duration: Duration,
}

impl CameraAnimation {
    fn new(view: ViewState) -> Self {
        let settled = view.settled();
        Self {
            current: settled,
            from: settled,
            target: settled,
            started: Instant::now(),
            duration: Duration::ZERO,
        }
    }

    fn current(&self) -> ViewState {
        self.current
    }

    fn is_animating(&self) -> bool {
        self.current != self.target
    }

    fn follow(&mut self, view: ViewState) {
        if view.settled() == self.target {
            return;
        }
        match view.transition_ms {
            Some(ms) if ms > 0 => {
                self.from = self.current;
                self.target = view.settled();
                self.started = Instant::now();
                self.duration = Duration::from_millis(ms);
            }
            _ => self.jump(view),
        }
    }

    fn jump(&mut self, view: ViewState) {
        let settled = view.settled();
        self.current = settled;
        self.from = settled;
        self.target = settled;
        self.duration = Duration::ZERO;
    }

    fn tick(&mut self, now: Instant) {
        if !self.is_animating() {
            return;
        }
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            (now - self.started).as_secs_f64() / self.duration.as_secs_f64()
        };
        let clamped = progress.clamp(0.0, 1.0);
        let eased = clamped * clamped * (3.0 - 2.0 * clamped);
        self.current = lerp_view(&self.from, &self.target, eased);
        if clamped >= 1.0 {
            self.current = self.target;
        }
    }
}

fn lerp_view(a: &ViewState, b: &ViewState, t: f64) -> ViewState {
    ViewState {
        longitude: a.longitude + (b.longitude - a.longitude) * t,
        latitude: a.latitude + (b.latitude - a.latitude) * t,
        zoom: a.zoom + (b.zoom - a.zoom) * t,
        pitch: a.pitch + (b.pitch - a.pitch) * t,
        bearing: a.bearing + (b.bearing - a.bearing) * t,
        transition_ms: None,
    }
}

/// Glides marker positions between successive fleet snapshots, using the
/// transition duration the layer builder declares.
#[derive(Debug)]
struct MarkerAnimator {
    tracks: HashMap<String, MarkerTrack>,
}

#[derive(Debug)]
struct MarkerTrack {
    from: LonLat,
    to: LonLat,
    started: Instant,
    duration: Duration,
}

impl MarkerTrack {
    fn displayed(&self, now: Instant) -> LonLat {
        if self.duration.is_zero() {
            return self.to;
        }
        let t = ((now - self.started).as_secs_f64() / self.duration.as_secs_f64())
            .clamp(0.0, 1.0);
        LonLat::new(
            self.from.lon + (self.to.lon - self.from.lon) * t,
            self.from.lat + (self.to.lat - self.from.lat) * t,
        )
    }

    fn settled(&self, now: Instant) -> bool {
        self.duration.is_zero() || now - self.started >= self.duration
    }
}

impl MarkerAnimator {
    fn new() -> Self {
        Self {
            tracks: HashMap::new(),
        }
    }

    fn retarget(&mut self, id: &str, target: LonLat, duration: Duration) {
        let now = Instant::now();
        match self.tracks.get_mut(id) {
            Some(track) => {
                if track.to != target {
                    track.from = track.displayed(now);
                    track.to = target;
                    track.started = now;
                    track.duration = duration;
                }
            }
            None => {
                // First sighting snaps into place.
                self.tracks.insert(
                    id.to_string(),
                    MarkerTrack {
                        from: target,
                        to: target,
                        started: now,
                        duration: Duration::ZERO,
                    },
                );
            }
        }
    }

    fn retain<'a>(&mut self, live: impl Iterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = live.collect();
        self.tracks.retain(|id, _| keep.contains(id.as_str()));
    }

    fn displayed(&self, id: &str, now: Instant) -> Option<LonLat> {
        self.tracks.get(id).map(|track| track.displayed(now))
    }

    fn is_animating(&self, now: Instant) -> bool {
        self.tracks.values().any(|track| !track.settled(now))
    }
}

/// Canvas program rendering the layer list over a dark base, with drag
/// panning, wheel zoom, and marker click picking.
struct MapCanvas {
    layers: Vec<MapLayer>,
    view: ViewState,
}

#[derive(Debug, Default)]
struct CanvasState {
    drag: Option<Drag>,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    anchor: Point,
    view: ViewState,
    moved: bool,
}

impl MapCanvas {
    fn hit_test(&self, viewport: &Viewport, at: Point) -> Option<String> {
        // Topmost layers win.
        for layer in self.layers.iter().rev() {
            let MapLayer::Points(points) = layer else {
                continue;
            };
            for marker in points.markers.iter().rev() {
                if !marker.pickable {
                    continue;
                }
                let Some(id) = &marker.id else { continue };
                let (x, y) = viewport.project(marker.position);
                let dx = x - at.x as f64;
                let dy = y - at.y as f64;
                let reach = (marker.radius as f64).max(6.0) + 2.0;
                if dx * dx + dy * dy <= reach * reach {
                    return Some(id.clone());
                }
            }
        }
        None
    }
}

impl canvas::Program<Message> for MapCanvas {
    type State = CanvasState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let Event::Mouse(mouse_event) = event else {
            return None;
        };
        let position = cursor.position_in(bounds);

        match mouse_event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                let at = position?;
                state.drag = Some(Drag {
                    anchor: at,
                    view: self.view,
                    moved: false,
                });
                None
            }
            mouse::Event::CursorMoved { .. } => {
                let drag = state.drag.as_mut()?;
                let at = position?;
                let dx = (at.x - drag.anchor.x) as f64;
                let dy = (at.y - drag.anchor.y) as f64;
                if dx.abs() + dy.abs() > 3.0 {
                    drag.moved = true;
                }
                if !drag.moved {
                    return None;
                }
                let viewport =
                    Viewport::new(drag.view, bounds.width as f64, bounds.height as f64);
                let center = viewport
                    .unproject(bounds.width as f64 / 2.0 - dx, bounds.height as f64 / 2.0 - dy);
                Some(canvas::Action::publish(Message::CameraChanged(ViewState {
                    longitude: center.lon,
                    latitude: center.lat,
                    ..drag.view
                })))
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) => {
                let drag = state.drag.take()?;
                if drag.moved {
                    return None;
                }
                let at = position?;
                let viewport =
                    Viewport::new(self.view, bounds.width as f64, bounds.height as f64);
                let id = self.hit_test(&viewport, at)?;
                Some(canvas::Action::publish(Message::MarkerClicked(id)))
            }
            mouse::Event::WheelScrolled { delta } => {
                position?;
                let lines = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y as f64,
                    mouse::ScrollDelta::Pixels { y, .. } => *y as f64 / 40.0,
                };
                let zoom = (self.view.zoom + lines * 0.25).clamp(MIN_ZOOM, MAX_ZOOM);
                if (zoom - self.view.zoom).abs() < f64::EPSILON {
                    return None;
                }
                Some(canvas::Action::publish(Message::CameraChanged(ViewState {
                    zoom,
                    ..self.view
                })))
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.04, 0.05, 0.09),
        );

        let viewport = Viewport::new(self.view, bounds.width as f64, bounds.height as f64);

        for layer in &self.layers {
            match layer {
                MapLayer::Lines(lines) => {
                    for segment in &lines.segments {
                        let (x1, y1) = viewport.project(segment.from);
                        let (x2, y2) = viewport.project(segment.to);
                        let path = Path::new(|builder| {
                            builder.move_to(Point::new(x1 as f32, y1 as f32));
                            builder.line_to(Point::new(x2 as f32, y2 as f32));
                        });
                        frame.stroke(
                            &path,
                            Stroke::default()
                                .with_width(segment.width)
                                .with_color(rgba_color(segment.color)),
                        );
                    }
                }
                MapLayer::Points(points) => {
                    for marker in &points.markers {
                        let (x, y) = viewport.project(marker.position);
                        let center = Point::new(x as f32, y as f32);
                        let circle = Path::new(|builder| builder.circle(center, marker.radius));
                        frame.fill(&circle, rgba_color(marker.fill));
                        if let Some((color, width)) = marker.outline {
                            frame.stroke(
                                &circle,
                                Stroke::default()
                                    .with_width(width)
                                    .with_color(rgba_color(color)),
                            );
                        }
                    }
                }
                MapLayer::Label(label) => {
                    let (x, y) = viewport.project(label.position);
                    let anchor = Point::new(x as f32 + 10.0, y as f32 - 18.0);
                    let backdrop_width = label.text.len() as f32 * label.size * 0.62 + 8.0;
                    frame.fill_rectangle(
                        Point::new(anchor.x - 4.0, anchor.y - 2.0),
                        iced::Size::new(backdrop_width, label.size + 6.0),
                        rgba_color(label.background),
                    );
                    frame.fill_text(canvas::Text {
                        content: label.text.clone(),
                        position: anchor,
                        color: rgba_color(label.color),
                        size: label.size.into(),
                        ..canvas::Text::default()
                    });
                }
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag.map(|d| d.moved).unwrap_or(false) {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

fn rgba_color([r, g, b, a]: [u8; 4]) -> Color {
    Color::from_rgba8(r, g, b, a as f32 / 255.0)
}
