use crate::geo::time;
use crate::geo::viewport::ViewState;
use crate::record::scan::ScanItem;
use crate::remote::protocol::FetchError;
use crate::telemetry::log::EventLog;
use chrono::NaiveDate;
use std::time::Duration;

/// Base auto-advance period; divided by the effective speed multiplier.
pub const PLAYBACK_INTERVAL_MS: u64 = 2500;
/// Speed multipliers below this floor are clamped up to it.
pub const PLAYBACK_SPEED_FLOOR: f64 = 0.25;

/// Calendar-date filter over the scan list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Day(NaiveDate),
}

impl DateFilter {
    fn admits(&self, item: &ScanItem) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::Day(day) => item
                .capture_time()
                .map(|t| time::date_key(&t) == *day)
                .unwrap_or(false),
        }
    }
}

/// Detail-fetch lifecycle for the currently selected record.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Idle,
    Loading(String),
    Loaded(Box<ScanItem>),
    Failed(String),
}

/// Coarse controller state, purely derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Browsing,
    Playing,
}

/// Follow-up I/O a transition asks its caller to perform. The controller
/// itself never fetches; it only names the detail request to issue.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Effects {
    pub fetch_detail: Option<String>,
}

impl Effects {
    fn none() -> Self {
        Self::default()
    }

    fn fetch_detail(id: &str) -> Self {
        Self {
            fetch_detail: Some(id.to_string()),
        }
    }
}

/// Coordinates list position, selection, camera, and playback for one
/// dashboard view. Construct one instance per view; there is no shared
/// global state, so several controllers can coexist in tests.
#[derive(Debug)]
pub struct NavigationController {
    raw: Vec<ScanItem>,
    valid: Vec<ScanItem>,
    current_index: usize,
    selected_id: Option<String>,
    playing: bool,
    speed: f64,
    date_filter: DateFilter,
    view: ViewState,
    detail: DetailState,
    log: EventLog,
}

impl NavigationController {
    pub fn new(view: ViewState) -> Self {
        Self {
            raw: Vec::new(),
            valid: Vec::new(),
            current_index: 0,
            selected_id: None,
            playing: false,
            speed: 1.0,
            date_filter: DateFilter::All,
            view,
            detail: DetailState::Idle,
            log: EventLog::new("nav"),
        }
    }

    pub fn items(&self) -> &[ScanItem] {
        &self.raw
    }

    /// Records passing the date filter and coordinate validity — the only
    /// ones eligible for navigation and map rendering.
    pub fn valid_items(&self) -> &[ScanItem] {
        &self.valid
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn date_filter(&self) -> DateFilter {
        self.date_filter
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn detail(&self) -> &DetailState {
        &self.detail
    }

    pub fn phase(&self) -> Phase {
        if self.valid.is_empty() {
            Phase::Idle
        } else if self.playing {
            Phase::Playing
        } else {
            Phase::Browsing
        }
    }

    /// Replaces the raw list, recomputes the valid subset, and lands on the
    /// first valid record (clearing selection when there is none).
    pub fn set_items(&mut self, items: Vec<ScanItem>) -> Effects {
        self.raw = items;
        self.rebuild_valid();
        self.current_index = 0;
        if self.valid.is_empty() {
            self.clear_selection();
            self.playing = false;
            Effects::none()
        } else {
            self.navigate_to(0)
        }
    }

    /// Moves to the record at `index`, wrapping modulo the valid count in
    /// both directions. No-op while the valid list is empty or the target
    /// record carries no identifier.
    pub fn navigate_to(&mut self, index: i64) -> Effects {
        if self.valid.is_empty() {
            return Effects::none();
        }
        let len = self.valid.len() as i64;
        let normalized = ((index % len) + len) % len;
        let item = &self.valid[normalized as usize];
        let Some(id) = item.scan_id.clone() else {
            return Effects::none();
        };

        self.current_index = normalized as usize;
        self.selected_id = Some(id.clone());
        self.detail = DetailState::Loading(id.clone());

        if let Some(position) = item.map_position() {
            self.view = self.view.focus_on(position);
        }
        self.log
            .record(&format!("navigate -> {} ({}/{})", id, normalized + 1, len));
        Effects::fetch_detail(&id)
    }

    pub fn go_previous(&mut self) -> Effects {
        if self.valid.is_empty() {
            return Effects::none();
        }
        self.navigate_to(self.current_index as i64 - 1)
    }

    pub fn go_next(&mut self) -> Effects {
        if self.valid.is_empty() {
            return Effects::none();
        }
        self.navigate_to(self.current_index as i64 + 1)
    }

    /// Marker click: resolves the id within the valid list; unknown ids are
    /// ignored.
    pub fn on_marker_clicked(&mut self, id: &str) -> Effects {
        match self
            .valid
            .iter()
            .position(|item| item.scan_id.as_deref() == Some(id))
        {
            Some(index) => self.navigate_to(index as i64),
            None => Effects::none(),
        }
    }

    /// Flips playback. Starting play with zero valid items is suppressed.
    pub fn toggle_play(&mut self) {
        if self.valid.is_empty() {
            self.playing = false;
            return;
        }
        self.playing = !self.playing;
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
    }

    /// Auto-advance period while playing with a non-empty valid list. The
    /// driving timer must be recreated whenever this value changes; at most
    /// one timer exists per controller.
    pub fn playback_period(&self) -> Option<Duration> {
        if self.playing && !self.valid.is_empty() {
            let divisor = self.speed.max(PLAYBACK_SPEED_FLOOR);
            Some(Duration::from_millis(
                (PLAYBACK_INTERVAL_MS as f64 / divisor) as u64,
            ))
        } else {
            None
        }
    }

    /// Date-filter change: rewinds to the start, stops playback, drops any
    /// open detail, then lands on the first record of the new subset.
    pub fn set_date_filter(&mut self, filter: DateFilter) -> Effects {
        self.date_filter = filter;
        self.current_index = 0;
        self.playing = false;
        self.close_detail();
        self.rebuild_valid();
        if self.valid.is_empty() {
            self.clear_selection();
            Effects::none()
        } else {
            self.navigate_to(0)
        }
    }

    /// Clears selection and detail state without touching the index.
    pub fn close_detail(&mut self) {
        self.selected_id = None;
        self.detail = DetailState::Idle;
    }

    /// Applies a finished detail fetch. Results for ids no longer selected
    /// and superseded requests are discarded; failures become display state
    /// and never affect navigation or playback.
    pub fn apply_detail(&mut self, id: &str, result: Result<ScanItem, FetchError>) {
        if self.selected_id.as_deref() != Some(id) {
            return;
        }
        match result {
            Ok(item) => self.detail = DetailState::Loaded(Box::new(item)),
            Err(error) if error.is_cancellation() => {}
            Err(error) => {
                self.log.record_failure(&format!("detail {id}: {error}"));
                self.detail = DetailState::Failed(error.to_string());
            }
        }
    }

    /// Direct map interaction (drag/zoom) overwrites the camera without
    /// running any navigation logic.
    pub fn set_view(&mut self, view: ViewState) {
        self.view = view.settled();
    }

    fn clear_selection(&mut self) {
        self.selected_id = None;
        self.detail = DetailState::Idle;
    }

    fn rebuild_valid(&mut self) {
        self.valid = self
            .raw
            .iter()
            .filter(|item| self.date_filter.admits(item) && item.map_position().is_some())
            .cloned()
            .collect();
    }
}
