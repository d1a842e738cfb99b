use crate::api::DateRange;
use crate::app::actions::AppActions;
use crate::app::input::helpers::{wrap_decrement, wrap_increment};
use crate::config::AppConfig;
use crate::domain::FeatureCollection;
use crate::event::AppEvent;
use crate::forecast::{time_range, ClusterAggregate, TimeRange, TimeWindow};
use crate::map::MapView;
use chrono::{DateTime, Local, Utc};
use std::fmt;
use std::time::Duration;

pub const MIN_REFRESH_MINUTES: u64 = 1;
const MAX_INTERVAL_DIGITS: usize = 4;
pub const CHART_TABS: [&str; 2] = ["Table", "Chart"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Loaded,
    Failed,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Loading => write!(f, "Loading"),
            Self::Loaded => write!(f, "Loaded"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntervalError {
    #[error("Enter a refresh interval in minutes")]
    Empty,
    #[error("Minimum time is 1 minute")]
    BelowMinimum,
}

/// Refresh interval in minutes. Typed digits are staged and only replace the
/// confirmed value on [`PollingConfig::confirm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollingConfig {
    confirmed: u64,
    staged: String,
    editing: bool,
}

impl PollingConfig {
    pub fn new(minutes: u64) -> Self {
        let confirmed = minutes.max(MIN_REFRESH_MINUTES);
        Self {
            confirmed,
            staged: confirmed.to_string(),
            editing: false,
        }
    }

    pub const fn confirmed_minutes(&self) -> u64 {
        self.confirmed
    }

    pub const fn delay(&self) -> Duration {
        Duration::from_secs(self.confirmed.saturating_mul(60))
    }

    pub fn staged(&self) -> &str {
        &self.staged
    }

    pub const fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn begin_edit(&mut self) {
        self.editing = true;
        self.staged = self.confirmed.to_string();
    }

    pub fn push_digit(&mut self, ch: char) {
        if ch.is_ascii_digit() && self.staged.len() < MAX_INTERVAL_DIGITS {
            self.staged.push(ch);
        }
    }

    pub fn pop_digit(&mut self) {
        self.staged.pop();
    }

    pub fn cancel(&mut self) {
        self.editing = false;
        self.staged = self.confirmed.to_string();
    }

    /// Applies the staged value. A rejected value keeps the editor open.
    pub fn confirm(&mut self) -> Result<u64, IntervalError> {
        let minutes = self
            .staged
            .parse::<u64>()
            .map_err(|_| IntervalError::Empty)?;
        if minutes < MIN_REFRESH_MINUTES {
            return Err(IntervalError::BelowMinimum);
        }
        self.confirmed = minutes;
        self.editing = false;
        Ok(minutes)
    }
}

pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub status_message: String,
    pub chart_tab_index: usize,
    pub selected_cluster_index: usize,
    pub animation_counter: usize,
    pub date_range: DateRange,
    pub snapshot: FeatureCollection,
    pub aggregate: ClusterAggregate,
    pub time_range: TimeRange,
    /// Start of the active window, ms since epoch
    pub current_time: i64,
    pub polling: PollingConfig,
    pub fetch_status: FetchStatus,
    pub in_flight: usize,
    pub last_updated: Option<DateTime<Local>>,
    pub last_error: Option<String>,
    pub map: MapView,
    pub actions: AppActions,
}

impl App {
    pub fn new(config: &AppConfig, actions: AppActions) -> Self {
        Self {
            running: true,
            show_help: false,
            status_message: "Press F1 for help".to_string(),
            chart_tab_index: 0,
            selected_cluster_index: 0,
            animation_counter: 0,
            date_range: config.date_range,
            snapshot: FeatureCollection::default(),
            aggregate: ClusterAggregate::default(),
            time_range: TimeRange::default(),
            current_time: Utc::now().timestamp_millis(),
            polling: PollingConfig::new(config.refresh_minutes),
            fetch_status: FetchStatus::Idle,
            in_flight: 0,
            last_updated: None,
            last_error: None,
            map: MapView::new(),
            actions,
        }
    }

    /// Primes the backend, loads boundaries and runs the first fetch.
    pub fn start(&mut self) {
        self.actions.spawn_prime();
        self.actions.spawn_boundaries();
        self.refresh();
    }

    pub fn refresh(&mut self) {
        self.in_flight += 1;
        self.fetch_status = FetchStatus::Loading;
        self.actions.spawn_fetch(self.date_range);
    }

    pub fn update(&mut self) {
        self.animation_counter = self.animation_counter.wrapping_add(1);
    }

    pub const fn window(&self) -> TimeWindow {
        TimeWindow::starting_at(self.current_time)
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::PollTick => {
                tracing::debug!("poll tick");
                self.refresh();
            }
            AppEvent::HeatmapLoaded(result) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match result {
                    Ok(collection) => self.apply_snapshot(collection),
                    Err(e) => {
                        // Previous snapshot stays on screen
                        self.fetch_status = FetchStatus::Failed;
                        self.last_error = Some(e.summary());
                        self.status_message = "Fetch failed, showing previous data".to_string();
                    }
                }
                if self.in_flight > 0 {
                    self.fetch_status = FetchStatus::Loading;
                }
            }
            AppEvent::Primed { step, result } => match result {
                Ok(body) => tracing::info!(step = step.label(), %body, "backend primed"),
                Err(e) => {
                    tracing::warn!(step = step.label(), error = %e, "priming failed");
                    self.last_error = Some(format!("{}: {}", step.label(), e.summary()));
                }
            },
            AppEvent::BoundariesLoaded(result) => match result {
                Ok(boundaries) => {
                    tracing::info!(clusters = boundaries.clusters.len(), "boundaries loaded");
                    self.map.boundaries = Some(boundaries);
                }
                Err(e) => tracing::warn!(error = %e, "boundaries unavailable"),
            },
        }
    }

    pub fn apply_snapshot(&mut self, collection: FeatureCollection) {
        self.aggregate = ClusterAggregate::from_features(&collection.features);
        self.time_range = time_range(&collection.features);
        if !collection.is_empty() {
            self.current_time = self.time_range.clamp(self.current_time);
        }
        self.selected_cluster_index = self
            .selected_cluster_index
            .min(self.aggregate.len().saturating_sub(1));
        tracing::info!(
            features = collection.len(),
            clusters = self.aggregate.len(),
            "snapshot loaded"
        );
        self.snapshot = collection;
        self.fetch_status = FetchStatus::Loaded;
        self.last_updated = Some(Local::now());
        self.last_error = None;
        self.status_message = format!("Loaded {} forecast points", self.snapshot.len());
    }

    pub fn scrub(&mut self, days: i64) {
        self.current_time = self.time_range.step(self.current_time, days);
    }

    pub fn jump_to_start(&mut self) {
        self.current_time = self.time_range.min;
    }

    pub fn jump_to_end(&mut self) {
        self.current_time = self.time_range.max;
    }

    pub fn select_next_cluster(&mut self) {
        self.selected_cluster_index = wrap_increment(self.selected_cluster_index, self.aggregate.len());
    }

    pub fn select_previous_cluster(&mut self) {
        self.selected_cluster_index = wrap_decrement(self.selected_cluster_index, self.aggregate.len());
    }

    pub fn next_chart_tab(&mut self) {
        self.chart_tab_index = wrap_increment(self.chart_tab_index, CHART_TABS.len());
    }

    pub fn confirm_interval(&mut self) {
        match self.polling.confirm() {
            Ok(minutes) => {
                tracing::info!(minutes, "refresh interval changed");
                self.status_message = format!("Refreshing every {minutes} min");
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }
}
