use crate::domain::Feature;
use chrono::{DateTime, Local};

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Width of the map's active window. Not configurable.
pub const WINDOW_SPAN_MS: i64 = DAY_MS;

/// Closed interval `[start, end]` of visible forecast times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub const fn starting_at(reference: i64) -> Self {
        Self {
            start: reference,
            end: reference.saturating_add(WINDOW_SPAN_MS),
        }
    }

    /// Inclusive on both ends.
    pub const fn contains(&self, time: i64) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn filter<'a>(&self, features: &'a [Feature]) -> impl Iterator<Item = &'a Feature> + 'a {
        let window = *self;
        features
            .iter()
            .filter(move |feature| window.contains(feature.time()))
    }
}

/// Bounds of the time slider for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRange {
    pub min: i64,
    pub max: i64,
}

impl TimeRange {
    pub const fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn clamp(&self, time: i64) -> i64 {
        time.clamp(self.min, self.max.max(self.min))
    }

    /// Moves `time` by whole days, staying inside the range.
    pub fn step(&self, time: i64, days: i64) -> i64 {
        self.clamp(time.saturating_add(days.saturating_mul(DAY_MS)))
    }
}

/// `(0, 0)` when there are no features.
pub fn time_range(features: &[Feature]) -> TimeRange {
    features
        .iter()
        .map(Feature::time)
        .fold(None, |acc: Option<TimeRange>, time| {
            Some(acc.map_or(TimeRange { min: time, max: time }, |range| TimeRange {
                min: range.min.min(time),
                max: range.max.max(time),
            }))
        })
        .unwrap_or_default()
}

/// Local wall-clock rendering of a forecast timestamp.
pub fn display_time(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis)
        .map(|time| time.with_timezone(&Local).format("%a %b %d %Y %H:%M").to_string())
}
