//! Pure transforms over a fetched forecast snapshot.

pub mod aggregate;
pub mod window;

pub use aggregate::ClusterAggregate;
pub use window::{display_time, time_range, TimeRange, TimeWindow, DAY_MS, WINDOW_SPAN_MS};
