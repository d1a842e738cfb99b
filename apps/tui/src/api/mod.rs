//! Client for the Firecast forecast backend.

pub mod client;
pub mod error;
pub mod query;

pub use client::ForecastClient;
pub use error::ApiError;
pub use query::{build_url, DateRange, MAX_RANGE_DAYS};
