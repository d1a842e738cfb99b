// Event module for firecast
// Drives the dashboard loop and the headless report

mod loop_handler;

pub use loop_handler::{run, run_headless};

use crate::api::ApiError;
use crate::domain::{ClusterBoundaries, FeatureCollection};

/// Backend priming request, sent once when the dashboard opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimeStep {
    Train,
    Predict,
}

impl PrimeStep {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Predict => "predict",
        }
    }
}

/// Messages from background tasks to the UI loop, which owns all state.
#[derive(Debug)]
pub enum AppEvent {
    PollTick,
    HeatmapLoaded(Result<FeatureCollection, ApiError>),
    Primed {
        step: PrimeStep,
        result: Result<serde_json::Value, ApiError>,
    },
    BoundariesLoaded(Result<ClusterBoundaries, ApiError>),
}
