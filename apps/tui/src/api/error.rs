use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid date range {start}..{end}: {reason}")]
    DateRange {
        start: String,
        end: String,
        reason: String,
    },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("could not decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Short form for the status line.
    pub fn summary(&self) -> String {
        match self {
            Self::Status { status, message, .. } => format!("HTTP {status}: {message}"),
            Self::Transport { source, .. } if source.is_timeout() => "request timed out".to_string(),
            Self::Transport { source, .. } if source.is_connect() => {
                "backend unreachable".to_string()
            }
            other => other.to_string(),
        }
    }
}
