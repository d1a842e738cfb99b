use crate::api::DateRange;
use chrono::{Days, Local, NaiveDate};
use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REFRESH_MINUTES: u64 = 30;
pub const DEFAULT_LOG_FILE: &str = "firecast.log";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const WEEK_DAYS: u64 = 7;

/// Runtime settings. Invalid values fall back to defaults and leave a warning
/// behind, since logging is not set up yet when this is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_url: String,
    pub refresh_minutes: u64,
    pub date_range: DateRange,
    pub log_file: PathBuf,
    pub http_timeout: Duration,
    pub debug: bool,
    pub warnings: Vec<String>,
}

impl AppConfig {
    /// Loads `.env` and reads the `FIRECAST_*` variables.
    pub fn load() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok(), Local::now().date_naive())
    }

    pub fn from_lookup<F>(lookup: F, today: NaiveDate) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let value = |key: &str| lookup(key).map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty());

        let api_url = value("FIRECAST_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let refresh_minutes = match value("FIRECAST_REFRESH_MINUTES").map(|raw| raw.parse::<u64>()) {
            None => DEFAULT_REFRESH_MINUTES,
            Some(Ok(minutes)) if minutes >= 1 => minutes,
            Some(_) => {
                warnings.push(format!(
                    "FIRECAST_REFRESH_MINUTES must be a whole number of at least 1; using {DEFAULT_REFRESH_MINUTES}"
                ));
                DEFAULT_REFRESH_MINUTES
            }
        };

        let http_timeout = match value("FIRECAST_HTTP_TIMEOUT_SECS").map(|raw| raw.parse::<u64>()) {
            None => DEFAULT_HTTP_TIMEOUT_SECS,
            Some(Ok(secs)) if secs > 0 => secs,
            Some(_) => {
                warnings.push(format!(
                    "FIRECAST_HTTP_TIMEOUT_SECS must be a positive number; using {DEFAULT_HTTP_TIMEOUT_SECS}"
                ));
                DEFAULT_HTTP_TIMEOUT_SECS
            }
        };

        let date_range = resolve_date_range(
            value("FIRECAST_START_DATE"),
            value("FIRECAST_END_DATE"),
            today,
            &mut warnings,
        );

        let log_file = value("FIRECAST_LOG_FILE").map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from);
        let debug = value("DEBUG").is_some_and(|raw| raw != "0" && !raw.eq_ignore_ascii_case("false"));

        Self {
            api_url,
            refresh_minutes,
            date_range,
            log_file,
            http_timeout: Duration::from_secs(http_timeout),
            debug,
            warnings,
        }
    }
}

/// A lone start date covers the following week; a lone end date the week
/// before it. With neither, the week starting today.
fn resolve_date_range(
    start: Option<String>,
    end: Option<String>,
    today: NaiveDate,
    warnings: &mut Vec<String>,
) -> DateRange {
    let fallback = DateRange::week_from(today);
    let parsed = match (start, end) {
        (None, None) => return fallback,
        (Some(start), Some(end)) => DateRange::parse(&start, &end),
        (Some(start), None) => parse_date(&start).map(DateRange::week_from),
        (None, Some(end)) => parse_date(&end).and_then(|end| {
            let start = end.checked_sub_days(Days::new(WEEK_DAYS)).unwrap_or(end);
            DateRange::new(start, end)
        }),
    };

    parsed.unwrap_or_else(|error| {
        warnings.push(format!("{error}; using {} to {}", fallback.start(), fallback.end()));
        fallback
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate, crate::api::ApiError> {
    DateRange::parse(raw, raw).map(|range| range.start())
}
