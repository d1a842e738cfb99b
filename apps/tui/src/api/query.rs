use crate::api::ApiError;
use chrono::{Days, NaiveDate};
use reqwest::Url;

/// The backend rejects heatmap ranges wider than this.
pub const MAX_RANGE_DAYS: i64 = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar dates sent as `start_date` / `end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ApiError> {
        let days = (end - start).num_days();
        if days < 0 {
            return Err(range_error(start, end, "end date is before start date"));
        }
        if days > MAX_RANGE_DAYS {
            return Err(range_error(
                start,
                end,
                &format!("range spans {days} days, at most {MAX_RANGE_DAYS} allowed"),
            ));
        }
        Ok(Self { start, end })
    }

    /// `start` plus the widest range the backend accepts.
    pub fn week_from(start: NaiveDate) -> Self {
        #[allow(clippy::cast_sign_loss)]
        let end = start
            .checked_add_days(Days::new(MAX_RANGE_DAYS as u64))
            .unwrap_or(start);
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ApiError> {
        let parse = |value: &str| {
            NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| ApiError::DateRange {
                start: start.to_string(),
                end: end.to_string(),
                reason: format!("{value:?} is not YYYY-MM-DD: {e}"),
            })
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn query_params(&self) -> [(&'static str, String); 2] {
        [
            ("start_date", self.start.format(DATE_FORMAT).to_string()),
            ("end_date", self.end.format(DATE_FORMAT).to_string()),
        ]
    }
}

fn range_error(start: NaiveDate, end: NaiveDate, reason: &str) -> ApiError {
    ApiError::DateRange {
        start: start.format(DATE_FORMAT).to_string(),
        end: end.format(DATE_FORMAT).to_string(),
        reason: reason.to_string(),
    }
}

/// Joins `path` onto `base` and appends URL-encoded query parameters.
pub fn build_url<K, V>(base: &str, path: &str, params: &[(K, V)]) -> Result<Url, ApiError>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let joined = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    let mut url = Url::parse(&joined).map_err(|e| ApiError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })?;

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key.as_ref(), value.as_ref());
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn heatmap_url_carries_both_dates() -> Result<(), ApiError> {
        let range = DateRange::parse("2025-03-09", "2025-03-16")?;
        let url = build_url("http://127.0.0.1:8000/", "/api/heatmap", &range.query_params())?;
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/api/heatmap?start_date=2025-03-09&end_date=2025-03-16"
        );
        Ok(())
    }

    #[test]
    fn parameters_are_url_encoded() -> Result<(), ApiError> {
        let url = build_url("http://localhost:8000", "api/heatmap", &[("label", "a b&c")])?;
        assert_eq!(url.query(), Some("label=a+b%26c"));
        Ok(())
    }

    #[test]
    fn url_without_params_has_no_query() -> Result<(), ApiError> {
        let params: [(&str, &str); 0] = [];
        let url = build_url("http://localhost:8000", "api/train/", &params)?;
        assert_eq!(url.as_str(), "http://localhost:8000/api/train/");
        Ok(())
    }

    #[test]
    fn rejects_malformed_base() {
        let params: [(&str, &str); 0] = [];
        assert!(matches!(
            build_url("not a url", "api/heatmap", &params),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn date_range_bounds_match_backend() {
        assert!(DateRange::new(date(2025, 3, 9), date(2025, 3, 9)).is_ok());
        assert!(DateRange::new(date(2025, 3, 9), date(2025, 3, 16)).is_ok());
        assert!(matches!(
            DateRange::new(date(2025, 3, 9), date(2025, 3, 17)),
            Err(ApiError::DateRange { .. })
        ));
        assert!(matches!(
            DateRange::new(date(2025, 3, 9), date(2025, 3, 8)),
            Err(ApiError::DateRange { .. })
        ));
        assert!(DateRange::parse("2025/03/09", "2025-03-10").is_err());
    }

    #[test]
    fn week_from_spans_maximum_range() {
        let range = DateRange::week_from(date(2025, 12, 28));
        assert_eq!(range.end(), date(2026, 1, 4));
        assert!(DateRange::new(range.start(), range.end()).is_ok());
    }
}
