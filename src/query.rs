// Incoming stay and calendar-window queries, parsed into domain values

use crate::config::EngineConfig;
use crate::model::StayRange;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid date for {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
}

// Blank or absent parameters both mean "not given"
fn parse_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, QueryError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| QueryError::InvalidDate {
                field,
                value: raw.to_string(),
            }),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StayQuery {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub adults: u32,
    pub children: u32,
}

impl StayQuery {
    /// The requested stay, if any.
    ///
    /// A missing end or a check-out on or before check-in is not an error: it
    /// is treated as "no stay range" and priced permissively downstream.
    pub fn stay_range(&self) -> Result<Option<StayRange>, QueryError> {
        let check_in = parse_date("checkIn", self.check_in.as_deref())?;
        let check_out = parse_date("checkOut", self.check_out.as_deref())?;
        Ok(StayRange::from_optional(check_in, check_out))
    }

    pub fn guests(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarQuery {
    pub start_date: Option<String>,
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindow {
    pub start: NaiveDate,
    pub days: i64,
}

impl CalendarQuery {
    // `today` is the caller's clock; the day count is clamped, never rejected
    pub fn window(&self, today: NaiveDate, config: &EngineConfig) -> Result<CalendarWindow, QueryError> {
        let start = parse_date("startDate", self.start_date.as_deref())?.unwrap_or(today);
        Ok(CalendarWindow {
            start,
            days: config.window_days(self.days),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::date;
    use test_case::test_case;

    fn stay_query(check_in: Option<&str>, check_out: Option<&str>) -> StayQuery {
        StayQuery {
            check_in: check_in.map(str::to_string),
            check_out: check_out.map(str::to_string),
            adults: 2,
            children: 0,
        }
    }

    #[test_case(Some("2025-06-01"), Some("2025-06-03"), Some(2); "#1 two nights")]
    #[test_case(Some("2025-06-03"), Some("2025-06-01"), None; "#2 inverted")]
    #[test_case(Some("2025-06-01"), Some("2025-06-01"), None; "#3 same day")]
    #[test_case(None, Some("2025-06-03"), None; "#4 missing check in")]
    #[test_case(Some("2025-06-01"), Some(""), None; "#5 blank check out")]
    fn test_stay_range(check_in: Option<&str>, check_out: Option<&str>, nights: Option<i64>) {
        let range = stay_query(check_in, check_out).stay_range().unwrap();
        assert_eq!(range.map(|r| r.nights()), nights);
    }

    #[test]
    fn test_malformed_date_is_rejected() {
        let err = stay_query(Some("01/06/2025"), Some("2025-06-03"))
            .stay_range()
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidDate {
                field: "checkIn",
                value: "01/06/2025".to_string(),
            }
        );
    }

    #[test]
    fn test_stay_query_from_json() {
        let query: StayQuery =
            serde_json::from_str(r#"{"checkIn":"2025-06-01","checkOut":"2025-06-02","adults":2,"children":1}"#).unwrap();
        assert_eq!(query.guests(), 3);
        assert_eq!(query.stay_range().unwrap().unwrap().check_in(), date("2025-06-01"));
    }

    #[test]
    fn test_calendar_window_defaults_to_today() {
        let config = EngineConfig::default();
        let window = CalendarQuery::default().window(date("2025-06-15"), &config).unwrap();
        assert_eq!(window.start, date("2025-06-15"));
        assert_eq!(window.days, config.default_window_days);
    }

    #[test]
    fn test_calendar_window_explicit_and_clamped() {
        let query = CalendarQuery {
            start_date: Some("2025-07-01".to_string()),
            days: Some(3),
        };
        let window = query.window(date("2025-06-15"), &EngineConfig::default()).unwrap();
        assert_eq!(window.start, date("2025-07-01"));
        assert_eq!(window.days, 7);
    }

    #[test]
    fn test_calendar_window_bad_start() {
        let query = CalendarQuery {
            start_date: Some("July 1st".to_string()),
            days: None,
        };
        assert!(query.window(date("2025-06-15"), &EngineConfig::default()).is_err());
    }
}
