//! Validated date window for time-series backfills.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::DomainError;

/// Query-string date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Widest window the provider is asked for in one call.
pub const MAX_RANGE_DAYS: i64 = 365;

/// An inclusive `[start, end]` window with `end > start` and at most
/// [`MAX_RANGE_DAYS`] between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::InvalidDateRange(format!(
                "end_date {end} must be after start_date {start}"
            )));
        }

        let days = (end - start).num_days();
        if days > MAX_RANGE_DAYS {
            return Err(DomainError::InvalidDateRange(format!(
                "range spans {days} days, at most {MAX_RANGE_DAYS} allowed"
            )));
        }

        Ok(Self { start, end })
    }

    /// Parses `YYYY-MM-DD` strings and validates the window.
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        let parse = |name: &str, value: &str| {
            NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
                DomainError::InvalidDateRange(format!("{name} must be YYYY-MM-DD, got {value:?}"))
            })
        };
        Self::new(parse("start_date", start)?, parse("end_date", end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.start(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.end(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    #[test]
    fn test_end_must_follow_start() {
        assert!(DateRange::parse("2024-01-02", "2024-01-01").is_err());
        assert!(DateRange::parse("2024-01-01", "2024-01-01").is_err());
    }

    #[test]
    fn test_span_limited_to_a_year() {
        assert!(DateRange::parse("2023-01-01", "2024-01-01").is_ok());
        // 2024 is a leap year: 366 days
        assert!(DateRange::parse("2024-01-01", "2025-01-01").is_err());
    }

    #[test]
    fn test_malformed_dates_rejected() {
        let err = DateRange::parse("2024/01/01", "2024-02-01").unwrap_err();
        assert!(matches!(err, DomainError::InvalidDateRange(_)));
        assert!(DateRange::parse("2024-01-01", "").is_err());
    }
}
