//! Calendar-month arithmetic for the reporting engine.

use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Errors parsing a `YYYY-MM` month label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonthKeyError {
    /// The input is not of the form `YYYY-MM`.
    #[error("month must be of the form YYYY-MM")]
    Malformed,
    /// The month number is outside 1..=12.
    #[error("month number must be between 1 and 12")]
    OutOfRange,
}

/// A calendar month (year + month number).
///
/// The reporting engine buckets orders by month using half-open ranges of
/// stored-timestamp strings; `MonthKey` owns that arithmetic so both the
/// summary and the trend series derive ranges the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonthKey {
    year: i32,
    /// 1-12.
    month: u32,
}

impl MonthKey {
    /// Create a month key.
    ///
    /// # Errors
    ///
    /// Returns `MonthKeyError::OutOfRange` if `month` is not in 1..=12.
    pub const fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        if month < 1 || month > 12 {
            return Err(MonthKeyError::OutOfRange);
        }
        Ok(Self { year, month })
    }

    /// The current calendar month in UTC.
    #[must_use]
    pub fn current() -> Self {
        let today = Utc::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Year component.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Month component, 1-12.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The immediately preceding calendar month.
    #[must_use]
    pub const fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The immediately following calendar month.
    #[must_use]
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The `YYYY-MM` label.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// First instant of the month as a stored-timestamp string.
    #[must_use]
    pub fn start_timestamp(&self) -> String {
        format!("{:04}-{:02}-01 00:00:00", self.year, self.month)
    }

    /// Half-open stored-timestamp range `[month start, next month start)`.
    ///
    /// Comparing stored timestamps against this range lexicographically is
    /// equivalent to chronological bucketing, on either backend, without
    /// backend-specific date functions.
    #[must_use]
    pub fn range(&self) -> (String, String) {
        (self.start_timestamp(), self.next().start_timestamp())
    }

    /// The `count` months ending at (and including) this one, oldest first.
    #[must_use]
    pub fn trailing(&self, count: usize) -> Vec<Self> {
        let mut months = Vec::with_capacity(count);
        let mut cursor = *self;
        for _ in 0..count {
            months.push(cursor);
            cursor = cursor.prev();
        }
        months.reverse();
        months
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.split_once('-').ok_or(MonthKeyError::Malformed)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(MonthKeyError::Malformed);
        }
        let year: i32 = year.parse().map_err(|_| MonthKeyError::Malformed)?;
        let month: u32 = month.parse().map_err(|_| MonthKeyError::Malformed)?;
        Self::new(year, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, month: u32) -> MonthKey {
        MonthKey::new(year, month).unwrap()
    }

    #[test]
    fn test_range_is_half_open_month() {
        let (start, end) = month(2025, 6).range();
        assert_eq!(start, "2025-06-01 00:00:00");
        assert_eq!(end, "2025-07-01 00:00:00");
    }

    #[test]
    fn test_range_crosses_year_boundary() {
        let (start, end) = month(2025, 12).range();
        assert_eq!(start, "2025-12-01 00:00:00");
        assert_eq!(end, "2026-01-01 00:00:00");
    }

    #[test]
    fn test_prev_crosses_year_boundary() {
        assert_eq!(month(2025, 1).prev(), month(2024, 12));
        assert_eq!(month(2025, 7).prev(), month(2025, 6));
    }

    #[test]
    fn test_trailing_six_months_oldest_first() {
        let labels: Vec<String> = month(2025, 6)
            .trailing(6)
            .iter()
            .map(MonthKey::label)
            .collect();
        assert_eq!(
            labels,
            ["2025-01", "2025-02", "2025-03", "2025-04", "2025-05", "2025-06"]
        );
    }

    #[test]
    fn test_trailing_spans_year_boundary() {
        let labels: Vec<String> = month(2025, 2)
            .trailing(6)
            .iter()
            .map(MonthKey::label)
            .collect();
        assert_eq!(
            labels,
            ["2024-09", "2024-10", "2024-11", "2024-12", "2025-01", "2025-02"]
        );
    }

    #[test]
    fn test_parse_label() {
        assert_eq!("2025-06".parse::<MonthKey>().unwrap(), month(2025, 6));
        assert_eq!(
            "2025-13".parse::<MonthKey>(),
            Err(MonthKeyError::OutOfRange)
        );
        assert_eq!("2025-6".parse::<MonthKey>(), Err(MonthKeyError::Malformed));
        assert_eq!("202506".parse::<MonthKey>(), Err(MonthKeyError::Malformed));
    }

    #[test]
    fn test_zero_padded_label() {
        assert_eq!(month(2025, 3).label(), "2025-03");
    }
}
