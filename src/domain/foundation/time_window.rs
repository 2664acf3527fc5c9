//! Calendar month value object used as the reporting period.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

/// A reporting month, ordered by (year, month).
///
/// Start and end instants are derived on demand for a fixed offset;
/// the end is exclusive and equals the start of the following month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeWindow {
    year: i32,
    month: u32,
}

impl TimeWindow {
    /// Creates a window after checking the year and month ranges.
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ValidationError::out_of_range(
                "year",
                MIN_YEAR as i64,
                MAX_YEAR as i64,
                year as i64,
            ));
        }
        if !(1..=12).contains(&month) {
            return Err(ValidationError::out_of_range("month", 1, 12, month as i64));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Result<Self, ValidationError> {
        Self::new(date.year(), date.month())
    }

    /// The month before the one containing `date`.
    pub fn preceding(date: NaiveDate) -> Result<Self, ValidationError> {
        let (year, month) = step_back(date.year(), date.month());
        Self::new(year, month)
    }

    /// Resolves the month to use when the user did not name one.
    ///
    /// During the first `grace_days` days of a month the previous month is
    /// still the natural reporting target.
    pub fn default_for(today: NaiveDate, grace_days: u32) -> Result<Self, ValidationError> {
        if today.day() <= grace_days {
            Self::preceding(today)
        } else {
            Self::containing(today)
        }
    }

    /// The following month, if it is still within the supported range.
    pub fn next(&self) -> Option<Self> {
        let (year, month) = step_forward(self.year, self.month);
        Self::new(year, month).ok()
    }

    /// Renders the window as `YYYY-MM`.
    pub fn iso_month(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// Whether `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Midnight on the first day of the month, in `offset`.
    pub fn start(&self, offset: FixedOffset) -> DateTime<FixedOffset> {
        month_start(self.year, self.month, offset)
    }

    /// Midnight on the first day of the following month, in `offset` (exclusive).
    pub fn end(&self, offset: FixedOffset) -> DateTime<FixedOffset> {
        let (year, month) = step_forward(self.year, self.month);
        month_start(year, month, offset)
    }
}

fn step_back(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn step_forward(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn month_start(year: i32, month: u32, offset: FixedOffset) -> DateTime<FixedOffset> {
    // Validated months always produce a date; the default is unreachable.
    let local: NaiveDateTime = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    let utc = local - Duration::seconds(offset.local_minus_utc() as i64);
    offset.from_utc_datetime(&utc)
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for TimeWindow {
    type Err = ValidationError;

    /// Parses a strict `YYYY-MM` string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ValidationError::invalid_format("month", format!("expected YYYY-MM, got '{}'", trimmed));

        let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for TimeWindow {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeWindow> for String {
    fn from(window: TimeWindow) -> Self {
        window.iso_month()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_out_of_range_month_and_year() {
        assert!(TimeWindow::new(2026, 0).is_err());
        assert!(TimeWindow::new(2026, 13).is_err());
        assert!(TimeWindow::new(1999, 5).is_err());
        assert!(TimeWindow::new(2101, 5).is_err());
    }

    #[test]
    fn orders_by_year_then_month() {
        let a = TimeWindow::new(2025, 12).unwrap();
        let b = TimeWindow::new(2026, 1).unwrap();
        let c = TimeWindow::new(2026, 2).unwrap();
        assert!(a < b && b < c);
    }

    #[test]
    fn default_uses_previous_month_inside_grace_period() {
        let window = TimeWindow::default_for(date(2026, 3, 2), 2).unwrap();
        assert_eq!(window.iso_month(), "2026-02");
    }

    #[test]
    fn default_uses_current_month_after_grace_period() {
        let window = TimeWindow::default_for(date(2026, 3, 3), 2).unwrap();
        assert_eq!(window.iso_month(), "2026-03");
    }

    #[test]
    fn default_wraps_year_in_january() {
        let window = TimeWindow::default_for(date(2026, 1, 1), 2).unwrap();
        assert_eq!(window.iso_month(), "2025-12");
    }

    #[test]
    fn zero_grace_days_never_defaults_backwards() {
        let window = TimeWindow::default_for(date(2026, 1, 1), 0).unwrap();
        assert_eq!(window.iso_month(), "2026-01");
    }

    #[test]
    fn parses_strict_iso_month() {
        assert_eq!("2026-04".parse::<TimeWindow>().unwrap(), TimeWindow::new(2026, 4).unwrap());
        assert!("2026-4".parse::<TimeWindow>().is_err());
        assert!("April 2026".parse::<TimeWindow>().is_err());
        assert!("2026-13".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn end_is_start_of_next_month() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let window = TimeWindow::new(2025, 12).unwrap();

        assert_eq!(window.start(offset).to_rfc3339(), "2025-12-01T00:00:00+02:00");
        assert_eq!(window.end(offset).to_rfc3339(), "2026-01-01T00:00:00+02:00");
    }

    #[test]
    fn serializes_as_iso_month_string() {
        let window = TimeWindow::new(2026, 7).unwrap();
        assert_eq!(serde_json::to_string(&window).unwrap(), "\"2026-07\"");
    }
}
