//! UTC instants.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Calendar date of this instant in a reporting offset.
    pub fn date_in(&self, offset: FixedOffset) -> NaiveDate {
        self.0.with_timezone(&offset).date_naive()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ordering_follows_time() {
        let earlier = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let later = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap());
        assert!(earlier < later);
    }

    #[test]
    fn date_depends_on_offset_near_midnight() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 4, 30, 22, 30, 0).unwrap());

        let utc = ts.date_in(FixedOffset::east_opt(0).unwrap());
        let athens = ts.date_in(FixedOffset::east_opt(3 * 3600).unwrap());

        assert_eq!(utc, NaiveDate::from_ymd_opt(2026, 4, 30).unwrap());
        assert_eq!(athens, NaiveDate::from_ymd_opt(2026, 5, 1).unwrap());
    }

    #[test]
    fn displays_as_rfc3339() {
        let ts = Timestamp::from_datetime(Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap());
        assert_eq!(ts.to_string(), "2026-03-04T05:06:07+00:00");
    }
}
