//! Clock adapters.

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Wall clock read in a fixed reporting offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_in(self.offset)
    }
}

/// Frozen clock for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
    now: Timestamp,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        let now = today
            .and_hms_opt(12, 0, 0)
            .map(|dt| Timestamp::from_datetime(Utc.from_utc_datetime(&dt)))
            .unwrap_or_else(Timestamp::now);
        Self { today, now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
