//! Clock port - "now" and "today" in the reporting timezone.

use chrono::NaiveDate;

use crate::domain::foundation::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Calendar date in the reporting timezone.
    fn today(&self) -> NaiveDate;
}
