//! Quality data source adapters.
//!
//! - `MockIssueTracker` - baseline bug/incident/leakage counts with overrides
//! - `ManualReleaseCalendar` - configured supported-release counts
//! - `ConfiguredRegressionTimes` - suite durations from YAML

mod configured_regression_times;
mod manual_release_calendar;
mod mock_issue_tracker;

pub use configured_regression_times::ConfiguredRegressionTimes;
pub use manual_release_calendar::ManualReleaseCalendar;
pub use mock_issue_tracker::{IssueCounts, MockIssueTracker};
