//! Monthly report model: rates, rows, portfolio aggregate and the
//! completeness verdict.

mod completeness;
mod portfolio;
mod rate;
mod regression;
mod report;
mod rows;

pub use completeness::{CompletenessStatus, MissingCell, ReportError, ReportField};
pub use portfolio::{BucketAverage, PortfolioAggregate, PORTFOLIO_LABEL};
pub use rate::{round_to, RatePolicy, RateValue, ZeroDenominatorPolicy};
pub use regression::{format_duration, RegressionTimeEntry};
pub use report::{MonthlyReport, ReportMetadata};
pub use rows::{BucketCount, CoverageReportRow, DefectLeakage, LeakageCell, QualityReportRow};
