//! Report handlers.

mod generate_monthly_report;
mod regenerate_dashboard;

pub use generate_monthly_report::{ReportAggregationEngine, ReportSettings};
pub use regenerate_dashboard::ReportDashboard;
