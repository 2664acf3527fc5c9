use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{CoverageReportRow, PortfolioAggregate, QualityReportRow, ZeroDenominatorPolicy};
use crate::domain::foundation::{TimeWindow, Timestamp};

/// Period and rule settings a report was produced under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub period: TimeWindow,
    pub period_start: DateTime<FixedOffset>,
    pub period_end: DateTime<FixedOffset>,
    pub generated_at: Timestamp,
    pub rounding_decimals: u32,
    pub leakage_zero_denominator: ZeroDenominatorPolicy,
    pub automation_zero_total: ZeroDenominatorPolicy,
}

/// Monthly quality report. A projection built fresh on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub metadata: ReportMetadata,
    /// In registry order.
    pub quality_rows: Vec<QualityReportRow>,
    /// In registry order.
    pub coverage_rows: Vec<CoverageReportRow>,
    pub portfolio: PortfolioAggregate,
    /// Manual plus automated totals over the period's stored submissions.
    pub overall_test_cases: Option<i64>,
}

impl MonthlyReport {
    pub fn quality_row(&self, project_id: &str) -> Option<&QualityReportRow> {
        self.quality_rows.iter().find(|r| r.project_id.as_str() == project_id)
    }

    pub fn coverage_row(&self, project_id: &str) -> Option<&CoverageReportRow> {
        self.coverage_rows.iter().find(|r| r.project_id.as_str() == project_id)
    }
}
