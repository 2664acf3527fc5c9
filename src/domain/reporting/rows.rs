//! Per-project report rows.
//!
//! A `None` cell means the source for that cell was unavailable; the
//! matching entry in the completeness verdict names the reason.

use serde::{Deserialize, Serialize};

use super::{RatePolicy, RateValue, RegressionTimeEntry};
use crate::domain::foundation::ProjectId;
use crate::domain::submission::SubmissionMetrics;

/// Issue counts split into the two priority buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BucketCount {
    pub p1_p2: u64,
    pub p3_p4: u64,
}

impl BucketCount {
    pub fn new(p1_p2: u64, p3_p4: u64) -> Self {
        Self { p1_p2, p3_p4 }
    }

    pub fn total(&self) -> u64 {
        self.p1_p2 + self.p3_p4
    }
}

/// Raw defect leakage counts as returned by the issue tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct DefectLeakage {
    pub numerator: u64,
    pub denominator: u64,
}

impl DefectLeakage {
    pub fn new(numerator: u64, denominator: u64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

/// Leakage counts with their computed rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeakageCell {
    pub numerator: u64,
    pub denominator: u64,
    pub rate: RateValue,
}

impl LeakageCell {
    pub fn compute(leakage: DefectLeakage, policy: &RatePolicy) -> Self {
        Self {
            numerator: leakage.numerator,
            denominator: leakage.denominator,
            rate: policy.rate(leakage.numerator, leakage.denominator),
        }
    }
}

/// Quality columns for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReportRow {
    pub project_id: ProjectId,
    pub project_name: String,
    pub business_stream: String,
    pub supported_releases: Option<u64>,
    pub bugs: Option<BucketCount>,
    pub incidents: Option<BucketCount>,
    pub leakage: Option<LeakageCell>,
    pub regression_times: Option<Vec<RegressionTimeEntry>>,
}

/// Coverage columns for one project, derived from its stored submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReportRow {
    pub project_id: ProjectId,
    pub project_name: String,
    pub business_stream: String,
    pub metrics: Option<SubmissionMetrics>,
    pub automation: Option<RateValue>,
}

impl CoverageReportRow {
    /// Builds the row and computes automation `automated / (manual + automated)`.
    pub fn compute(
        project_id: ProjectId,
        project_name: impl Into<String>,
        business_stream: impl Into<String>,
        metrics: Option<SubmissionMetrics>,
        policy: &RatePolicy,
    ) -> Self {
        let automation = metrics.map(|m| {
            let automated = m.automated_total.max(0) as u64;
            let total = m.total_test_cases().max(0) as u64;
            policy.rate(automated, total)
        });
        Self {
            project_id,
            project_name: project_name.into(),
            business_stream: business_stream.into(),
            metrics,
            automation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reporting::ZeroDenominatorPolicy;

    fn metrics(manual: i64, automated: i64) -> SubmissionMetrics {
        SubmissionMetrics {
            manual_total: manual,
            automated_total: automated,
            ..Default::default()
        }
    }

    #[test]
    fn automation_percentage_uses_total_test_cases() {
        let row = CoverageReportRow::compute(
            ProjectId::new("crm").unwrap(),
            "CRM",
            "internal_systems",
            Some(metrics(60, 40)),
            &RatePolicy::default(),
        );
        assert_eq!(row.automation, Some(RateValue::Percent(40.0)));
    }

    #[test]
    fn automation_with_no_tests_follows_policy() {
        let na = RatePolicy::new(ZeroDenominatorPolicy::NotApplicable, 2);
        let row = CoverageReportRow::compute(
            ProjectId::new("crm").unwrap(),
            "CRM",
            "internal_systems",
            Some(metrics(0, 0)),
            &na,
        );
        assert_eq!(row.automation, Some(RateValue::NotApplicable));
    }

    #[test]
    fn missing_submission_leaves_automation_empty() {
        let row = CoverageReportRow::compute(
            ProjectId::new("crm").unwrap(),
            "CRM",
            "internal_systems",
            None,
            &RatePolicy::default(),
        );
        assert!(row.automation.is_none());
    }

    #[test]
    fn leakage_cell_applies_policy() {
        let cell = LeakageCell::compute(DefectLeakage::new(2, 12), &RatePolicy::default());
        assert_eq!(cell.rate, RateValue::Percent(16.67));
    }
}
