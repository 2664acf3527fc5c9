//! Test coverage metrics reported by a project for one month.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Largest count accepted for any single coverage number.
pub const MAX_TEST_CASES: i64 = 10_000_000;

/// Manual and automated test-case totals plus last-month deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SubmissionMetrics {
    pub manual_total: i64,
    pub automated_total: i64,
    pub manual_created_last_month: i64,
    pub manual_updated_last_month: i64,
    pub automated_created_last_month: i64,
    pub automated_updated_last_month: i64,
}

impl SubmissionMetrics {
    /// Rejects negative counts and counts above [`MAX_TEST_CASES`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in self.fields() {
            if value < 0 {
                return Err(ValidationError::negative(field.as_str(), value));
            }
            if value > MAX_TEST_CASES {
                return Err(ValidationError::out_of_range(
                    field.as_str(),
                    0,
                    MAX_TEST_CASES,
                    value,
                ));
            }
        }
        Ok(())
    }

    /// All test cases, manual plus automated.
    pub fn total_test_cases(&self) -> i64 {
        self.manual_total.saturating_add(self.automated_total)
    }

    fn fields(&self) -> [(CoverageField, i64); 6] {
        [
            (CoverageField::ManualTotal, self.manual_total),
            (CoverageField::AutomatedTotal, self.automated_total),
            (CoverageField::ManualCreated, self.manual_created_last_month),
            (CoverageField::ManualUpdated, self.manual_updated_last_month),
            (CoverageField::AutomatedCreated, self.automated_created_last_month),
            (CoverageField::AutomatedUpdated, self.automated_updated_last_month),
        ]
    }
}

/// Names of the individual coverage numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageField {
    ManualTotal,
    AutomatedTotal,
    ManualCreated,
    ManualUpdated,
    AutomatedCreated,
    AutomatedUpdated,
}

impl CoverageField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManualTotal => "manual_total",
            Self::AutomatedTotal => "automated_total",
            Self::ManualCreated => "manual_created_last_month",
            Self::ManualUpdated => "manual_updated_last_month",
            Self::AutomatedCreated => "automated_created_last_month",
            Self::AutomatedUpdated => "automated_updated_last_month",
        }
    }

    /// Phrase used when asking the user for this number.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::ManualTotal => "total manual test cases",
            Self::AutomatedTotal => "total automated test cases",
            Self::ManualCreated => "manual test cases created last month",
            Self::ManualUpdated => "manual test cases updated last month",
            Self::AutomatedCreated => "automated test cases created last month",
            Self::AutomatedUpdated => "automated test cases updated last month",
        }
    }
}

impl fmt::Display for CoverageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coverage numbers gathered so far across several messages.
///
/// Each field is filled independently; a later statement replaces an
/// earlier one for the same field only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CoverageDraft {
    pub manual_total: Option<i64>,
    pub automated_total: Option<i64>,
    pub manual_created_last_month: Option<i64>,
    pub manual_updated_last_month: Option<i64>,
    pub automated_created_last_month: Option<i64>,
    pub automated_updated_last_month: Option<i64>,
}

impl CoverageDraft {
    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|(_, value)| value.is_none())
    }

    /// Overlays every field `newer` states onto this draft.
    pub fn merge(&mut self, newer: &CoverageDraft) {
        fn overlay(target: &mut Option<i64>, newer: Option<i64>) {
            if newer.is_some() {
                *target = newer;
            }
        }
        overlay(&mut self.manual_total, newer.manual_total);
        overlay(&mut self.automated_total, newer.automated_total);
        overlay(&mut self.manual_created_last_month, newer.manual_created_last_month);
        overlay(&mut self.manual_updated_last_month, newer.manual_updated_last_month);
        overlay(
            &mut self.automated_created_last_month,
            newer.automated_created_last_month,
        );
        overlay(
            &mut self.automated_updated_last_month,
            newer.automated_updated_last_month,
        );
    }

    /// Fields that have not been stated yet, in prompt order.
    pub fn missing_fields(&self) -> Vec<CoverageField> {
        self.slots()
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| field)
            .collect()
    }

    /// Converts into metrics once all six fields are known.
    pub fn complete(&self) -> Option<SubmissionMetrics> {
        Some(SubmissionMetrics {
            manual_total: self.manual_total?,
            automated_total: self.automated_total?,
            manual_created_last_month: self.manual_created_last_month?,
            manual_updated_last_month: self.manual_updated_last_month?,
            automated_created_last_month: self.automated_created_last_month?,
            automated_updated_last_month: self.automated_updated_last_month?,
        })
    }

    fn slots(&self) -> [(CoverageField, Option<i64>); 6] {
        [
            (CoverageField::ManualTotal, self.manual_total),
            (CoverageField::AutomatedTotal, self.automated_total),
            (CoverageField::ManualCreated, self.manual_created_last_month),
            (CoverageField::ManualUpdated, self.manual_updated_last_month),
            (CoverageField::AutomatedCreated, self.automated_created_last_month),
            (CoverageField::AutomatedUpdated, self.automated_updated_last_month),
        ]
    }
}

impl From<SubmissionMetrics> for CoverageDraft {
    fn from(metrics: SubmissionMetrics) -> Self {
        Self {
            manual_total: Some(metrics.manual_total),
            automated_total: Some(metrics.automated_total),
            manual_created_last_month: Some(metrics.manual_created_last_month),
            manual_updated_last_month: Some(metrics.manual_updated_last_month),
            automated_created_last_month: Some(metrics.automated_created_last_month),
            automated_updated_last_month: Some(metrics.automated_updated_last_month),
        }
    }
}
