//! Completeness verdict for a generated report.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::ProjectId;

/// A report cell that can be missing for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    SupportedReleases,
    BugCounts,
    IncidentCounts,
    DefectLeakage,
    RegressionTimes,
    TestCoverage,
}

impl ReportField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SupportedReleases => "supported_releases",
            Self::BugCounts => "bug_counts",
            Self::IncidentCounts => "incident_counts",
            Self::DefectLeakage => "defect_leakage",
            Self::RegressionTimes => "regression_times",
            Self::TestCoverage => "test_coverage",
        }
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (project, field) pair that could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCell {
    pub project_id: ProjectId,
    pub field: ReportField,
    pub reason: String,
}

impl MissingCell {
    pub fn new(project_id: ProjectId, field: ReportField, reason: impl Into<String>) -> Self {
        Self {
            project_id,
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for MissingCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.field, self.project_id, self.reason)
    }
}

/// Outcome of one report generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletenessStatus {
    Complete,
    /// Ordered by project registry order, then field.
    Partial { missing: Vec<MissingCell> },
    Failed { reason: String },
}

impl CompletenessStatus {
    /// Complete when nothing is missing, otherwise partial.
    pub fn from_missing(missing: Vec<MissingCell>) -> Self {
        if missing.is_empty() {
            CompletenessStatus::Complete
        } else {
            CompletenessStatus::Partial { missing }
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        CompletenessStatus::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, CompletenessStatus::Complete)
    }

    pub fn missing(&self) -> &[MissingCell] {
        match self {
            CompletenessStatus::Partial { missing } => missing,
            _ => &[],
        }
    }

    /// Converts the verdict into an error for callers that only want complete reports.
    pub fn into_result(self) -> Result<(), ReportError> {
        match self {
            CompletenessStatus::Complete => Ok(()),
            CompletenessStatus::Partial { missing } => Err(ReportError::Partial { missing }),
            CompletenessStatus::Failed { reason } => Err(ReportError::Failed { reason }),
        }
    }
}

/// Non-complete report outcomes as errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// Some cells are missing; the report is still usable.
    #[error("report is partial: {} missing cell(s)", missing.len())]
    Partial { missing: Vec<MissingCell> },

    /// No report could be produced.
    #[error("report generation failed: {reason}")]
    Failed { reason: String },
}

impl ReportError {
    /// Only `Failed` means there is no report at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReportError::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(project: &str, field: ReportField) -> MissingCell {
        MissingCell::new(ProjectId::new(project).unwrap(), field, "source unavailable")
    }

    #[test]
    fn no_missing_cells_is_complete() {
        assert_eq!(CompletenessStatus::from_missing(vec![]), CompletenessStatus::Complete);
        assert!(CompletenessStatus::Complete.into_result().is_ok());
    }

    #[test]
    fn missing_cells_make_a_partial_verdict() {
        let status = CompletenessStatus::from_missing(vec![cell("kyc", ReportField::BugCounts)]);
        assert_eq!(status.missing().len(), 1);

        let err = status.into_result().unwrap_err();
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "report is partial: 1 missing cell(s)");
    }

    #[test]
    fn failed_verdict_is_fatal() {
        let err = CompletenessStatus::failed("registry is empty").into_result().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_cell_display_names_field_and_project() {
        assert_eq!(
            cell("payments", ReportField::TestCoverage).to_string(),
            "test_coverage:payments (source unavailable)"
        );
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(CompletenessStatus::Complete).unwrap();
        assert_eq!(json["status"], "complete");
    }
}
