//! Quality data source ports - issue tracker, release calendar and
//! regression suite timings.
//!
//! Each call covers one project and one month. A failure only costs the
//! report the cells that call would have filled.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::domain::reporting::{BucketCount, DefectLeakage, RegressionTimeEntry};

/// Failures from a quality data source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("{source_name} unavailable: {message}")]
    Unavailable {
        source_name: String,
        message: String,
    },

    #[error("no data for project {0}")]
    NotFound(ProjectId),

    #[error("{0}")]
    Malformed(String),
}

impl SourceError {
    pub fn unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Short reason for a missing report cell.
    pub fn reason(&self) -> String {
        match self {
            Self::Unavailable { source_name, .. } => format!("{} unavailable", source_name),
            Self::NotFound(_) => "no data".to_string(),
            Self::Malformed(message) => message.clone(),
        }
    }
}

/// Bug, incident and leakage counts.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn get_bug_counts(
        &self,
        project_id: &ProjectId,
        window: TimeWindow,
    ) -> Result<BucketCount, SourceError>;

    async fn get_incident_counts(
        &self,
        project_id: &ProjectId,
        window: TimeWindow,
    ) -> Result<BucketCount, SourceError>;

    async fn get_defect_leakage(
        &self,
        project_id: &ProjectId,
        window: TimeWindow,
    ) -> Result<DefectLeakage, SourceError>;
}

#[async_trait]
pub trait ReleaseCalendar: Send + Sync {
    /// Number of releases still under support during the month.
    async fn get_supported_releases(
        &self,
        project_id: &ProjectId,
        window: TimeWindow,
    ) -> Result<u64, SourceError>;
}

#[async_trait]
pub trait RegressionTimeSource: Send + Sync {
    /// Regression suite durations recorded for the month.
    async fn get_regression_times(
        &self,
        project_id: &ProjectId,
        window: TimeWindow,
    ) -> Result<Vec<RegressionTimeEntry>, SourceError>;
}
