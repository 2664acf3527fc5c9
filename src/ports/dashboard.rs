//! Dashboard ports - regeneration after a submission and publishing of
//! the rendered report.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::TimeWindow;
use crate::domain::reporting::{CompletenessStatus, MonthlyReport};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("could not write report: {0}")]
    Io(String),

    #[error("could not encode report: {0}")]
    Encoding(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DashboardError {
    /// The report could not be built at all.
    #[error("report generation failed: {0}")]
    Generation(String),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Rebuilds dashboard data for a month.
#[async_trait]
pub trait DashboardRegenerator: Send + Sync {
    async fn regenerate(&self, window: TimeWindow) -> Result<(), DashboardError>;
}

/// Writes a generated report somewhere the dashboard can read it.
#[async_trait]
pub trait ReportPublisher: Send + Sync {
    async fn publish(
        &self,
        report: &MonthlyReport,
        status: &CompletenessStatus,
    ) -> Result<(), PublishError>;
}
