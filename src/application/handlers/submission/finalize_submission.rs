//! SubmissionFinalizer - validates a finalized command, stores it and asks
//! for a dashboard refresh.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::foundation::{DomainError, ErrorCode, TimeWindow, ValidationError};
use crate::domain::submission::{Submission, SubmissionCommand};
use crate::ports::{
    Clock, DashboardError, DashboardRegenerator, MetricsSink, ProjectRegistry, StorageError,
    SubmissionRepository,
};

/// Non-fatal dashboard refresh failure attached to a stored submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRegenerationWarning {
    pub window: TimeWindow,
    pub error: DashboardError,
}

impl DashboardRegenerationWarning {
    pub fn message(&self) -> String {
        format!("dashboard for {} was not refreshed: {}", self.window, self.error)
    }
}

/// A stored submission plus anything that went wrong after storing it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub submission: Submission,
    pub warnings: Vec<DashboardRegenerationWarning>,
}

impl SubmissionReceipt {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("invalid submission: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SubmitError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SubmitError::Validation(err) => err.code(),
            SubmitError::Storage(_) => ErrorCode::StorageError,
        }
    }
}

impl From<SubmitError> for DomainError {
    fn from(err: SubmitError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

pub struct SubmissionFinalizer {
    repository: Arc<dyn SubmissionRepository>,
    registry: Arc<dyn ProjectRegistry>,
    dashboard: Arc<dyn DashboardRegenerator>,
    metrics: Arc<dyn MetricsSink>,
    clock: Arc<dyn Clock>,
}

impl SubmissionFinalizer {
    pub fn new(
        repository: Arc<dyn SubmissionRepository>,
        registry: Arc<dyn ProjectRegistry>,
        dashboard: Arc<dyn DashboardRegenerator>,
        metrics: Arc<dyn MetricsSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            registry,
            dashboard,
            metrics,
            clock,
        }
    }

    pub async fn execute(&self, command: SubmissionCommand) -> Result<SubmissionReceipt, SubmitError> {
        // 1. Validate; nothing is coerced
        self.validate(&command)?;

        // 2. Persist (last write wins per project and month)
        let submission = Submission::from_command(command, self.clock.now());
        self.repository.save_submission(&submission).await?;
        self.metrics
            .record_submission(&submission.project_id, submission.window);
        info!(
            project_id = %submission.project_id,
            period = %submission.window,
            submission_id = %submission.id,
            "submission saved"
        );

        // 3. Refresh the dashboard, best effort
        let mut warnings = Vec::new();
        if let Err(error) = self.dashboard.regenerate(submission.window).await {
            let warning = DashboardRegenerationWarning {
                window: submission.window,
                error,
            };
            warn!(
                project_id = %submission.project_id,
                period = %submission.window,
                error = %warning.error,
                "dashboard regeneration failed"
            );
            warnings.push(warning);
        }

        Ok(SubmissionReceipt {
            submission,
            warnings,
        })
    }

    fn validate(&self, command: &SubmissionCommand) -> Result<(), ValidationError> {
        command.metrics.validate()?;

        if !self.registry.is_active(&command.project_id) {
            return Err(ValidationError::unknown_project(command.project_id.as_str()));
        }

        let current = TimeWindow::containing(self.clock.today())?;
        if command.window > current {
            return Err(ValidationError::future_window(command.window, current));
        }
        Ok(())
    }
}
