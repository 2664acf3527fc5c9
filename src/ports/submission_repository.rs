//! SubmissionRepository port - persistence for finalized coverage
//! submissions.
//!
//! At most one submission is current per (project, month); saving again
//! replaces the earlier one.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::domain::submission::Submission;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("stored data is corrupt: {0}")]
    Corrupted(String),
}

#[async_trait]
pub trait SubmissionRepository: Send + Sync {
    /// Stores a submission, replacing any earlier one for the same
    /// project and month.
    async fn save_submission(&self, submission: &Submission) -> Result<(), StorageError>;

    /// Current submission for a project and month.
    async fn get_submission(
        &self,
        project_id: &ProjectId,
        window: TimeWindow,
    ) -> Result<Option<Submission>, StorageError>;

    /// Every current submission for a month, in no particular order.
    async fn get_submissions_by_period(
        &self,
        window: TimeWindow,
    ) -> Result<Vec<Submission>, StorageError>;
}
