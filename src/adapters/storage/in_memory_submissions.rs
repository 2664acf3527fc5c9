//! In-memory submission repository.
//!
//! Keyed by (month, project) so a repeat submission replaces the earlier
//! one. Useful for tests and single-process runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::domain::submission::Submission;
use crate::ports::{StorageError, SubmissionRepository};

#[derive(Debug, Clone, Default)]
pub struct InMemorySubmissionRepository {
    submissions: Arc<RwLock<BTreeMap<(TimeWindow, ProjectId), Submission>>>,
}

impl InMemorySubmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.submissions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.submissions.read().await.is_empty()
    }
}

#[async_trait]
impl SubmissionRepository for InMemorySubmissionRepository {
    async fn save_submission(&self, submission: &Submission) -> Result<(), StorageError> {
        let key = (submission.window, submission.project_id.clone());
        self.submissions.write().await.insert(key, submission.clone());
        Ok(())
    }

    async fn get_submission(
        &self,
        project_id: &ProjectId,
        window: TimeWindow,
    ) -> Result<Option<Submission>, StorageError> {
        let key = (window, project_id.clone());
        Ok(self.submissions.read().await.get(&key).cloned())
    }

    async fn get_submissions_by_period(
        &self,
        window: TimeWindow,
    ) -> Result<Vec<Submission>, StorageError> {
        Ok(self
            .submissions
            .read()
            .await
            .iter()
            .filter(|((w, _), _)| *w == window)
            .map(|(_, s)| s.clone())
            .collect())
    }
}
