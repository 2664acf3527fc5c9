//! File-based submission repository.
//!
//! One YAML file per project and month:
//! `<base>/<YYYY-MM>/<project_id>.yaml`. Writing the same pair again
//! overwrites the file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::domain::submission::Submission;
use crate::ports::{StorageError, SubmissionRepository};

#[derive(Debug, Clone)]
pub struct FileSubmissionRepository {
    base_path: PathBuf,
}

impl FileSubmissionRepository {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn period_dir(&self, window: TimeWindow) -> PathBuf {
        self.base_path.join(window.iso_month())
    }

    fn submission_path(&self, project_id: &ProjectId, window: TimeWindow) -> PathBuf {
        let file_name = project_id.as_str().replace([' ', '/', '\\'], "_");
        self.period_dir(window).join(format!("{}.yaml", file_name))
    }

    async fn read_file(path: &Path) -> Result<Submission, StorageError> {
        let yaml = fs::read_to_string(path)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        serde_yaml::from_str(&yaml)
            .map_err(|e| StorageError::Corrupted(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl SubmissionRepository for FileSubmissionRepository {
    async fn save_submission(&self, submission: &Submission) -> Result<(), StorageError> {
        fs::create_dir_all(self.period_dir(submission.window))
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let yaml = serde_yaml::to_string(submission)
            .map_err(|e| StorageError::Corrupted(e.to_string()))?;

        fs::write(self.submission_path(&submission.project_id, submission.window), yaml)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    async fn get_submission(
        &self,
        project_id: &ProjectId,
        window: TimeWindow,
    ) -> Result<Option<Submission>, StorageError> {
        let path = self.submission_path(project_id, window);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_file(&path).await.map(Some)
    }

    async fn get_submissions_by_period(
        &self,
        window: TimeWindow,
    ) -> Result<Vec<Submission>, StorageError> {
        let dir = self.period_dir(window);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let mut submissions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                submissions.push(Self::read_file(&path).await?);
            }
        }
        Ok(submissions)
    }
}
