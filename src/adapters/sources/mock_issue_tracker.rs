//! Canned issue tracker for demos and tests.
//!
//! Every project gets the same baseline counts unless overridden. Projects
//! can be marked as failing to exercise partial reports.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::domain::reporting::{BucketCount, DefectLeakage};
use crate::ports::{IssueTracker, SourceError};

const SOURCE_NAME: &str = "issue tracker";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueCounts {
    pub bugs: BucketCount,
    pub incidents: BucketCount,
    pub leakage: DefectLeakage,
}

impl Default for IssueCounts {
    fn default() -> Self {
        Self {
            bugs: BucketCount::new(2, 5),
            incidents: BucketCount::new(1, 3),
            leakage: DefectLeakage::new(2, 12),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockIssueTracker {
    baseline: IssueCounts,
    overrides: HashMap<ProjectId, IssueCounts>,
    failing: HashSet<ProjectId>,
    delay: Duration,
}

impl MockIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_baseline(mut self, counts: IssueCounts) -> Self {
        self.baseline = counts;
        self
    }

    pub fn with_counts(mut self, project_id: ProjectId, counts: IssueCounts) -> Self {
        self.overrides.insert(project_id, counts);
        self
    }

    /// Every call for `project_id` fails as unavailable.
    pub fn failing_for(mut self, project_id: ProjectId) -> Self {
        self.failing.insert(project_id);
        self
    }

    /// Simulated latency for every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn counts_for(&self, project_id: &ProjectId) -> Result<IssueCounts, SourceError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        if self.failing.contains(project_id) {
            return Err(SourceError::unavailable(
                SOURCE_NAME,
                format!("query failed for {}", project_id),
            ));
        }
        Ok(self
            .overrides
            .get(project_id)
            .copied()
            .unwrap_or(self.baseline))
    }
}

#[async_trait]
impl IssueTracker for MockIssueTracker {
    async fn get_bug_counts(
        &self,
        project_id: &ProjectId,
        _window: TimeWindow,
    ) -> Result<BucketCount, SourceError> {
        Ok(self.counts_for(project_id).await?.bugs)
    }

    async fn get_incident_counts(
        &self,
        project_id: &ProjectId,
        _window: TimeWindow,
    ) -> Result<BucketCount, SourceError> {
        Ok(self.counts_for(project_id).await?.incidents)
    }

    async fn get_defect_leakage(
        &self,
        project_id: &ProjectId,
        _window: TimeWindow,
    ) -> Result<DefectLeakage, SourceError> {
        Ok(self.counts_for(project_id).await?.leakage)
    }
}
