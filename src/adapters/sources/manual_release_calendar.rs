//! Release calendar backed by manually configured counts.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::ports::{ReleaseCalendar, SourceError};

#[derive(Debug, Clone, Default)]
pub struct ManualReleaseCalendar {
    default_count: Option<u64>,
    counts: HashMap<ProjectId, u64>,
    failing: HashSet<ProjectId>,
}

impl ManualReleaseCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count used for projects without their own entry. Without one,
    /// such projects report no data.
    pub fn with_default(mut self, count: u64) -> Self {
        self.default_count = Some(count);
        self
    }

    pub fn with_count(mut self, project_id: ProjectId, count: u64) -> Self {
        self.counts.insert(project_id, count);
        self
    }

    pub fn failing_for(mut self, project_id: ProjectId) -> Self {
        self.failing.insert(project_id);
        self
    }
}

#[async_trait]
impl ReleaseCalendar for ManualReleaseCalendar {
    async fn get_supported_releases(
        &self,
        project_id: &ProjectId,
        _window: TimeWindow,
    ) -> Result<u64, SourceError> {
        if self.failing.contains(project_id) {
            return Err(SourceError::unavailable("release calendar", project_id.to_string()));
        }
        self.counts
            .get(project_id)
            .copied()
            .or(self.default_count)
            .ok_or_else(|| SourceError::NotFound(project_id.clone()))
    }
}
