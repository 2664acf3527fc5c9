//! Regression suite timings from configuration.
//!
//! ```yaml
//! regression_suites:
//!   - project_id: payments
//!     suite_name: Checkout smoke
//!     duration_minutes: 42
//!     platform: web
//! ```

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::domain::reporting::RegressionTimeEntry;
use crate::ports::{RegressionTimeSource, SourceError};

#[derive(Debug, Deserialize)]
struct SuiteFile {
    #[serde(default)]
    regression_suites: Vec<SuiteEntry>,
}

#[derive(Debug, Deserialize)]
struct SuiteEntry {
    project_id: String,
    suite_name: String,
    duration_minutes: f64,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    annotations: Vec<String>,
}

/// Suite timings per project; the same timings apply to every month.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredRegressionTimes {
    suites: HashMap<ProjectId, Vec<RegressionTimeEntry>>,
    failing: HashSet<ProjectId>,
}

impl ConfiguredRegressionTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, project_id: ProjectId, entry: RegressionTimeEntry) -> Self {
        self.suites.entry(project_id).or_default().push(entry);
        self
    }

    pub fn failing_for(mut self, project_id: ProjectId) -> Self {
        self.failing.insert(project_id);
        self
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, SourceError> {
        let file: SuiteFile = serde_yaml::from_str(yaml)
            .map_err(|e| SourceError::Malformed(format!("regression suites: {}", e)))?;

        let mut times = Self::new();
        for suite in file.regression_suites {
            let project_id = ProjectId::new(&suite.project_id)
                .map_err(|e| SourceError::Malformed(e.to_string()))?;
            let mut entry = RegressionTimeEntry::new(suite.suite_name, suite.duration_minutes)
                .map_err(|e| SourceError::Malformed(e.to_string()))?;
            if let Some(category) = suite.category {
                entry = entry.with_category(category);
            }
            if let Some(platform) = suite.platform {
                entry = entry.with_platform(platform);
            }
            for annotation in suite.annotations {
                entry = entry.with_annotation(annotation);
            }
            times = times.with_entry(project_id, entry);
        }
        Ok(times)
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SourceError::unavailable("regression suites", format!("{}: {}", path.display(), e))
        })?;
        Self::from_yaml(&raw)
    }
}

#[async_trait]
impl RegressionTimeSource for ConfiguredRegressionTimes {
    async fn get_regression_times(
        &self,
        project_id: &ProjectId,
        _window: TimeWindow,
    ) -> Result<Vec<RegressionTimeEntry>, SourceError> {
        if self.failing.contains(project_id) {
            return Err(SourceError::unavailable("regression timings", project_id.to_string()));
        }
        Ok(self.suites.get(project_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn yaml_entries_are_grouped_by_project() {
        let times = ConfiguredRegressionTimes::from_yaml(
            r#"
regression_suites:
  - project_id: payments
    suite_name: Checkout smoke
    duration_minutes: 42
    platform: web
  - project_id: payments
    suite_name: Full regression
    duration_minutes: 150
    annotations: [nightly]
"#,
        )
        .unwrap();
        let jan = TimeWindow::new(2026, 1).unwrap();

        let entries = times
            .get_regression_times(&ProjectId::new("payments").unwrap(), jan)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].formatted_duration(), "2.5h");
        assert_eq!(entries[1].annotations, vec!["nightly".to_string()]);

        let none = times
            .get_regression_times(&ProjectId::new("kyc").unwrap(), jan)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn negative_duration_is_malformed() {
        let err = ConfiguredRegressionTimes::from_yaml(
            "regression_suites:\n  - {project_id: kyc, suite_name: x, duration_minutes: -1}\n",
        )
        .unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }
}
