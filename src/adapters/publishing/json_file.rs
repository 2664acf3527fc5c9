//! Writes each month's report as pretty JSON: `<dir>/report-YYYY-MM.json`.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::domain::foundation::TimeWindow;
use crate::domain::reporting::{CompletenessStatus, MonthlyReport};
use crate::ports::{PublishError, ReportPublisher};

#[derive(Debug, Clone)]
pub struct JsonFilePublisher {
    output_dir: PathBuf,
}

#[derive(Serialize)]
struct Document<'a> {
    completeness: &'a CompletenessStatus,
    report: &'a MonthlyReport,
}

impl JsonFilePublisher {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn report_path(&self, window: TimeWindow) -> PathBuf {
        self.output_dir
            .join(format!("report-{}.json", window.iso_month()))
    }
}

#[async_trait]
impl ReportPublisher for JsonFilePublisher {
    async fn publish(
        &self,
        report: &MonthlyReport,
        status: &CompletenessStatus,
    ) -> Result<(), PublishError> {
        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| PublishError::Io(e.to_string()))?;

        let body = serde_json::to_string_pretty(&Document {
            completeness: status,
            report,
        })
        .map_err(|e| PublishError::Encoding(e.to_string()))?;

        let path = self.report_path(report.metadata.period);
        fs::write(&path, body)
            .await
            .map_err(|e| PublishError::Io(e.to_string()))?;

        info!(path = %path.display(), "report published");
        Ok(())
    }
}
