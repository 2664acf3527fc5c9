//! Keeps published reports in memory, latest per month.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::TimeWindow;
use crate::domain::reporting::{CompletenessStatus, MonthlyReport};
use crate::ports::{PublishError, ReportPublisher};

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedReport {
    pub report: MonthlyReport,
    pub status: CompletenessStatus,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryPublisher {
    reports: Arc<RwLock<BTreeMap<TimeWindow, PublishedReport>>>,
    publish_count: Arc<RwLock<usize>>,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn latest(&self, window: TimeWindow) -> Option<PublishedReport> {
        self.reports.read().await.get(&window).cloned()
    }

    pub async fn publish_count(&self) -> usize {
        *self.publish_count.read().await
    }
}

#[async_trait]
impl ReportPublisher for InMemoryPublisher {
    async fn publish(
        &self,
        report: &MonthlyReport,
        status: &CompletenessStatus,
    ) -> Result<(), PublishError> {
        let window = report.metadata.period;
        self.reports.write().await.insert(
            window,
            PublishedReport {
                report: report.clone(),
                status: status.clone(),
            },
        );
        *self.publish_count.write().await += 1;
        Ok(())
    }
}
