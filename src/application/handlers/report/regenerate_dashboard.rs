//! Dashboard regeneration through the report engine.
//!
//! A partial report is still published; only a failed one is refused.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::ReportAggregationEngine;
use crate::domain::foundation::TimeWindow;
use crate::domain::reporting::CompletenessStatus;
use crate::ports::{DashboardError, DashboardRegenerator, ReportPublisher};

pub struct ReportDashboard {
    engine: Arc<ReportAggregationEngine>,
    publisher: Arc<dyn ReportPublisher>,
}

impl ReportDashboard {
    pub fn new(engine: Arc<ReportAggregationEngine>, publisher: Arc<dyn ReportPublisher>) -> Self {
        Self { engine, publisher }
    }
}

#[async_trait]
impl DashboardRegenerator for ReportDashboard {
    async fn regenerate(&self, window: TimeWindow) -> Result<(), DashboardError> {
        let (report, status) = self.engine.generate(window).await;
        if let CompletenessStatus::Failed { reason } = &status {
            return Err(DashboardError::Generation(reason.clone()));
        }
        self.publisher.publish(&report, &status).await?;
        info!(period = %window, complete = status.is_complete(), "dashboard regenerated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::publishing::InMemoryPublisher;
    use crate::adapters::registry::StaticProjectRegistry;
    use crate::adapters::sources::{ConfiguredRegressionTimes, ManualReleaseCalendar, MockIssueTracker};
    use crate::adapters::storage::InMemorySubmissionRepository;
    use crate::adapters::FixedClock;
    use crate::application::handlers::report::ReportSettings;
    use crate::domain::reporting::MonthlyReport;
    use crate::ports::PublishError;
    use chrono::NaiveDate;

    fn engine(registry: StaticProjectRegistry) -> Arc<ReportAggregationEngine> {
        Arc::new(ReportAggregationEngine::new(
            Arc::new(registry),
            Arc::new(InMemorySubmissionRepository::new()),
            Arc::new(MockIssueTracker::new()),
            Arc::new(ManualReleaseCalendar::new().with_default(1)),
            Arc::new(ConfiguredRegressionTimes::new()),
            Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2026, 6, 3).unwrap())),
            ReportSettings::default(),
        ))
    }

    fn may() -> TimeWindow {
        TimeWindow::new(2026, 5).unwrap()
    }

    struct BrokenPublisher;

    #[async_trait]
    impl ReportPublisher for BrokenPublisher {
        async fn publish(
            &self,
            _report: &MonthlyReport,
            _status: &CompletenessStatus,
        ) -> Result<(), PublishError> {
            Err(PublishError::Io("read-only volume".to_string()))
        }
    }

    #[tokio::test]
    async fn partial_report_is_published() {
        let publisher = Arc::new(InMemoryPublisher::new());
        let dashboard = ReportDashboard::new(
            engine(StaticProjectRegistry::default_registry()),
            publisher.clone(),
        );

        dashboard.regenerate(may()).await.unwrap();

        let published = publisher.latest(may()).await.unwrap();
        // Nothing has been submitted, so coverage is missing everywhere.
        assert!(!published.status.missing().is_empty());
        assert_eq!(publisher.publish_count().await, 1);
    }

    #[tokio::test]
    async fn failed_report_is_not_published() {
        let publisher = Arc::new(InMemoryPublisher::new());
        let dashboard = ReportDashboard::new(engine(StaticProjectRegistry::empty()), publisher.clone());

        let err = dashboard.regenerate(may()).await.unwrap_err();

        assert!(matches!(err, DashboardError::Generation(_)));
        assert_eq!(publisher.publish_count().await, 0);
    }

    #[tokio::test]
    async fn publisher_failure_surfaces() {
        let dashboard = ReportDashboard::new(
            engine(StaticProjectRegistry::default_registry()),
            Arc::new(BrokenPublisher),
        );

        let err = dashboard.regenerate(may()).await.unwrap_err();

        assert_eq!(err, DashboardError::Publish(PublishError::Io("read-only volume".to_string())));
    }
}
