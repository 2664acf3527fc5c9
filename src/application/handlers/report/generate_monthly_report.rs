//! ReportAggregationEngine - builds the monthly quality report for every
//! active project.
//!
//! Projects are fetched concurrently and merged back in registry order.
//! Each source call is bounded by a timeout; a failing or slow call only
//! empties its own cell and is listed in the completeness verdict.

use chrono::{FixedOffset, Offset, Utc};
use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::domain::registry::Project;
use crate::domain::reporting::{
    CompletenessStatus, CoverageReportRow, LeakageCell, MissingCell, MonthlyReport,
    PortfolioAggregate, QualityReportRow, RatePolicy, ReportField, ReportMetadata,
    ZeroDenominatorPolicy,
};
use crate::domain::submission::SubmissionMetrics;
use crate::ports::{
    Clock, IssueTracker, ProjectRegistry, RegressionTimeSource, ReleaseCalendar, SourceError,
    SubmissionRepository,
};

/// Rendering and fetch settings for one engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSettings {
    pub leakage_zero_denominator: ZeroDenominatorPolicy,
    pub automation_zero_total: ZeroDenominatorPolicy,
    pub rounding_decimals: u32,
    /// Offset used for period start and end instants.
    pub offset: FixedOffset,
    /// Upper bound for each per-project source call.
    pub source_timeout: Duration,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            leakage_zero_denominator: ZeroDenominatorPolicy::Zero,
            automation_zero_total: ZeroDenominatorPolicy::Zero,
            rounding_decimals: 2,
            offset: Utc.fix(),
            source_timeout: Duration::from_secs(10),
        }
    }
}

impl ReportSettings {
    pub fn with_zero_denominator(
        mut self,
        leakage: ZeroDenominatorPolicy,
        automation: ZeroDenominatorPolicy,
    ) -> Self {
        self.leakage_zero_denominator = leakage;
        self.automation_zero_total = automation;
        self
    }

    pub fn with_rounding_decimals(mut self, decimals: u32) -> Self {
        self.rounding_decimals = decimals;
        self
    }

    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub fn leakage_policy(&self) -> RatePolicy {
        RatePolicy::new(self.leakage_zero_denominator, self.rounding_decimals)
    }

    pub fn automation_policy(&self) -> RatePolicy {
        RatePolicy::new(self.automation_zero_total, self.rounding_decimals)
    }
}

/// Rows and missing cells for one project.
struct ProjectRows {
    quality: QualityReportRow,
    coverage: CoverageReportRow,
    missing: Vec<MissingCell>,
}

pub struct ReportAggregationEngine {
    registry: Arc<dyn ProjectRegistry>,
    repository: Arc<dyn SubmissionRepository>,
    issues: Arc<dyn IssueTracker>,
    releases: Arc<dyn ReleaseCalendar>,
    regressions: Arc<dyn RegressionTimeSource>,
    clock: Arc<dyn Clock>,
    settings: ReportSettings,
}

impl ReportAggregationEngine {
    pub fn new(
        registry: Arc<dyn ProjectRegistry>,
        repository: Arc<dyn SubmissionRepository>,
        issues: Arc<dyn IssueTracker>,
        releases: Arc<dyn ReleaseCalendar>,
        regressions: Arc<dyn RegressionTimeSource>,
        clock: Arc<dyn Clock>,
        settings: ReportSettings,
    ) -> Self {
        Self {
            registry,
            repository,
            issues,
            releases,
            regressions,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Builds the report for `window` with its completeness verdict.
    ///
    /// Never fails outright: a report that cannot be built at all comes
    /// back empty with a `Failed` verdict.
    pub async fn generate(&self, window: TimeWindow) -> (MonthlyReport, CompletenessStatus) {
        let started = Instant::now();

        let projects: Vec<Project> = self
            .registry
            .list_active()
            .iter()
            .filter_map(|id| self.registry.project(id))
            .collect();

        if projects.is_empty() {
            warn!(period = %window, "no active projects, report not produced");
            let report = self.assemble(window, Vec::new(), Vec::new(), None);
            return (report, CompletenessStatus::failed("no active projects in registry"));
        }

        let stream_names: HashMap<String, String> = self
            .registry
            .streams()
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect();

        // join_all keeps input order, so rows follow the registry.
        let outcomes = join_all(
            projects
                .iter()
                .map(|project| self.project_rows(project, window, &stream_names)),
        )
        .await;

        let overall_test_cases = self.overall_test_cases(window).await;

        let mut quality_rows = Vec::with_capacity(outcomes.len());
        let mut coverage_rows = Vec::with_capacity(outcomes.len());
        let mut missing = Vec::new();
        for outcome in outcomes {
            quality_rows.push(outcome.quality);
            coverage_rows.push(outcome.coverage);
            missing.extend(outcome.missing);
        }

        let report = self.assemble(window, quality_rows, coverage_rows, overall_test_cases);
        let status = CompletenessStatus::from_missing(missing);
        info!(
            period = %window,
            projects = report.quality_rows.len(),
            missing = status.missing().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "monthly report generated"
        );
        (report, status)
    }

    async fn project_rows(
        &self,
        project: &Project,
        window: TimeWindow,
        stream_names: &HashMap<String, String>,
    ) -> ProjectRows {
        let id = &project.id;
        let (releases, bugs, incidents, leakage, regressions, submission) = tokio::join!(
            self.bounded(self.releases.get_supported_releases(id, window)),
            self.bounded(self.issues.get_bug_counts(id, window)),
            self.bounded(self.issues.get_incident_counts(id, window)),
            self.bounded(self.issues.get_defect_leakage(id, window)),
            self.bounded(self.regressions.get_regression_times(id, window)),
            self.submission_metrics(id, window),
        );

        let mut missing = Vec::new();
        let mut note_missing = |field: ReportField, reason: Option<String>| {
            if let Some(reason) = reason {
                warn!(project_id = %id, field = %field, reason = %reason, "report cell missing");
                missing.push(MissingCell::new(id.clone(), field, reason));
            }
        };

        note_missing(ReportField::SupportedReleases, releases.as_ref().err().cloned());
        note_missing(ReportField::BugCounts, bugs.as_ref().err().cloned());
        note_missing(ReportField::IncidentCounts, incidents.as_ref().err().cloned());
        note_missing(ReportField::DefectLeakage, leakage.as_ref().err().cloned());
        note_missing(ReportField::RegressionTimes, regressions.as_ref().err().cloned());
        note_missing(ReportField::TestCoverage, submission.as_ref().err().cloned());

        let stream = stream_names
            .get(&project.business_stream)
            .cloned()
            .unwrap_or_else(|| project.business_stream.clone());
        let leakage_policy = self.settings.leakage_policy();

        ProjectRows {
            quality: QualityReportRow {
                project_id: id.clone(),
                project_name: project.name.clone(),
                business_stream: stream.clone(),
                supported_releases: releases.ok(),
                bugs: bugs.ok(),
                incidents: incidents.ok(),
                leakage: leakage.ok().map(|l| LeakageCell::compute(l, &leakage_policy)),
                regression_times: regressions.ok(),
            },
            coverage: CoverageReportRow::compute(
                id.clone(),
                project.name.clone(),
                stream,
                submission.ok(),
                &self.settings.automation_policy(),
            ),
            missing,
        }
    }

    /// Runs one source call under the per-source timeout.
    async fn bounded<T, F>(&self, call: F) -> Result<T, String>
    where
        F: Future<Output = Result<T, SourceError>>,
    {
        match tokio::time::timeout(self.settings.source_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(err.reason()),
            Err(_) => Err("timed out".to_string()),
        }
    }

    async fn submission_metrics(
        &self,
        project_id: &ProjectId,
        window: TimeWindow,
    ) -> Result<SubmissionMetrics, String> {
        let lookup = self.repository.get_submission(project_id, window);
        match tokio::time::timeout(self.settings.source_timeout, lookup).await {
            Ok(Ok(Some(submission))) => Ok(submission.metrics),
            Ok(Ok(None)) => Err("no submission".to_string()),
            Ok(Err(err)) => Err(err.to_string()),
            Err(_) => Err("timed out".to_string()),
        }
    }

    /// Manual plus automated totals over every stored submission for the month.
    async fn overall_test_cases(&self, window: TimeWindow) -> Option<i64> {
        match self.repository.get_submissions_by_period(window).await {
            Ok(submissions) if submissions.is_empty() => None,
            Ok(submissions) => Some(
                submissions
                    .iter()
                    .map(|s| s.metrics.total_test_cases())
                    .fold(0_i64, i64::saturating_add),
            ),
            Err(err) => {
                warn!(period = %window, error = %err, "could not total test cases");
                None
            }
        }
    }

    fn assemble(
        &self,
        window: TimeWindow,
        quality_rows: Vec<QualityReportRow>,
        coverage_rows: Vec<CoverageReportRow>,
        overall_test_cases: Option<i64>,
    ) -> MonthlyReport {
        let portfolio = PortfolioAggregate::compute(&quality_rows, &self.settings.leakage_policy());
        MonthlyReport {
            metadata: ReportMetadata {
                period: window,
                period_start: window.start(self.settings.offset),
                period_end: window.end(self.settings.offset),
                generated_at: self.clock.now(),
                rounding_decimals: self.settings.rounding_decimals,
                leakage_zero_denominator: self.settings.leakage_zero_denominator,
                automation_zero_total: self.settings.automation_zero_total,
            },
            quality_rows,
            coverage_rows,
            portfolio,
            overall_test_cases,
        }
    }
}
