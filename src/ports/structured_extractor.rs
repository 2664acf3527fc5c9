//! Structured extraction port.
//!
//! Turns free text into typed candidates with a confidence tier. Two
//! failure families are kept apart:
//!
//! - `LlmExtraction`: the model output could not be read at all
//!   (bad JSON, wrong shape). The user is simply asked again.
//! - `Ambiguous`: the output was readable but names nothing, several
//!   things, or something unknown. The user gets a targeted question.
//!
//! Neither is retried automatically; the transport underneath has already
//! spent its own retries on transient failures.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

use super::{ProjectRegistry, TransportError};
use crate::domain::conversation::SubmissionField;
use crate::domain::foundation::{ProjectId, TimeWindow, ValidationError};
use crate::domain::submission::{CoverageDraft, ExtractionConfidence, ExtractionResult};

/// Why a readable answer could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmbiguityKind {
    /// Nothing usable was stated.
    Missing,
    /// Several plausible candidates.
    Multiple(Vec<String>),
    /// A candidate that is not in the registry.
    Unknown(String),
}

impl fmt::Display for AmbiguityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbiguityKind::Missing => f.write_str("no value stated"),
            AmbiguityKind::Multiple(candidates) => {
                write!(f, "several candidates: {}", candidates.join(", "))
            }
            AmbiguityKind::Unknown(candidate) => write!(f, "unknown value '{}'", candidate),
        }
    }
}

/// Extraction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// Model output was malformed for `operation`.
    #[error("malformed model output for {operation}: {reason}")]
    LlmExtraction { operation: String, reason: String },

    /// Output was well-formed but could not be resolved to one value.
    #[error("ambiguous {field}: {kind}")]
    Ambiguous {
        field: SubmissionField,
        kind: AmbiguityKind,
    },

    /// The transport gave up.
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),
}

impl ExtractionError {
    pub fn malformed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LlmExtraction {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    pub fn missing(field: SubmissionField) -> Self {
        Self::Ambiguous {
            field,
            kind: AmbiguityKind::Missing,
        }
    }

    pub fn unknown(field: SubmissionField, candidate: impl Into<String>) -> Self {
        Self::Ambiguous {
            field,
            kind: AmbiguityKind::Unknown(candidate.into()),
        }
    }

    pub fn multiple(field: SubmissionField, candidates: Vec<String>) -> Self {
        Self::Ambiguous {
            field,
            kind: AmbiguityKind::Multiple(candidates),
        }
    }

    /// True for the missing-value ambiguity, the mildest failure.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            Self::Ambiguous {
                kind: AmbiguityKind::Missing,
                ..
            }
        )
    }
}

/// How a message referred to the reporting month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodStatement {
    Explicit(TimeWindow),
    CurrentMonth,
    PreviousMonth,
    /// No month was mentioned.
    Unspecified,
}

impl PeriodStatement {
    /// Resolves the statement against `today`.
    ///
    /// An unspecified month falls back to the grace-period default.
    pub fn resolve(&self, today: NaiveDate, grace_days: u32) -> Result<TimeWindow, ValidationError> {
        match self {
            PeriodStatement::Explicit(window) => Ok(*window),
            PeriodStatement::CurrentMonth => TimeWindow::containing(today),
            PeriodStatement::PreviousMonth => TimeWindow::preceding(today),
            PeriodStatement::Unspecified => TimeWindow::default_for(today, grace_days),
        }
    }

    pub fn is_stated(&self) -> bool {
        !matches!(self, PeriodStatement::Unspecified)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCandidate {
    pub project_id: ProjectId,
    pub confidence: ExtractionConfidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodCandidate {
    pub statement: PeriodStatement,
    pub confidence: ExtractionConfidence,
}

/// Coverage numbers stated in one message; unstated ones stay `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageCandidate {
    pub draft: CoverageDraft,
    pub confidence: ExtractionConfidence,
}

/// Input for a whole-history extraction pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryExtractionRequest {
    /// User messages, oldest first.
    pub messages: Vec<String>,
    pub grace_period_days: u32,
}

/// Port for turning text into typed submission values.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    /// Resolves the project a message talks about against `registry`.
    async fn extract_project_id(
        &self,
        text: &str,
        registry: &dyn ProjectRegistry,
    ) -> Result<ProjectCandidate, ExtractionError>;

    /// Reads how a message refers to the reporting month.
    async fn extract_period(&self, text: &str) -> Result<PeriodCandidate, ExtractionError>;

    /// Reads whatever coverage numbers a message states.
    async fn extract_coverage(&self, text: &str) -> Result<CoverageCandidate, ExtractionError>;

    /// Resolves a message to a concrete month, defaulting when none is stated.
    async fn extract_time_window(
        &self,
        text: &str,
        today: NaiveDate,
        grace_period_days: u32,
    ) -> Result<TimeWindow, ExtractionError> {
        let candidate = self.extract_period(text).await?;
        candidate
            .statement
            .resolve(today, grace_period_days)
            .map_err(|e| ExtractionError::malformed("extract_time_window", e.to_string()))
    }

    /// Runs every extractor over each message in order; the latest
    /// statement of a field wins.
    ///
    /// Messages that say nothing about a field leave it untouched. Fails
    /// when project or coverage is still unresolved at the end; an
    /// unstated month takes the grace-period default at medium confidence.
    async fn execute_with_history(
        &self,
        request: &HistoryExtractionRequest,
        today: NaiveDate,
        registry: &dyn ProjectRegistry,
    ) -> Result<ExtractionResult, ExtractionError> {
        let mut project: Option<ProjectCandidate> = None;
        let mut project_error: Option<ExtractionError> = None;
        let mut period: Option<(TimeWindow, ExtractionConfidence)> = None;
        let mut coverage = CoverageDraft::default();
        let mut coverage_confidence: Option<ExtractionConfidence> = None;
        let mut coverage_error: Option<ExtractionError> = None;

        for text in &request.messages {
            match self.extract_project_id(text, registry).await {
                Ok(candidate) => project = Some(candidate),
                Err(ExtractionError::Transport(e)) => return Err(ExtractionError::Transport(e)),
                Err(e) if e.is_missing() => {}
                Err(e) => project_error = Some(e),
            }

            match self.extract_period(text).await {
                Ok(candidate) if candidate.statement.is_stated() => {
                    let window = candidate
                        .statement
                        .resolve(today, request.grace_period_days)
                        .map_err(|e| ExtractionError::malformed("extract_period", e.to_string()))?;
                    period = Some((window, candidate.confidence));
                }
                Ok(_) => {}
                Err(ExtractionError::Transport(e)) => return Err(ExtractionError::Transport(e)),
                Err(_) => {}
            }

            match self.extract_coverage(text).await {
                Ok(candidate) if !candidate.draft.is_empty() => {
                    coverage.merge(&candidate.draft);
                    coverage_confidence = Some(match coverage_confidence {
                        Some(c) => c.min(candidate.confidence),
                        None => candidate.confidence,
                    });
                }
                Ok(_) => {}
                Err(ExtractionError::Transport(e)) => return Err(ExtractionError::Transport(e)),
                Err(e) => coverage_error = Some(e),
            }
        }

        let project = match project {
            Some(p) => p,
            None => {
                return Err(project_error
                    .unwrap_or_else(|| ExtractionError::missing(SubmissionField::Project)))
            }
        };

        let (window, period_confidence) = match period {
            Some(resolved) => resolved,
            None => {
                let window = TimeWindow::default_for(today, request.grace_period_days)
                    .map_err(|e| ExtractionError::malformed("extract_period", e.to_string()))?;
                (window, ExtractionConfidence::Medium)
            }
        };

        let metrics = match coverage.complete() {
            Some(m) => m,
            None => {
                return Err(coverage_error
                    .unwrap_or_else(|| ExtractionError::missing(SubmissionField::Metrics)))
            }
        };

        Ok(ExtractionResult {
            project_id: project.project_id,
            window,
            metrics,
            confidence: project
                .confidence
                .min(period_confidence)
                .min(coverage_confidence.unwrap_or_default()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::registry::{BusinessStream, Project};
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ─────────────────────────────────────────────────────────────────────
    // Keyword extractor and fixed registry
    // ─────────────────────────────────────────────────────────────────────

    struct Registry(Vec<Project>);

    impl ProjectRegistry for Registry {
        fn resolve(&self, candidate: &str) -> Option<ProjectId> {
            self.0.iter().find(|p| p.matches(candidate)).map(|p| p.id.clone())
        }

        fn project(&self, id: &ProjectId) -> Option<Project> {
            self.0.iter().find(|p| &p.id == id).cloned()
        }

        fn list_active(&self) -> Vec<ProjectId> {
            self.0.iter().map(|p| p.id.clone()).collect()
        }

        fn streams(&self) -> Vec<BusinessStream> {
            vec![BusinessStream::new("funding", "Funding", 1)]
        }
    }

    fn registry() -> Registry {
        Registry(vec![
            Project::new(ProjectId::new("payments").unwrap(), "Payments", "funding"),
            Project::new(ProjectId::new("withdrawals").unwrap(), "Withdrawals", "funding"),
        ])
    }

    /// Reads `project=`, `month=` and `manual=`/`automated=` tokens.
    #[derive(Default)]
    struct KeywordExtractor {
        calls: AtomicUsize,
        fail_transport: bool,
    }

    fn token<'a>(text: &'a str, key: &str) -> Option<&'a str> {
        text.split_whitespace()
            .find_map(|t| t.strip_prefix(key).and_then(|rest| rest.strip_prefix('=')))
    }

    #[async_trait]
    impl StructuredExtractor for KeywordExtractor {
        async fn extract_project_id(
            &self,
            text: &str,
            registry: &dyn ProjectRegistry,
        ) -> Result<ProjectCandidate, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_transport {
                return Err(TransportError::RateLimited.into());
            }
            let name = token(text, "project").ok_or(ExtractionError::missing(SubmissionField::Project))?;
            let project_id = registry
                .resolve(name)
                .ok_or_else(|| ExtractionError::unknown(SubmissionField::Project, name))?;
            Ok(ProjectCandidate {
                project_id,
                confidence: ExtractionConfidence::High,
            })
        }

        async fn extract_period(&self, text: &str) -> Result<PeriodCandidate, ExtractionError> {
            let statement = match token(text, "month") {
                Some("previous") => PeriodStatement::PreviousMonth,
                Some(value) => PeriodStatement::Explicit(
                    value.parse().map_err(|_| ExtractionError::malformed("extract_period", value))?,
                ),
                None => PeriodStatement::Unspecified,
            };
            Ok(PeriodCandidate {
                statement,
                confidence: ExtractionConfidence::High,
            })
        }

        async fn extract_coverage(&self, text: &str) -> Result<CoverageCandidate, ExtractionError> {
            let number = |key: &str| token(text, key).and_then(|v| v.parse::<i64>().ok());
            let delta = number("delta");
            Ok(CoverageCandidate {
                draft: CoverageDraft {
                    manual_total: number("manual"),
                    automated_total: number("automated"),
                    manual_created_last_month: delta,
                    manual_updated_last_month: delta,
                    automated_created_last_month: delta,
                    automated_updated_last_month: delta,
                },
                confidence: ExtractionConfidence::High,
            })
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()
    }

    fn request(messages: &[&str]) -> HistoryExtractionRequest {
        HistoryExtractionRequest {
            messages: messages.iter().map(|m| m.to_string()).collect(),
            grace_period_days: 2,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // execute_with_history
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn later_statements_override_earlier_ones() {
        let extractor = KeywordExtractor::default();
        let result = extractor
            .execute_with_history(
                &request(&[
                    "project=payments month=2026-03 manual=10 automated=5 delta=1",
                    "sorry project=withdrawals automated=7",
                ]),
                today(),
                &registry(),
            )
            .await
            .unwrap();

        assert_eq!(result.project_id.as_str(), "withdrawals");
        assert_eq!(result.window.iso_month(), "2026-03");
        assert_eq!(result.metrics.manual_total, 10);
        assert_eq!(result.metrics.automated_total, 7);
        assert_eq!(result.confidence, ExtractionConfidence::High);
    }

    #[tokio::test]
    async fn rerunning_on_unchanged_history_gives_the_same_result() {
        let extractor = KeywordExtractor::default();
        let req = request(&["project=payments manual=1 automated=2 delta=0", "month=previous"]);

        let first = extractor.execute_with_history(&req, today(), &registry()).await.unwrap();
        let second = extractor.execute_with_history(&req, today(), &registry()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.window.iso_month(), "2026-04");
    }

    #[tokio::test]
    async fn unstated_month_defaults_with_medium_confidence() {
        let extractor = KeywordExtractor::default();
        let result = extractor
            .execute_with_history(
                &request(&["project=payments manual=1 automated=2 delta=0"]),
                today(),
                &registry(),
            )
            .await
            .unwrap();

        assert_eq!(result.window.iso_month(), "2026-05");
        assert_eq!(result.confidence, ExtractionConfidence::Medium);
    }

    #[tokio::test]
    async fn unknown_project_surfaces_when_nothing_resolved() {
        let extractor = KeywordExtractor::default();
        let err = extractor
            .execute_with_history(
                &request(&["project=ghost manual=1 automated=2 delta=0"]),
                today(),
                &registry(),
            )
            .await
            .unwrap_err();

        assert_eq!(err, ExtractionError::unknown(SubmissionField::Project, "ghost"));
    }

    #[tokio::test]
    async fn incomplete_coverage_is_ambiguous() {
        let extractor = KeywordExtractor::default();
        let err = extractor
            .execute_with_history(&request(&["project=payments manual=3"]), today(), &registry())
            .await
            .unwrap_err();

        assert_eq!(err, ExtractionError::missing(SubmissionField::Metrics));
    }

    #[tokio::test]
    async fn transport_failure_stops_the_pass() {
        let extractor = KeywordExtractor {
            fail_transport: true,
            ..Default::default()
        };
        let err = extractor
            .execute_with_history(&request(&["a", "b", "c"]), today(), &registry())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::Transport(TransportError::RateLimited)));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn extract_time_window_applies_default_rule() {
        let extractor = KeywordExtractor::default();
        let early = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();

        let window = extractor.extract_time_window("no month here", early, 2).await.unwrap();
        assert_eq!(window.iso_month(), "2026-04");

        let window = extractor.extract_time_window("month=2026-01", early, 2).await.unwrap();
        assert_eq!(window.iso_month(), "2026-01");
    }

    #[test]
    fn ambiguity_display() {
        let err = ExtractionError::multiple(
            SubmissionField::Project,
            vec!["payments".into(), "withdrawals".into()],
        );
        assert_eq!(err.to_string(), "ambiguous project: several candidates: payments, withdrawals");
    }
}
