//! ConversationStateMachine - turns one user message into the next prompt or
//! the finalized submission.
//!
//! Every message runs through all three extractors, so values stated out of
//! order are cached as they appear. The stage then advances to the first
//! field that is still unresolved.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::conversation::{
    correction_target, is_affirmative, is_bare_affirmative, is_cancel, summarize, ConversationSession,
    ConversationStage, FollowUp, SubmissionField,
};
use crate::domain::foundation::{DomainError, ErrorCode, TimeWindow, ValidationError};
use crate::domain::submission::{ExtractionConfidence, SubmissionCommand};
use crate::ports::{AmbiguityKind, Clock, ExtractionError, ProjectRegistry, StructuredExtractor};

/// Tunables for one conversation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationPolicy {
    /// Failed answers tolerated per field before the session is abandoned.
    pub max_clarification_attempts: u32,
    pub grace_period_days: u32,
    /// Skip the confirmation turn when every field meets the threshold.
    pub auto_accept: bool,
    pub acceptance_threshold: ExtractionConfidence,
}

impl Default for ConversationPolicy {
    fn default() -> Self {
        Self {
            max_clarification_attempts: 3,
            grace_period_days: 2,
            auto_accept: false,
            acceptance_threshold: ExtractionConfidence::High,
        }
    }
}

impl ConversationPolicy {
    pub fn with_max_clarification_attempts(mut self, attempts: u32) -> Self {
        self.max_clarification_attempts = attempts;
        self
    }

    pub fn with_grace_period_days(mut self, days: u32) -> Self {
        self.grace_period_days = days;
        self
    }

    pub fn with_auto_accept(mut self, threshold: ExtractionConfidence) -> Self {
        self.auto_accept = true;
        self.acceptance_threshold = threshold;
        self
    }
}

/// What the caller should do after a message.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationReply {
    /// Show this prompt and wait for the next message.
    Prompt(FollowUp),
    /// The conversation is finished; hand this to the finalizer.
    Submission(SubmissionCommand),
}

impl ConversationReply {
    pub fn prompt(&self) -> Option<&FollowUp> {
        match self {
            ConversationReply::Prompt(follow_up) => Some(follow_up),
            ConversationReply::Submission(_) => None,
        }
    }

    pub fn submission(&self) -> Option<&SubmissionCommand> {
        match self {
            ConversationReply::Submission(command) => Some(command),
            ConversationReply::Prompt(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    #[error("session is closed ({stage:?})")]
    SessionClosed { stage: ConversationStage },

    /// The session has been abandoned.
    #[error("gave up on {field} after {attempts} unclear answers")]
    ClarificationLimitExceeded { field: SubmissionField, attempts: u32 },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ConversationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConversationError::SessionClosed { .. } => ErrorCode::SessionClosed,
            ConversationError::ClarificationLimitExceeded { .. } => {
                ErrorCode::ClarificationLimitExceeded
            }
            ConversationError::Extraction(ExtractionError::Transport(_)) => {
                ErrorCode::TransportFailed
            }
            ConversationError::Extraction(ExtractionError::Ambiguous { .. }) => {
                ErrorCode::AmbiguousExtraction
            }
            ConversationError::Extraction(ExtractionError::LlmExtraction { .. }) => {
                ErrorCode::ExtractionFailed
            }
            ConversationError::Validation(err) => err.code(),
        }
    }
}

impl From<ConversationError> for DomainError {
    fn from(err: ConversationError) -> Self {
        let domain = DomainError::new(err.code(), err.to_string());
        match err {
            ConversationError::ClarificationLimitExceeded { field, attempts } => domain
                .with_detail("field", field.as_str())
                .with_detail("attempts", attempts.to_string()),
            ConversationError::SessionClosed { stage } => {
                domain.with_detail("stage", format!("{:?}", stage))
            }
            _ => domain,
        }
    }
}

/// Outcome of running the extractors over one message.
#[derive(Debug, Default)]
struct Absorbed {
    changed: bool,
    failure: Option<(SubmissionField, ExtractionError)>,
}

impl Absorbed {
    fn fail(&mut self, field: SubmissionField, error: ExtractionError) {
        if self.failure.is_none() {
            self.failure = Some((field, error));
        }
    }
}

pub struct ConversationStateMachine {
    extractor: Arc<dyn StructuredExtractor>,
    registry: Arc<dyn ProjectRegistry>,
    clock: Arc<dyn Clock>,
    policy: ConversationPolicy,
}

impl ConversationStateMachine {
    pub fn new(
        extractor: Arc<dyn StructuredExtractor>,
        registry: Arc<dyn ProjectRegistry>,
        clock: Arc<dyn Clock>,
        policy: ConversationPolicy,
    ) -> Self {
        Self {
            extractor,
            registry,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &ConversationPolicy {
        &self.policy
    }

    /// Opening question for a fresh session.
    pub fn start(&self, session: &mut ConversationSession) -> FollowUp {
        let prompt = FollowUp::ask_project();
        session.push_follow_up(prompt.clone());
        prompt
    }

    pub async fn handle_message(
        &self,
        session: &mut ConversationSession,
        text: &str,
    ) -> Result<ConversationReply, ConversationError> {
        if session.is_closed() {
            return Err(ConversationError::SessionClosed {
                stage: session.stage(),
            });
        }

        let text = text.trim();
        if text.is_empty() {
            let current = session
                .pending_follow_up()
                .cloned()
                .unwrap_or_else(FollowUp::ask_project);
            return Ok(ConversationReply::Prompt(FollowUp::nudge(&current)));
        }

        let index = session.push_user(text);

        if is_cancel(text) {
            info!(session_id = %session.id(), stage = ?session.stage(), "submission cancelled");
            session.push_follow_up(FollowUp::cancelled());
            session.abandon()?;
            return Ok(ConversationReply::Prompt(FollowUp::cancelled()));
        }

        if session.stage() == ConversationStage::AwaitingConfirmation {
            return self.handle_confirmation_reply(session, text, index).await;
        }

        let current = session.stage().awaited_field();
        let absorbed = self.absorb(session, text, index, current).await?;
        self.respond(session, absorbed).await
    }

    async fn handle_confirmation_reply(
        &self,
        session: &mut ConversationSession,
        text: &str,
        index: usize,
    ) -> Result<ConversationReply, ConversationError> {
        if is_bare_affirmative(text) {
            return self.finalize(session);
        }

        if let Some(field) = correction_target(text) {
            info!(session_id = %session.id(), field = %field, "correction requested");
            session.clear_field(field, index);
            let absorbed = self.absorb(session, text, index, None).await?;
            return self.respond(session, Absorbed { failure: None, ..absorbed }).await;
        }

        // "ok, manual=12" approves only after the new number is read
        let absorbed = self.absorb(session, text, index, None).await?;
        if absorbed.changed {
            return self.respond(session, absorbed).await;
        }
        if is_affirmative(text) {
            return self.finalize(session);
        }

        let prompt = FollowUp::which_section();
        session.push_follow_up(prompt.clone());
        Ok(ConversationReply::Prompt(prompt))
    }

    /// Runs every extractor over `text` and caches whatever resolves.
    ///
    /// Failures only count against `current`; other fields stay as cached.
    /// A transport failure aborts the pass and leaves the stage unchanged.
    async fn absorb(
        &self,
        session: &mut ConversationSession,
        text: &str,
        index: usize,
        current: Option<SubmissionField>,
    ) -> Result<Absorbed, ConversationError> {
        let mut absorbed = Absorbed::default();

        match self
            .extractor
            .extract_project_id(text, self.registry.as_ref())
            .await
        {
            Ok(candidate) => {
                let unchanged = session
                    .project()
                    .is_some_and(|p| p.value == candidate.project_id);
                if !unchanged {
                    debug!(project_id = %candidate.project_id, confidence = %candidate.confidence, "project resolved");
                    session.resolve_project(candidate.project_id, candidate.confidence, index);
                    absorbed.changed = true;
                }
                session.reset_attempts(SubmissionField::Project);
            }
            Err(ExtractionError::Transport(err)) => return Err(ExtractionError::Transport(err).into()),
            Err(err) => {
                if current == Some(SubmissionField::Project) {
                    absorbed.fail(SubmissionField::Project, err);
                }
            }
        }

        match self.extractor.extract_period(text).await {
            Ok(candidate) if candidate.statement.is_stated() => {
                match candidate
                    .statement
                    .resolve(self.clock.today(), self.policy.grace_period_days)
                {
                    Ok(window) => {
                        if self.cache_period(session, window, candidate.confidence, index) {
                            absorbed.changed = true;
                        }
                    }
                    Err(err) => {
                        if current == Some(SubmissionField::Period) {
                            absorbed.fail(
                                SubmissionField::Period,
                                ExtractionError::malformed("extract_period", err.to_string()),
                            );
                        }
                    }
                }
            }
            Ok(_) => {
                // Unstated month answers the month question with the default.
                if current == Some(SubmissionField::Period)
                    && !session.is_resolved(SubmissionField::Period)
                {
                    let window = self.default_window()?;
                    self.cache_period(session, window, ExtractionConfidence::Medium, index);
                    absorbed.changed = true;
                }
            }
            Err(ExtractionError::Transport(err)) => return Err(ExtractionError::Transport(err).into()),
            Err(err) => {
                if current == Some(SubmissionField::Period) {
                    absorbed.fail(SubmissionField::Period, err);
                }
            }
        }

        match self.extractor.extract_coverage(text).await {
            Ok(candidate) if !candidate.draft.is_empty() => {
                session.merge_coverage(&candidate.draft, candidate.confidence, index);
                session.reset_attempts(SubmissionField::Metrics);
                absorbed.changed = true;
            }
            Ok(_) => {
                if current == Some(SubmissionField::Metrics) {
                    absorbed.fail(
                        SubmissionField::Metrics,
                        ExtractionError::missing(SubmissionField::Metrics),
                    );
                }
            }
            Err(ExtractionError::Transport(err)) => return Err(ExtractionError::Transport(err).into()),
            Err(err) => {
                if current == Some(SubmissionField::Metrics) {
                    absorbed.fail(SubmissionField::Metrics, err);
                }
            }
        }

        Ok(absorbed)
    }

    /// Caches `window` and reports whether the cached value changed.
    fn cache_period(
        &self,
        session: &mut ConversationSession,
        window: TimeWindow,
        confidence: ExtractionConfidence,
        index: usize,
    ) -> bool {
        session.reset_attempts(SubmissionField::Period);
        if session.period().is_some_and(|p| p.value == window) {
            return false;
        }
        debug!(period = %window, confidence = %confidence, "period resolved");
        session.resolve_period(window, confidence, index);
        true
    }

    fn default_window(&self) -> Result<TimeWindow, ValidationError> {
        TimeWindow::default_for(self.clock.today(), self.policy.grace_period_days)
    }

    /// Clarifies a failed field, or advances to the next open one.
    async fn respond(
        &self,
        session: &mut ConversationSession,
        absorbed: Absorbed,
    ) -> Result<ConversationReply, ConversationError> {
        if let Some((field, error)) = absorbed.failure {
            if !session.is_resolved(field) {
                return self.clarify(session, field, &error);
            }
        }
        self.advance(session)
    }

    fn clarify(
        &self,
        session: &mut ConversationSession,
        field: SubmissionField,
        error: &ExtractionError,
    ) -> Result<ConversationReply, ConversationError> {
        let attempts = session.record_attempt(field);
        warn!(
            session_id = %session.id(),
            field = %field,
            attempt = attempts,
            error = %error,
            "could not resolve field"
        );

        if attempts > self.policy.max_clarification_attempts {
            session.abandon()?;
            return Err(ConversationError::ClarificationLimitExceeded { field, attempts });
        }

        // A partial coverage answer is progress, not confusion.
        if field == SubmissionField::Metrics && error.is_missing() {
            if let Some(coverage) = session.coverage() {
                let prompt = FollowUp::ask_metrics(&coverage.value.missing_fields());
                session.push_follow_up(prompt.clone());
                return Ok(ConversationReply::Prompt(prompt));
            }
        }

        let prompt = FollowUp::clarify(field, clarification_reason(error));
        session.push_follow_up(prompt.clone());
        Ok(ConversationReply::Prompt(prompt))
    }

    fn advance(
        &self,
        session: &mut ConversationSession,
    ) -> Result<ConversationReply, ConversationError> {
        let from = session.stage();

        let prompt = match session.first_unresolved() {
            Some(field) => {
                session.transition_to(field.awaiting_stage())?;
                match field {
                    SubmissionField::Project => FollowUp::ask_project(),
                    SubmissionField::Period => FollowUp::ask_period(self.default_window()?),
                    SubmissionField::Metrics => {
                        let missing = session
                            .coverage()
                            .map(|c| c.value.missing_fields())
                            .unwrap_or_default();
                        FollowUp::ask_metrics(&missing)
                    }
                }
            }
            None => {
                session.transition_to(ConversationStage::AwaitingConfirmation)?;
                if self.policy.auto_accept && session.all_meet(self.policy.acceptance_threshold) {
                    info!(session_id = %session.id(), "all fields meet threshold, auto-accepting");
                    return self.finalize(session);
                }
                match session.extraction_result() {
                    Some(result) => FollowUp::confirm(summarize(
                        &result.project_id,
                        result.window,
                        &result.metrics,
                    )),
                    None => return Err(ValidationError::empty_field("metrics").into()),
                }
            }
        };

        if from != session.stage() {
            info!(session_id = %session.id(), from = ?from, to = ?session.stage(), "stage transition");
        }
        session.push_follow_up(prompt.clone());
        Ok(ConversationReply::Prompt(prompt))
    }

    fn finalize(
        &self,
        session: &mut ConversationSession,
    ) -> Result<ConversationReply, ConversationError> {
        let result = session.finalize()?;
        info!(
            session_id = %session.id(),
            project_id = %result.project_id,
            period = %result.window,
            confidence = %result.confidence,
            "submission finalized"
        );
        let command = SubmissionCommand::new(result.project_id, result.window, result.metrics)
            .with_raw_conversation(session.transcript())
            .with_submitted_at(self.clock.now());
        Ok(ConversationReply::Submission(command))
    }
}

/// Sentence placed before the re-asked question.
fn clarification_reason(error: &ExtractionError) -> String {
    match error {
        ExtractionError::Ambiguous { kind, .. } => match kind {
            AmbiguityKind::Missing => "I couldn't find that in your message.".to_string(),
            AmbiguityKind::Multiple(candidates) => {
                format!("That could be any of: {}.", candidates.join(", "))
            }
            AmbiguityKind::Unknown(candidate) => {
                format!("I don't recognise '{}'.", candidate)
            }
        },
        ExtractionError::LlmExtraction { .. } => "I couldn't read that answer.".to_string(),
        ExtractionError::Transport(_) => "Something went wrong on my side.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::registry::StaticProjectRegistry;
    use crate::adapters::FixedClock;
    use crate::domain::conversation::FollowUpKind;
    use crate::domain::foundation::ProjectId;
    use crate::domain::submission::CoverageDraft;
    use crate::ports::{
        CoverageCandidate, PeriodCandidate, PeriodStatement, ProjectCandidate, TransportError,
    };
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Reads `project=`, `month=`, `manual=`, `automated=` and `delta=` tokens.
    ///
    /// `project=a|b` reports several candidates; `month=garbled` is malformed.
    #[derive(Default)]
    struct KeywordExtractor {
        confidence: Option<ExtractionConfidence>,
        fail_transport: AtomicBool,
    }

    impl KeywordExtractor {
        fn with_confidence(confidence: ExtractionConfidence) -> Self {
            Self {
                confidence: Some(confidence),
                ..Default::default()
            }
        }

        fn confidence(&self) -> ExtractionConfidence {
            self.confidence.unwrap_or(ExtractionConfidence::High)
        }
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
            if self.fail_transport.load(Ordering::SeqCst) {
                return Err(TransportError::RateLimited.into());
            }
            let name = token(text, "project")
                .ok_or(ExtractionError::missing(SubmissionField::Project))?;
            if name.contains('|') {
                let names = name.split('|').map(str::to_string).collect();
                return Err(ExtractionError::multiple(SubmissionField::Project, names));
            }
            let project_id = registry
                .resolve(name)
                .ok_or_else(|| ExtractionError::unknown(SubmissionField::Project, name))?;
            Ok(ProjectCandidate {
                project_id,
                confidence: self.confidence(),
            })
        }

        async fn extract_period(&self, text: &str) -> Result<PeriodCandidate, ExtractionError> {
            let statement = match token(text, "month") {
                Some("previous") => PeriodStatement::PreviousMonth,
                Some("current") => PeriodStatement::CurrentMonth,
                Some(value) => PeriodStatement::Explicit(
                    value
                        .parse()
                        .map_err(|_| ExtractionError::malformed("extract_period", value))?,
                ),
                None => PeriodStatement::Unspecified,
            };
            Ok(PeriodCandidate {
                statement,
                confidence: self.confidence(),
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
                confidence: self.confidence(),
            })
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()
    }

    fn machine_with(extractor: KeywordExtractor, policy: ConversationPolicy) -> ConversationStateMachine {
        ConversationStateMachine::new(
            Arc::new(extractor),
            Arc::new(StaticProjectRegistry::default_registry()),
            Arc::new(FixedClock::new(today())),
            policy,
        )
    }

    fn machine() -> ConversationStateMachine {
        machine_with(KeywordExtractor::default(), ConversationPolicy::default())
    }

    fn window(year: i32, month: u32) -> TimeWindow {
        TimeWindow::new(year, month).unwrap()
    }

    const FULL_COVERAGE: &str = "manual=10 automated=30 delta=2";

    async fn say(
        machine: &ConversationStateMachine,
        session: &mut ConversationSession,
        text: &str,
    ) -> ConversationReply {
        machine.handle_message(session, text).await.unwrap()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Linear flow
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn walks_through_each_field_then_confirms() {
        let machine = machine();
        let mut session = ConversationSession::new();
        machine.start(&mut session);

        let reply = say(&machine, &mut session, "project=payments").await;
        assert_eq!(session.stage(), ConversationStage::AwaitingPeriod);
        assert_eq!(reply.prompt().unwrap().field, Some(SubmissionField::Period));

        say(&machine, &mut session, "month=2026-04").await;
        assert_eq!(session.stage(), ConversationStage::AwaitingMetrics);

        let reply = say(&machine, &mut session, FULL_COVERAGE).await;
        assert_eq!(session.stage(), ConversationStage::AwaitingConfirmation);
        assert_eq!(reply.prompt().unwrap().kind, FollowUpKind::Confirmation);

        let reply = say(&machine, &mut session, "yes").await;
        let command = reply.submission().unwrap();
        assert_eq!(command.project_id.as_str(), "payments");
        assert_eq!(command.window, window(2026, 4));
        assert_eq!(command.metrics.automated_total, 30);
        assert!(session.is_finalized());
    }

    #[tokio::test]
    async fn finalized_command_carries_transcript() {
        let machine = machine();
        let mut session = ConversationSession::new();
        machine.start(&mut session);

        say(&machine, &mut session, "project=kyc month=2026-04").await;
        say(&machine, &mut session, FULL_COVERAGE).await;
        let reply = say(&machine, &mut session, "looks good").await;

        let raw = reply.submission().unwrap().raw_conversation.clone().unwrap();
        assert!(raw.starts_with("Assistant: Which project"));
        assert!(raw.contains("User: project=kyc month=2026-04"));
        assert!(raw.ends_with("User: looks good"));
    }

    #[tokio::test]
    async fn approval_carrying_a_new_number_confirms_again() {
        let machine = machine();
        let mut session = ConversationSession::new();
        say(&machine, &mut session, "project=kyc month=2026-04").await;
        say(&machine, &mut session, FULL_COVERAGE).await;

        let reply = say(&machine, &mut session, "ok, manual=12").await;

        assert_eq!(reply.prompt().unwrap().kind, FollowUpKind::Confirmation);
        assert!(!session.is_finalized());
        assert_eq!(session.coverage().unwrap().value.manual_total, Some(12));

        let reply = say(&machine, &mut session, "ok, save it").await;
        let command = reply.submission().unwrap();
        assert_eq!(command.metrics.manual_total, 12);
        assert_eq!(command.metrics.automated_total, 30);
    }

    #[tokio::test]
    async fn unstated_month_at_month_question_takes_the_default() {
        let machine = machine();
        let mut session = ConversationSession::new();

        say(&machine, &mut session, "project=kyc").await;
        say(&machine, &mut session, "the default is fine").await;

        let period = session.period().unwrap();
        assert_eq!(period.value, window(2026, 5));
        assert_eq!(period.confidence, ExtractionConfidence::Medium);
        assert_eq!(session.stage(), ConversationStage::AwaitingMetrics);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Opportunistic extraction
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn out_of_order_values_are_cached_and_skipped() {
        let machine = machine();
        let mut session = ConversationSession::new();

        let reply = say(&machine, &mut session, FULL_COVERAGE).await;
        // Still asking for the project, but the metrics are kept.
        assert_eq!(session.stage(), ConversationStage::AwaitingProject);
        assert_eq!(reply.prompt().unwrap().kind, FollowUpKind::Clarification);
        assert!(session.is_resolved(SubmissionField::Metrics));

        say(&machine, &mut session, "project=crm month=previous").await;
        assert_eq!(session.stage(), ConversationStage::AwaitingConfirmation);
        assert_eq!(session.period().unwrap().value, window(2026, 4));
    }

    #[tokio::test]
    async fn coverage_can_arrive_in_pieces() {
        let machine = machine();
        let mut session = ConversationSession::new();
        say(&machine, &mut session, "project=kyc month=2026-04").await;

        let reply = say(&machine, &mut session, "manual=10").await;
        assert_eq!(session.stage(), ConversationStage::AwaitingMetrics);
        assert!(reply.prompt().unwrap().text.contains("total automated test cases"));

        say(&machine, &mut session, "automated=5 delta=0").await;
        assert_eq!(session.stage(), ConversationStage::AwaitingConfirmation);
        assert_eq!(session.attempts(SubmissionField::Metrics), 0);
    }

    #[tokio::test]
    async fn later_value_wins_and_earlier_is_audited() {
        let machine = machine();
        let mut session = ConversationSession::new();

        say(&machine, &mut session, "project=kyc").await;
        say(&machine, &mut session, "project=crm month=2026-03").await;

        assert_eq!(session.project().unwrap().value.as_str(), "crm");
        let audit = &session.superseded()[0];
        assert_eq!(audit.field, SubmissionField::Project);
        assert_eq!(audit.previous, "kyc");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Clarification
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn unknown_project_is_named_in_the_clarification() {
        let machine = machine();
        let mut session = ConversationSession::new();

        let reply = say(&machine, &mut session, "project=atlantis").await;
        let prompt = reply.prompt().unwrap();

        assert_eq!(prompt.kind, FollowUpKind::Clarification);
        assert!(prompt.text.contains("'atlantis'"));
        assert_eq!(session.stage(), ConversationStage::AwaitingProject);
        assert_eq!(session.attempts(SubmissionField::Project), 1);
    }

    #[tokio::test]
    async fn several_candidates_are_listed() {
        let machine = machine();
        let mut session = ConversationSession::new();

        let reply = say(&machine, &mut session, "project=kyc|crm").await;
        assert!(reply.prompt().unwrap().text.contains("kyc, crm"));
    }

    #[tokio::test]
    async fn malformed_month_re_asks_for_month() {
        let machine = machine();
        let mut session = ConversationSession::new();
        say(&machine, &mut session, "project=kyc").await;

        let reply = say(&machine, &mut session, "month=garbled").await;
        let prompt = reply.prompt().unwrap();
        assert_eq!(prompt.field, Some(SubmissionField::Period));
        assert_eq!(prompt.kind, FollowUpKind::Clarification);
        assert!(!session.is_resolved(SubmissionField::Period));
    }

    #[tokio::test]
    async fn exceeding_the_clarification_limit_abandons() {
        let machine = machine_with(
            KeywordExtractor::default(),
            ConversationPolicy::default().with_max_clarification_attempts(2),
        );
        let mut session = ConversationSession::new();

        say(&machine, &mut session, "no idea").await;
        say(&machine, &mut session, "still no idea").await;
        let err = machine
            .handle_message(&mut session, "nope")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ConversationError::ClarificationLimitExceeded {
                field: SubmissionField::Project,
                attempts: 3
            }
        );
        assert_eq!(session.stage(), ConversationStage::Abandoned);
    }

    #[tokio::test]
    async fn transport_failure_propagates_without_moving() {
        let extractor = KeywordExtractor::default();
        extractor.fail_transport.store(true, Ordering::SeqCst);
        let machine = machine_with(extractor, ConversationPolicy::default());
        let mut session = ConversationSession::new();

        let err = machine
            .handle_message(&mut session, "project=kyc")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConversationError::Extraction(ExtractionError::Transport(TransportError::RateLimited))
        ));
        assert_eq!(session.stage(), ConversationStage::AwaitingProject);
        assert_eq!(session.attempts(SubmissionField::Project), 0);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Confirmation and corrections
    // ─────────────────────────────────────────────────────────────────────

    async fn at_confirmation(machine: &ConversationStateMachine) -> ConversationSession {
        let mut session = ConversationSession::new();
        say(machine, &mut session, "project=kyc month=2026-04").await;
        say(machine, &mut session, FULL_COVERAGE).await;
        assert_eq!(session.stage(), ConversationStage::AwaitingConfirmation);
        session
    }

    #[tokio::test]
    async fn correction_clears_only_the_named_field() {
        let machine = machine();
        let mut session = at_confirmation(&machine).await;
        let metrics_before = session.coverage().unwrap().value;

        let reply = say(&machine, &mut session, "change the month please").await;

        assert_eq!(session.stage(), ConversationStage::AwaitingPeriod);
        assert_eq!(reply.prompt().unwrap().field, Some(SubmissionField::Period));
        assert!(session.period().is_none());
        assert_eq!(session.project().unwrap().value.as_str(), "kyc");
        assert_eq!(session.coverage().unwrap().value, metrics_before);

        let reply = say(&machine, &mut session, "month=2026-03").await;
        assert_eq!(reply.prompt().unwrap().kind, FollowUpKind::Confirmation);
        assert_eq!(session.period().unwrap().value, window(2026, 3));
    }

    #[tokio::test]
    async fn correction_with_new_value_goes_straight_back_to_confirmation() {
        let machine = machine();
        let mut session = at_confirmation(&machine).await;

        let reply = say(&machine, &mut session, "wrong project, project=crm").await;

        assert_eq!(reply.prompt().unwrap().kind, FollowUpKind::Confirmation);
        assert_eq!(session.project().unwrap().value, ProjectId::new("crm").unwrap());
        assert_eq!(session.period().unwrap().value, window(2026, 4));
    }

    #[tokio::test]
    async fn new_data_without_a_field_name_re_confirms() {
        let machine = machine();
        let mut session = at_confirmation(&machine).await;

        let reply = say(&machine, &mut session, "actually manual=12").await;

        assert_eq!(reply.prompt().unwrap().kind, FollowUpKind::Confirmation);
        assert_eq!(session.coverage().unwrap().value.manual_total, Some(12));
    }

    #[tokio::test]
    async fn unclear_reply_asks_which_section() {
        let machine = machine();
        let mut session = at_confirmation(&machine).await;

        let reply = say(&machine, &mut session, "hmm not quite").await;

        assert_eq!(reply.prompt().unwrap().kind, FollowUpKind::SectionChoice);
        assert_eq!(session.stage(), ConversationStage::AwaitingConfirmation);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Auto-accept
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn auto_accept_skips_confirmation_when_confident() {
        let machine = machine_with(
            KeywordExtractor::default(),
            ConversationPolicy::default().with_auto_accept(ExtractionConfidence::High),
        );
        let mut session = ConversationSession::new();

        say(&machine, &mut session, "project=kyc month=2026-04").await;
        let reply = say(&machine, &mut session, FULL_COVERAGE).await;

        assert!(reply.submission().is_some());
        assert_eq!(session.stage(), ConversationStage::Finalized);
    }

    #[tokio::test]
    async fn below_threshold_still_needs_confirmation() {
        let machine = machine_with(
            KeywordExtractor::with_confidence(ExtractionConfidence::Medium),
            ConversationPolicy::default().with_auto_accept(ExtractionConfidence::High),
        );
        let mut session = ConversationSession::new();

        say(&machine, &mut session, "project=kyc month=2026-04").await;
        let reply = say(&machine, &mut session, FULL_COVERAGE).await;

        assert_eq!(reply.prompt().unwrap().kind, FollowUpKind::Confirmation);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session lifecycle
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn empty_message_nudges_without_touching_state() {
        let machine = machine();
        let mut session = ConversationSession::new();
        machine.start(&mut session);
        let history_len = session.history().len();

        let reply = say(&machine, &mut session, "   ").await;

        assert!(reply.prompt().unwrap().text.starts_with("I didn't catch that."));
        assert_eq!(session.history().len(), history_len);
        assert_eq!(session.stage(), ConversationStage::AwaitingProject);
    }

    #[tokio::test]
    async fn cancel_abandons_the_session() {
        let machine = machine();
        let mut session = ConversationSession::new();
        say(&machine, &mut session, "project=kyc").await;

        let reply = say(&machine, &mut session, "cancel").await;

        assert_eq!(reply.prompt().unwrap().kind, FollowUpKind::Closing);
        assert_eq!(session.stage(), ConversationStage::Abandoned);
    }

    #[tokio::test]
    async fn closed_session_rejects_messages() {
        let machine = machine();
        let mut session = at_confirmation(&machine).await;
        say(&machine, &mut session, "yes").await;

        let err = machine
            .handle_message(&mut session, "project=crm")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ConversationError::SessionClosed {
                stage: ConversationStage::Finalized
            }
        );
    }

    // ─────────────────────────────────────────────────────────────────────
    // Error codes
    // ─────────────────────────────────────────────────────────────────────

    #[test]
    fn errors_map_to_domain_codes() {
        let limit = ConversationError::ClarificationLimitExceeded {
            field: SubmissionField::Period,
            attempts: 4,
        };
        assert_eq!(limit.code(), ErrorCode::ClarificationLimitExceeded);

        let domain = DomainError::from(limit);
        assert_eq!(domain.details.get("field").map(String::as_str), Some("period"));
        assert_eq!(domain.details.get("attempts").map(String::as_str), Some("4"));

        let transport = ConversationError::Extraction(ExtractionError::Transport(
            crate::ports::TransportError::RateLimited,
        ));
        assert_eq!(transport.code(), ErrorCode::TransportFailed);
        assert_eq!(
            ConversationError::Validation(ValidationError::empty_field("metrics")).code(),
            ErrorCode::EmptyField
        );
    }
}
