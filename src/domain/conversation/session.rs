//! In-memory state of one submission conversation.
//!
//! A session is owned by a single caller and passed by `&mut` through each
//! handling call; nothing here is shared or locked.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ConversationStage, FollowUp, SubmissionField};
use crate::domain::foundation::{
    ProjectId, SessionId, StateMachine, TimeWindow, Timestamp, ValidationError,
};
use crate::domain::submission::{CoverageDraft, CoverageField, ExtractionConfidence, ExtractionResult};

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => f.write_str("User"),
            MessageRole::Assistant => f.write_str("Assistant"),
        }
    }
}

/// A message in the session history. `index` is its position in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub index: usize,
    pub role: MessageRole,
    pub content: String,
    pub received_at: Timestamp,
}

/// A cached field value and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedField<T> {
    pub value: T,
    pub confidence: ExtractionConfidence,
    /// History index of the message that stated the value.
    pub source_message: usize,
    /// Set once the user has approved the value at confirmation.
    pub confirmed: bool,
}

impl<T> ResolvedField<T> {
    pub fn new(value: T, confidence: ExtractionConfidence, source_message: usize) -> Self {
        Self {
            value,
            confidence,
            source_message,
            confirmed: false,
        }
    }
}

/// A value that a later message replaced, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupersededValue {
    pub field: SubmissionField,
    /// Rendered previous value, e.g. `payments` or `manual_total=10`.
    pub previous: String,
    /// Message that stated the previous value.
    pub previous_message: usize,
    /// Message that replaced it.
    pub replaced_by_message: usize,
}

/// Single-user conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    id: SessionId,
    stage: ConversationStage,
    history: Vec<SessionMessage>,
    project: Option<ResolvedField<ProjectId>>,
    period: Option<ResolvedField<TimeWindow>>,
    coverage: Option<ResolvedField<CoverageDraft>>,
    superseded: Vec<SupersededValue>,
    clarification_attempts: [u32; 3],
    pending_follow_up: Option<FollowUp>,
    finalized: bool,
    started_at: Timestamp,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    pub fn with_id(id: SessionId) -> Self {
        Self {
            id,
            stage: ConversationStage::default(),
            history: Vec::new(),
            project: None,
            period: None,
            coverage: None,
            superseded: Vec::new(),
            clarification_attempts: [0; 3],
            pending_follow_up: None,
            finalized: false,
            started_at: Timestamp::now(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn stage(&self) -> ConversationStage {
        self.stage
    }

    pub fn history(&self) -> &[SessionMessage] {
        &self.history
    }

    pub fn project(&self) -> Option<&ResolvedField<ProjectId>> {
        self.project.as_ref()
    }

    pub fn period(&self) -> Option<&ResolvedField<TimeWindow>> {
        self.period.as_ref()
    }

    pub fn coverage(&self) -> Option<&ResolvedField<CoverageDraft>> {
        self.coverage.as_ref()
    }

    pub fn superseded(&self) -> &[SupersededValue] {
        &self.superseded
    }

    pub fn pending_follow_up(&self) -> Option<&FollowUp> {
        self.pending_follow_up.as_ref()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn is_closed(&self) -> bool {
        !self.stage.accepts_input()
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    /// User messages only, oldest first, with their history indices.
    pub fn user_messages(&self) -> impl Iterator<Item = &SessionMessage> {
        self.history.iter().filter(|m| m.role == MessageRole::User)
    }

    /// History rendered as `Role: content` lines.
    pub fn transcript(&self) -> String {
        self.history
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ─────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────

    /// Appends a user message and returns its history index.
    pub fn push_user(&mut self, content: impl Into<String>) -> usize {
        self.push(MessageRole::User, content.into())
    }

    /// Records an outgoing prompt as the pending follow-up.
    pub fn push_follow_up(&mut self, follow_up: FollowUp) -> usize {
        let index = self.push(MessageRole::Assistant, follow_up.text.clone());
        self.pending_follow_up = Some(follow_up);
        index
    }

    fn push(&mut self, role: MessageRole, content: String) -> usize {
        let index = self.history.len();
        self.history.push(SessionMessage {
            index,
            role,
            content,
            received_at: Timestamp::now(),
        });
        index
    }

    // ─────────────────────────────────────────────────────────────────────
    // Field resolution
    // ─────────────────────────────────────────────────────────────────────

    /// Caches a project id; a different earlier value goes to the audit trail.
    pub fn resolve_project(
        &mut self,
        value: ProjectId,
        confidence: ExtractionConfidence,
        message: usize,
    ) {
        if let Some(previous) = &self.project {
            if previous.value != value {
                self.superseded.push(SupersededValue {
                    field: SubmissionField::Project,
                    previous: previous.value.to_string(),
                    previous_message: previous.source_message,
                    replaced_by_message: message,
                });
            }
        }
        self.project = Some(ResolvedField::new(value, confidence, message));
    }

    /// Caches a reporting month; a different earlier value goes to the audit trail.
    pub fn resolve_period(
        &mut self,
        value: TimeWindow,
        confidence: ExtractionConfidence,
        message: usize,
    ) {
        if let Some(previous) = &self.period {
            if previous.value != value {
                self.superseded.push(SupersededValue {
                    field: SubmissionField::Period,
                    previous: previous.value.iso_month(),
                    previous_message: previous.source_message,
                    replaced_by_message: message,
                });
            }
        }
        self.period = Some(ResolvedField::new(value, confidence, message));
    }

    /// Merges newly stated coverage numbers into the cached draft.
    ///
    /// Only fields present in `draft` change. Confidence is the lowest seen
    /// since the draft was last cleared.
    pub fn merge_coverage(
        &mut self,
        draft: &CoverageDraft,
        confidence: ExtractionConfidence,
        message: usize,
    ) {
        if draft.is_empty() {
            return;
        }
        match &mut self.coverage {
            Some(existing) => {
                let before = existing.value;
                existing.value.merge(draft);
                for (name, old) in replaced_numbers(&before, &existing.value) {
                    self.superseded.push(SupersededValue {
                        field: SubmissionField::Metrics,
                        previous: format!("{}={}", name, old),
                        previous_message: existing.source_message,
                        replaced_by_message: message,
                    });
                }
                existing.confidence = existing.confidence.min(confidence);
                existing.source_message = message;
                existing.confirmed = false;
            }
            None => {
                self.coverage = Some(ResolvedField::new(*draft, confidence, message));
            }
        }
    }

    pub fn is_resolved(&self, field: SubmissionField) -> bool {
        match field {
            SubmissionField::Project => self.project.is_some(),
            SubmissionField::Period => self.period.is_some(),
            SubmissionField::Metrics => self
                .coverage
                .as_ref()
                .is_some_and(|c| c.value.complete().is_some()),
        }
    }

    /// First field, in asking order, that is not yet resolved.
    pub fn first_unresolved(&self) -> Option<SubmissionField> {
        SubmissionField::ALL
            .into_iter()
            .find(|field| !self.is_resolved(*field))
    }

    pub fn field_confidence(&self, field: SubmissionField) -> Option<ExtractionConfidence> {
        match field {
            SubmissionField::Project => self.project.as_ref().map(|f| f.confidence),
            SubmissionField::Period => self.period.as_ref().map(|f| f.confidence),
            SubmissionField::Metrics => self.coverage.as_ref().map(|f| f.confidence),
        }
    }

    /// True when every field is resolved at or above `threshold`.
    pub fn all_meet(&self, threshold: ExtractionConfidence) -> bool {
        SubmissionField::ALL.into_iter().all(|field| {
            self.is_resolved(field)
                && self
                    .field_confidence(field)
                    .is_some_and(|c| c.meets(threshold))
        })
    }

    /// Discards one field's cached value, leaving the others untouched.
    ///
    /// The discarded value goes to the audit trail, attributed to `message`.
    pub fn clear_field(&mut self, field: SubmissionField, message: usize) {
        let discarded = match field {
            SubmissionField::Project => self
                .project
                .take()
                .map(|f| (f.value.to_string(), f.source_message)),
            SubmissionField::Period => self
                .period
                .take()
                .map(|f| (f.value.iso_month(), f.source_message)),
            SubmissionField::Metrics => self.coverage.take().map(|f| {
                let stated = replaced_numbers(&f.value, &CoverageDraft::default())
                    .into_iter()
                    .map(|(name, value)| format!("{}={}", name, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                (stated, f.source_message)
            }),
        };
        if let Some((previous, previous_message)) = discarded {
            self.superseded.push(SupersededValue {
                field,
                previous,
                previous_message,
                replaced_by_message: message,
            });
        }
        self.clarification_attempts[slot(field)] = 0;
    }

    /// Marks every resolved field as approved by the user.
    pub fn confirm_all(&mut self) {
        if let Some(f) = &mut self.project {
            f.confirmed = true;
        }
        if let Some(f) = &mut self.period {
            f.confirmed = true;
        }
        if let Some(f) = &mut self.coverage {
            f.confirmed = true;
        }
    }

    /// Bundles the resolved values, or `None` while any field is unresolved.
    pub fn extraction_result(&self) -> Option<ExtractionResult> {
        let project = self.project.as_ref()?;
        let period = self.period.as_ref()?;
        let coverage = self.coverage.as_ref()?;
        let metrics = coverage.value.complete()?;
        Some(ExtractionResult {
            project_id: project.value.clone(),
            window: period.value,
            metrics,
            confidence: project
                .confidence
                .min(period.confidence)
                .min(coverage.confidence),
        })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Clarification bookkeeping
    // ─────────────────────────────────────────────────────────────────────

    /// Counts a failed attempt at resolving `field` and returns the new total.
    pub fn record_attempt(&mut self, field: SubmissionField) -> u32 {
        let count = &mut self.clarification_attempts[slot(field)];
        *count += 1;
        *count
    }

    pub fn attempts(&self, field: SubmissionField) -> u32 {
        self.clarification_attempts[slot(field)]
    }

    pub fn reset_attempts(&mut self, field: SubmissionField) {
        self.clarification_attempts[slot(field)] = 0;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Stage changes
    // ─────────────────────────────────────────────────────────────────────

    pub fn transition_to(&mut self, target: ConversationStage) -> Result<(), ValidationError> {
        self.stage = self.stage.transition_to(target)?;
        Ok(())
    }

    /// Moves to `Finalized`. Refuses while any field is unresolved.
    pub fn finalize(&mut self) -> Result<ExtractionResult, ValidationError> {
        let result = match self.extraction_result() {
            Some(result) => result,
            None => {
                let missing = self
                    .first_unresolved()
                    .map(|f| f.as_str())
                    .unwrap_or("metrics");
                return Err(ValidationError::empty_field(missing));
            }
        };
        self.transition_to(ConversationStage::Finalized)?;
        self.confirm_all();
        self.finalized = true;
        self.pending_follow_up = None;
        Ok(result)
    }

    /// Moves to `Abandoned` from any open stage.
    pub fn abandon(&mut self) -> Result<(), ValidationError> {
        self.transition_to(ConversationStage::Abandoned)?;
        self.pending_follow_up = None;
        Ok(())
    }
}

fn slot(field: SubmissionField) -> usize {
    match field {
        SubmissionField::Project => 0,
        SubmissionField::Period => 1,
        SubmissionField::Metrics => 2,
    }
}

/// Numbers that held a value in `before` and hold a different one in `after`.
fn replaced_numbers(before: &CoverageDraft, after: &CoverageDraft) -> Vec<(CoverageField, i64)> {
    let pairs = [
        (CoverageField::ManualTotal, before.manual_total, after.manual_total),
        (CoverageField::AutomatedTotal, before.automated_total, after.automated_total),
        (
            CoverageField::ManualCreated,
            before.manual_created_last_month,
            after.manual_created_last_month,
        ),
        (
            CoverageField::ManualUpdated,
            before.manual_updated_last_month,
            after.manual_updated_last_month,
        ),
        (
            CoverageField::AutomatedCreated,
            before.automated_created_last_month,
            after.automated_created_last_month,
        ),
        (
            CoverageField::AutomatedUpdated,
            before.automated_updated_last_month,
            after.automated_updated_last_month,
        ),
    ];
    pairs
        .into_iter()
        .filter_map(|(field, old, new)| match old {
            Some(old) if new != Some(old) => Some((field, old)),
            _ => None,
        })
        .collect()
}
