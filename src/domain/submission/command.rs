use serde::{Deserialize, Serialize};

use super::{ExtractionConfidence, SubmissionMetrics};
use crate::domain::foundation::{ProjectId, SubmissionId, TimeWindow, Timestamp};

/// Fully resolved extraction over a conversation history.
///
/// Built only when project, period and every coverage number resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub project_id: ProjectId,
    pub window: TimeWindow,
    pub metrics: SubmissionMetrics,
    /// Lowest confidence among the resolved fields.
    pub confidence: ExtractionConfidence,
}

/// Finalized input for storage, emitted once per conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionCommand {
    pub project_id: ProjectId,
    pub window: TimeWindow,
    pub metrics: SubmissionMetrics,
    pub raw_conversation: Option<String>,
    pub submitted_at: Option<Timestamp>,
}

impl SubmissionCommand {
    pub fn new(project_id: ProjectId, window: TimeWindow, metrics: SubmissionMetrics) -> Self {
        Self {
            project_id,
            window,
            metrics,
            raw_conversation: None,
            submitted_at: None,
        }
    }

    pub fn with_raw_conversation(mut self, raw: impl Into<String>) -> Self {
        self.raw_conversation = Some(raw.into());
        self
    }

    pub fn with_submitted_at(mut self, at: Timestamp) -> Self {
        self.submitted_at = Some(at);
        self
    }
}

/// A stored submission. One exists per (project, month); saving again replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub project_id: ProjectId,
    pub window: TimeWindow,
    pub metrics: SubmissionMetrics,
    pub raw_conversation: Option<String>,
    pub created_at: Timestamp,
}

impl Submission {
    /// Builds the stored form, falling back to `now` when the command carries no timestamp.
    pub fn from_command(command: SubmissionCommand, now: Timestamp) -> Self {
        Self {
            id: SubmissionId::new(),
            project_id: command.project_id,
            window: command.window,
            metrics: command.metrics,
            raw_conversation: command.raw_conversation,
            created_at: command.submitted_at.unwrap_or(now),
        }
    }
}
