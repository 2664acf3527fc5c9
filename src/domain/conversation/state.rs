//! Conversation stage machine.
//!
//! A submission conversation moves through the awaiting stages in field
//! order, may skip ahead when a later field is already known, and returns
//! from confirmation to a single awaiting stage when the user corrects it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// The three values a submission conversation must resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionField {
    Project,
    Period,
    Metrics,
}

impl SubmissionField {
    /// Fields in the order the conversation asks for them.
    pub const ALL: [SubmissionField; 3] = [
        SubmissionField::Project,
        SubmissionField::Period,
        SubmissionField::Metrics,
    ];

    /// Stage that waits for this field.
    pub fn awaiting_stage(&self) -> ConversationStage {
        match self {
            SubmissionField::Project => ConversationStage::AwaitingProject,
            SubmissionField::Period => ConversationStage::AwaitingPeriod,
            SubmissionField::Metrics => ConversationStage::AwaitingMetrics,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionField::Project => "project",
            SubmissionField::Period => "period",
            SubmissionField::Metrics => "metrics",
        }
    }
}

impl fmt::Display for SubmissionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle stage of a submission conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStage {
    #[default]
    AwaitingProject,
    AwaitingPeriod,
    AwaitingMetrics,
    AwaitingConfirmation,
    /// Submission emitted; the session is inert.
    Finalized,
    /// Cancelled or failed; the session is inert.
    Abandoned,
}

impl ConversationStage {
    /// The field this stage is prompting for, if any.
    pub fn awaited_field(&self) -> Option<SubmissionField> {
        match self {
            Self::AwaitingProject => Some(SubmissionField::Project),
            Self::AwaitingPeriod => Some(SubmissionField::Period),
            Self::AwaitingMetrics => Some(SubmissionField::Metrics),
            _ => None,
        }
    }

    /// Returns true if the session still accepts messages.
    pub fn accepts_input(&self) -> bool {
        !matches!(self, Self::Finalized | Self::Abandoned)
    }

    fn rank(&self) -> u8 {
        match self {
            Self::AwaitingProject => 0,
            Self::AwaitingPeriod => 1,
            Self::AwaitingMetrics => 2,
            Self::AwaitingConfirmation => 3,
            Self::Finalized => 4,
            Self::Abandoned => 5,
        }
    }
}

impl StateMachine for ConversationStage {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationStage::*;
        match (self, target) {
            (Finalized | Abandoned, _) => false,
            (_, Abandoned) => true,
            (AwaitingConfirmation, Finalized) => true,
            (_, Finalized) => false,
            // Corrections route back to any awaiting stage.
            (AwaitingConfirmation, _) => true,
            // Re-enter on clarification, or skip ahead past resolved fields.
            (from, to) => to.rank() >= from.rank(),
        }
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationStage::*;
        [
            AwaitingProject,
            AwaitingPeriod,
            AwaitingMetrics,
            AwaitingConfirmation,
            Finalized,
            Abandoned,
        ]
        .into_iter()
        .filter(|target| self.can_transition_to(target))
        .collect()
    }
}
