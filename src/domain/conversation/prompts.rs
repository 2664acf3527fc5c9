//! Follow-up questions sent back to the user.

use serde::{Deserialize, Serialize};

use super::SubmissionField;
use crate::domain::foundation::{ProjectId, TimeWindow};
use crate::domain::submission::{CoverageField, SubmissionMetrics};

/// What a follow-up is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpKind {
    /// First request for a field.
    Question,
    /// Repeated request after an unusable answer.
    Clarification,
    /// Summary awaiting approval.
    Confirmation,
    /// Asks which field a correction targets.
    SectionChoice,
    /// Session is over; nothing more is expected.
    Closing,
}

/// Next prompt for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUp {
    pub kind: FollowUpKind,
    pub field: Option<SubmissionField>,
    pub text: String,
}

impl FollowUp {
    fn new(kind: FollowUpKind, field: Option<SubmissionField>, text: impl Into<String>) -> Self {
        Self {
            kind,
            field,
            text: text.into(),
        }
    }

    pub fn ask_project() -> Self {
        Self::new(
            FollowUpKind::Question,
            Some(SubmissionField::Project),
            "Which project are you reporting for?",
        )
    }

    pub fn ask_period(default: TimeWindow) -> Self {
        Self::new(
            FollowUpKind::Question,
            Some(SubmissionField::Period),
            format!("Which reporting month should I use? (Default: {})", default),
        )
    }

    /// Asks for the coverage numbers still missing.
    pub fn ask_metrics(missing: &[CoverageField]) -> Self {
        let text = if missing.is_empty() || missing.len() == 6 {
            "Please share your test coverage: total manual and automated test cases, \
             and how many of each were created and updated last month."
                .to_string()
        } else {
            let names: Vec<&str> = missing.iter().map(|f| f.describe()).collect();
            format!("Thanks. I still need: {}.", names.join(", "))
        };
        Self::new(FollowUpKind::Question, Some(SubmissionField::Metrics), text)
    }

    /// Re-asks for the field the stage is waiting on, with a reason.
    pub fn clarify(field: SubmissionField, reason: impl AsRef<str>) -> Self {
        let question = match field {
            SubmissionField::Project => "Which project is this update for?",
            SubmissionField::Period => "Which month is this update for? For example 2026-03.",
            SubmissionField::Metrics => "Could you restate the test coverage numbers?",
        };
        Self::new(
            FollowUpKind::Clarification,
            Some(field),
            format!("{} {}", reason.as_ref(), question),
        )
    }

    pub fn confirm(summary: impl AsRef<str>) -> Self {
        Self::new(
            FollowUpKind::Confirmation,
            None,
            format!(
                "Here is what I captured:\n\n{}\n\nReply with 'yes' to save or tell me what to change.",
                summary.as_ref()
            ),
        )
    }

    pub fn which_section() -> Self {
        Self::new(
            FollowUpKind::SectionChoice,
            None,
            "Which section should I update? You can say project, month, or test coverage.",
        )
    }

    /// Repeats `current` after an empty message.
    pub fn nudge(current: &FollowUp) -> Self {
        Self::new(
            current.kind,
            current.field,
            format!("I didn't catch that. {}", current.text),
        )
    }

    pub fn cancelled() -> Self {
        Self::new(
            FollowUpKind::Closing,
            None,
            "Okay, I've discarded this update. Nothing was saved.",
        )
    }

    pub fn saved(project: &ProjectId, window: TimeWindow) -> Self {
        Self::new(
            FollowUpKind::Closing,
            None,
            format!("Saved the {} update for {}.", window, project),
        )
    }
}

/// Renders the values captured so far for the confirmation prompt.
pub fn summarize(project: &ProjectId, window: TimeWindow, metrics: &SubmissionMetrics) -> String {
    format!(
        "Project: {}\nMonth: {}\nTest coverage:\n\
         - Manual: {} total ({} created, {} updated last month)\n\
         - Automated: {} total ({} created, {} updated last month)",
        project,
        window,
        metrics.manual_total,
        metrics.manual_created_last_month,
        metrics.manual_updated_last_month,
        metrics.automated_total,
        metrics.automated_created_last_month,
        metrics.automated_updated_last_month,
    )
}
