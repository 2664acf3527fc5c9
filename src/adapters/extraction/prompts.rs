//! Prompt text for each extraction call.

use crate::ports::ProjectRegistry;

pub const SYSTEM_PROMPT: &str = "You are a careful data extraction assistant for software \
development teams. Return structured JSON that matches the provided schema, without commentary.";

pub const PERIOD_PROMPT: &str = "Extract the reporting month from the message. \
Use kind \"iso_month\" with month in YYYY-MM format (e.g., 2026-01) when a specific month is named, \
\"current_month\" or \"previous_month\" for relative references, and \"unspecified\" when no month is mentioned. \
Add a confidence of high, medium, or low.";

pub const COVERAGE_PROMPT: &str = "Extract test coverage metrics from the message. \
Include manual and automated totals and the manual and automated counts created and updated last month. \
Use null for any number the message does not state. Add a confidence of high, medium, or low.";

/// Project prompt listing every active project the answer must come from.
pub fn project_prompt(registry: &dyn ProjectRegistry) -> String {
    let listing: Vec<String> = registry
        .list_active()
        .iter()
        .filter_map(|id| registry.project(id))
        .map(|p| format!("- {} ({})", p.id, p.name))
        .collect();

    format!(
        "Extract the project identifier the message is reporting for. \
Answer with one id from this list, using the exact id:\n{}\n\
If several projects are named, put all of their ids in \"candidates\". \
Use null for project_id if no project is mentioned. Add a confidence of high, medium, or low.",
        listing.join("\n")
    )
}

/// User turn: the instruction followed by the text to read.
pub fn user_message(prompt: &str, text: &str) -> String {
    format!("{}\n\nConversation:\n{}", prompt, text)
}
