//! Keyword signals in user replies: approval, cancellation and which
//! field a correction targets.

use super::SubmissionField;

const AFFIRMATIVE_PHRASES: [&str; 11] = [
    "yes",
    "y",
    "yep",
    "yeah",
    "sure",
    "confirm",
    "ok",
    "okay",
    "looks good",
    "correct",
    "that's right",
];

const AFFIRMATIVE_LEADS: [&str; 7] = ["yes", "yep", "yeah", "sure", "confirm", "ok", "okay"];

const CANCEL_WORDS: [&str; 4] = ["cancel", "abort", "quit", "stop"];

/// Lowercased words with surrounding punctuation stripped.
fn words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

/// True when the whole reply is an approval phrase and nothing else.
pub fn is_bare_affirmative(text: &str) -> bool {
    AFFIRMATIVE_PHRASES.contains(&words(text).join(" ").as_str())
}

/// True when the reply approves the summary.
///
/// Either the whole reply is an approval phrase, or it opens with an
/// approval word and names no field to change. Trailing text may still
/// carry new values, so callers read it before finalizing.
pub fn is_affirmative(text: &str) -> bool {
    if is_bare_affirmative(text) {
        return true;
    }
    match words(text).first() {
        Some(first) => {
            AFFIRMATIVE_LEADS.contains(&first.as_str()) && correction_target(text).is_none()
        }
        None => false,
    }
}

/// True when the user wants to drop the submission.
pub fn is_cancel(text: &str) -> bool {
    let tokens = words(text);
    match tokens.as_slice() {
        [only] => CANCEL_WORDS.contains(&only.as_str()),
        [first, ..] => first == "cancel" || first == "abort",
        [] => false,
    }
}

/// The field a correction names, taking the earliest mention.
pub fn correction_target(text: &str) -> Option<SubmissionField> {
    words(text).iter().find_map(|word| match word.as_str() {
        "project" | "team" => Some(SubmissionField::Project),
        "month" | "period" | "time" | "date" => Some(SubmissionField::Period),
        "coverage" | "metrics" | "test" | "tests" | "numbers" | "counts" => {
            Some(SubmissionField::Metrics)
        }
        _ => None,
    })
}
