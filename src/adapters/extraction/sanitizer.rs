//! Cleanup of raw model content before JSON parsing.
//!
//! Models in JSON mode still sometimes wrap the object in a markdown fence
//! or add a sentence around it. The first balanced object wins.

/// Longest payload excerpt written to logs.
pub const MAX_PREVIEW_CHARS: usize = 512;

/// Pulls the JSON object out of raw model content.
///
/// Returns the trimmed input when no object can be located, so the JSON
/// parser reports the real error.
pub fn extract_json_object(raw: &str) -> String {
    let trimmed = raw.trim();

    if let Some(fenced) = from_code_fence(trimmed) {
        return fenced;
    }

    match trimmed.find('{') {
        Some(start) => balanced_object(trimmed, start).unwrap_or_else(|| trimmed.to_string()),
        None => trimmed.to_string(),
    }
}

/// Bounded excerpt of a payload for log fields.
pub fn payload_preview(payload: &str) -> String {
    match payload.char_indices().nth(MAX_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &payload[..cut]),
        None => payload.to_string(),
    }
}

fn from_code_fence(s: &str) -> Option<String> {
    let patterns = ["```json\n", "```json\r\n", "```\n", "```\r\n"];

    for pattern in patterns {
        if let Some(start) = s.find(pattern) {
            let body_start = start + pattern.len();
            if let Some(end) = s[body_start..].find("```") {
                return Some(s[body_start..body_start + end].trim().to_string());
            }
        }
    }
    None
}

fn balanced_object(s: &str, start: usize) -> Option<String> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (offset, c) in s[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            _ if in_string => {}
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let end = start + offset + c.len_utf8();
                    return Some(s[start..end].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_object_passes_through() {
        assert_eq!(extract_json_object(r#"  {"a":1} "#), r#"{"a":1}"#);
    }

    #[test]
    fn fenced_object_is_unwrapped() {
        let raw = "Here you go:\n```json\n{\"project_id\": \"kyc\"}\n```\nThanks";
        assert_eq!(extract_json_object(raw), r#"{"project_id": "kyc"}"#);
    }

    #[test]
    fn surrounding_prose_is_dropped() {
        let raw = r#"Sure! {"month": "2026-01", "note": "a } in a string"} hope that helps"#;
        assert_eq!(
            extract_json_object(raw),
            r#"{"month": "2026-01", "note": "a } in a string"}"#
        );
    }

    #[test]
    fn unbalanced_input_is_returned_for_the_parser() {
        assert_eq!(extract_json_object("{\"a\": 1"), "{\"a\": 1");
        assert_eq!(extract_json_object("no json"), "no json");
    }

    #[test]
    fn preview_is_bounded_on_char_boundaries() {
        let long = "é".repeat(600);
        let preview = payload_preview(&long);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), MAX_PREVIEW_CHARS + 3);
        assert_eq!(payload_preview("short"), "short");
    }
}
