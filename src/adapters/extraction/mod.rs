//! Structured extraction over a model transport.

mod llm_extractor;
mod prompts;
mod sanitizer;
mod schemas;

pub use llm_extractor::LlmStructuredExtractor;
pub use sanitizer::{extract_json_object, payload_preview, MAX_PREVIEW_CHARS};
