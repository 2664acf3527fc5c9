//! Submission data: coverage metrics, extraction confidence and the
//! finalized command handed to storage.

mod confidence;
mod metrics;
mod command;

pub use confidence::ExtractionConfidence;
pub use metrics::{CoverageDraft, CoverageField, SubmissionMetrics, MAX_TEST_CASES};
pub use command::{ExtractionResult, Submission, SubmissionCommand};
