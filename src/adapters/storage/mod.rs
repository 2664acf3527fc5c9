//! Submission storage adapters.
//!
//! - **InMemorySubmissionRepository** - process-local map (tests, demos)
//! - **FileSubmissionRepository** - one YAML file per project and month

mod file_submissions;
mod in_memory_submissions;

pub use file_submissions::FileSubmissionRepository;
pub use in_memory_submissions::InMemorySubmissionRepository;
