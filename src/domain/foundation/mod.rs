//! Foundation value objects shared across the domain.

mod errors;
mod ids;
mod state_machine;
mod time_window;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{normalize_key, ProjectId, SessionId, SubmissionId};
pub use state_machine::StateMachine;
pub use time_window::{TimeWindow, MAX_YEAR, MIN_YEAR};
pub use timestamp::Timestamp;
