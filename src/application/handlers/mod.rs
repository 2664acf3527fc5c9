//! Application handlers.
//!
//! Each handler holds its ports behind `Arc<dyn _>` and exposes one async
//! entry point.

pub mod conversation;
pub mod report;
pub mod submission;

pub use conversation::{
    ConversationError, ConversationPolicy, ConversationReply, ConversationStateMachine,
};
pub use report::{ReportAggregationEngine, ReportDashboard, ReportSettings};
pub use submission::{
    DashboardRegenerationWarning, SubmissionFinalizer, SubmissionReceipt, SubmitError,
};
