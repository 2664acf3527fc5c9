//! Application layer - orchestration over ports.
//!
//! - `ConversationStateMachine` turns user messages into a `SubmissionCommand`
//! - `SubmissionFinalizer` validates, stores and refreshes the dashboard
//! - `ReportAggregationEngine` builds the monthly report and its verdict

pub mod handlers;

pub use handlers::{
    ConversationError, ConversationPolicy, ConversationReply, ConversationStateMachine,
    DashboardRegenerationWarning, ReportAggregationEngine, ReportDashboard, ReportSettings,
    SubmissionFinalizer, SubmissionReceipt, SubmitError,
};
