//! Submission handlers.

mod finalize_submission;

pub use finalize_submission::{
    DashboardRegenerationWarning, SubmissionFinalizer, SubmissionReceipt, SubmitError,
};
