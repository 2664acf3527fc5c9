//! Submission conversation domain: stages, session state, follow-up
//! prompts and reply signals.

mod prompts;
mod session;
mod signals;
mod state;

pub use prompts::{summarize, FollowUp, FollowUpKind};
pub use session::{
    ConversationSession, MessageRole, ResolvedField, SessionMessage, SupersededValue,
};
pub use signals::{correction_target, is_affirmative, is_bare_affirmative, is_cancel};
pub use state::{ConversationStage, SubmissionField};
