//! Conversation handlers.

mod handle_message;

pub use handle_message::{
    ConversationError, ConversationPolicy, ConversationReply, ConversationStateMachine,
};
