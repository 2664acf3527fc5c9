//! Checked transitions for stage enums.

use super::ValidationError;

/// Implementors list their legal exits; `transition_to` rejects the rest.
///
/// ```ignore
/// let next = ConversationStage::AwaitingProject
///     .transition_to(ConversationStage::AwaitingPeriod)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    fn can_transition_to(&self, target: &Self) -> bool;

    fn valid_transitions(&self) -> Vec<Self>;

    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// No exits left.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
