//! Conversation policy configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::handlers::conversation::ConversationPolicy;
use crate::domain::submission::ExtractionConfidence;

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Lowest confidence that may skip the confirmation turn
    #[serde(default = "default_threshold")]
    pub acceptance_threshold: ExtractionConfidence,

    #[serde(default)]
    pub auto_accept: bool,

    /// Clarification prompts per field before the session is abandoned
    #[serde(default = "default_clarification_limit")]
    pub max_clarification_attempts: u32,

    /// First days of a month during which an unstated period means the previous month
    #[serde(default = "default_grace_period_days")]
    pub grace_period_days: u32,
}

impl ConversationConfig {
    pub fn policy(&self) -> ConversationPolicy {
        let policy = ConversationPolicy::default()
            .with_max_clarification_attempts(self.max_clarification_attempts)
            .with_grace_period_days(self.grace_period_days);
        if self.auto_accept {
            policy.with_auto_accept(self.acceptance_threshold)
        } else {
            policy
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_clarification_attempts == 0 {
            return Err(ValidationError::InvalidClarificationLimit);
        }
        if self.grace_period_days > 31 {
            return Err(ValidationError::InvalidGracePeriod);
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: default_threshold(),
            auto_accept: false,
            max_clarification_attempts: default_clarification_limit(),
            grace_period_days: default_grace_period_days(),
        }
    }
}

fn default_threshold() -> ExtractionConfidence {
    ExtractionConfidence::High
}

fn default_clarification_limit() -> u32 {
    3
}

fn default_grace_period_days() -> u32 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy_defaults() {
        let policy = ConversationConfig::default().policy();
        assert_eq!(policy, ConversationPolicy::default());
    }

    #[test]
    fn auto_accept_carries_threshold() {
        let config = ConversationConfig {
            auto_accept: true,
            acceptance_threshold: ExtractionConfidence::Medium,
            ..Default::default()
        };
        let policy = config.policy();
        assert!(policy.auto_accept);
        assert_eq!(policy.acceptance_threshold, ExtractionConfidence::Medium);
    }

    #[test]
    fn threshold_is_ignored_without_auto_accept() {
        let config = ConversationConfig {
            acceptance_threshold: ExtractionConfidence::Low,
            ..Default::default()
        };
        assert!(!config.policy().auto_accept);
    }

    #[test]
    fn zero_clarification_limit_is_rejected() {
        let config = ConversationConfig {
            max_clarification_attempts: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidClarificationLimit));
    }

    #[test]
    fn grace_period_longer_than_a_month_is_rejected() {
        let config = ConversationConfig {
            grace_period_days: 40,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidGracePeriod));
    }
}
