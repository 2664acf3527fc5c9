//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Model base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Retry attempts must be at least 1")]
    InvalidRetryAttempts,

    #[error("Backoff base delay exceeds the maximum delay")]
    InvalidBackoff,

    #[error("Clarification limit must be at least 1")]
    InvalidClarificationLimit,

    #[error("Grace period cannot exceed 31 days")]
    InvalidGracePeriod,

    #[error("Rounding decimals cannot exceed 6")]
    InvalidRoundingDecimals,

    #[error("UTC offset must lie within +/-18 hours")]
    InvalidUtcOffset,

    #[error("Log level directive cannot be empty")]
    EmptyLogLevel,
}
