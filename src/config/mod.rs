//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `QA_PULSE` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use qa_pulse::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Extracting with {}", config.ai.model);
//! ```

mod ai;
mod conversation;
mod error;
mod logging;
mod reporting;

pub use ai::AiConfig;
pub use conversation::ConversationConfig;
pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use reporting::ReportingConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Model endpoint and retry budget
    #[serde(default)]
    pub ai: AiConfig,

    /// Confirmation and clarification policy
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Report rendering, data sources and storage location
    #[serde(default)]
    pub reporting: ReportingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `QA_PULSE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `QA_PULSE__AI__MODEL=llama3` -> `ai.model = "llama3"`
    /// - `QA_PULSE__REPORTING__LEAKAGE_ZERO_DENOMINATOR=na` -> `reporting.leakage_zero_denominator`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("QA_PULSE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found, section by section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.conversation.validate()?;
        self.reporting.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Load and validate in one step
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }
}
