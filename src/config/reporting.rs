//! Report aggregation configuration

use chrono::FixedOffset;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::handlers::report::ReportSettings;
use crate::domain::reporting::ZeroDenominatorPolicy;

const MAX_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// Rendering of leakage when no defects were found at all (`zero` or `na`)
    #[serde(default)]
    pub leakage_zero_denominator: ZeroDenominatorPolicy,

    /// Rendering of automation share when a project has no test cases
    #[serde(default)]
    pub automation_zero_total: ZeroDenominatorPolicy,

    #[serde(default = "default_rounding_decimals")]
    pub rounding_decimals: u32,

    /// Reporting offset from UTC, in minutes
    #[serde(default)]
    pub utc_offset_minutes: i32,

    #[serde(default = "default_source_timeout_ms")]
    pub source_timeout_ms: u64,

    /// YAML file with business streams and projects; built-in registry when unset
    pub registry_path: Option<PathBuf>,

    /// YAML file with regression suite durations per project
    pub regression_suites_path: Option<PathBuf>,

    /// Where submissions are stored and report snapshots are written
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl ReportingConfig {
    pub fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn submissions_dir(&self) -> PathBuf {
        self.data_dir.join("submissions")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir.join("reports")
    }

    pub fn settings(&self) -> Result<ReportSettings, ValidationError> {
        self.validate()?;
        let offset = self.offset().ok_or(ValidationError::InvalidUtcOffset)?;
        Ok(ReportSettings::default()
            .with_zero_denominator(self.leakage_zero_denominator, self.automation_zero_total)
            .with_rounding_decimals(self.rounding_decimals)
            .with_offset(offset)
            .with_source_timeout(self.source_timeout()))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.rounding_decimals > 6 {
            return Err(ValidationError::InvalidRoundingDecimals);
        }
        if self.utc_offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(ValidationError::InvalidUtcOffset);
        }
        if self.source_timeout_ms == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            leakage_zero_denominator: ZeroDenominatorPolicy::default(),
            automation_zero_total: ZeroDenominatorPolicy::default(),
            rounding_decimals: default_rounding_decimals(),
            utc_offset_minutes: 0,
            source_timeout_ms: default_source_timeout_ms(),
            registry_path: None,
            regression_suites_path: None,
            data_dir: default_data_dir(),
        }
    }
}

fn default_rounding_decimals() -> u32 {
    2
}

fn default_source_timeout_ms() -> u64 {
    10_000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = ReportingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.leakage_zero_denominator, ZeroDenominatorPolicy::Zero);
        assert_eq!(config.source_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn settings_carry_offset_and_policies() {
        let config = ReportingConfig {
            leakage_zero_denominator: ZeroDenominatorPolicy::NotApplicable,
            utc_offset_minutes: -300,
            rounding_decimals: 1,
            ..Default::default()
        };
        let settings = config.settings().unwrap();
        assert_eq!(settings.leakage_zero_denominator, ZeroDenominatorPolicy::NotApplicable);
        assert_eq!(settings.automation_zero_total, ZeroDenominatorPolicy::Zero);
        assert_eq!(settings.rounding_decimals, 1);
        assert_eq!(settings.offset, FixedOffset::west_opt(5 * 3600).unwrap());
    }

    #[test]
    fn data_layout_hangs_off_data_dir() {
        let config = ReportingConfig {
            data_dir: PathBuf::from("/var/lib/qa-pulse"),
            ..Default::default()
        };
        assert_eq!(config.submissions_dir(), PathBuf::from("/var/lib/qa-pulse/submissions"));
        assert_eq!(config.reports_dir(), PathBuf::from("/var/lib/qa-pulse/reports"));
    }

    #[test]
    fn rounding_beyond_six_decimals_is_rejected() {
        let config = ReportingConfig {
            rounding_decimals: 7,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRoundingDecimals));
    }

    #[test]
    fn offset_beyond_eighteen_hours_is_rejected() {
        let config = ReportingConfig {
            utc_offset_minutes: 18 * 60 + 1,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidUtcOffset));
        assert_eq!(config.settings().unwrap_err(), ValidationError::InvalidUtcOffset);
    }

    #[test]
    fn eighteen_hours_is_the_edge() {
        let config = ReportingConfig {
            utc_offset_minutes: -18 * 60,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(
            config.settings().unwrap().offset,
            FixedOffset::west_opt(18 * 3600).unwrap()
        );
    }

    #[test]
    fn settings_refuse_what_validation_refuses() {
        let config = ReportingConfig {
            source_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.settings().unwrap_err(), ValidationError::InvalidTimeout);
    }
}
