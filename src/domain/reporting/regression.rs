//! Regression suite durations and their human-readable rendering.

use serde::{Deserialize, Serialize};

use super::rate::round_to;
use crate::domain::foundation::ValidationError;

/// Time taken by one regression suite run.
///
/// The canonical duration is in minutes. Annotations such as thread counts,
/// context counts or "in progress" markers are carried through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTimeEntry {
    pub suite_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    pub duration_minutes: f64,
    #[serde(default)]
    pub annotations: Vec<String>,
}

impl RegressionTimeEntry {
    pub fn new(suite_name: impl Into<String>, duration_minutes: f64) -> Result<Self, ValidationError> {
        let suite_name = suite_name.into();
        if suite_name.trim().is_empty() {
            return Err(ValidationError::empty_field("suite_name"));
        }
        if !duration_minutes.is_finite() || duration_minutes < 0.0 {
            return Err(ValidationError::invalid_format(
                "duration_minutes",
                "must be a non-negative number",
            ));
        }
        Ok(Self {
            suite_name,
            category: None,
            platform: None,
            duration_minutes,
            annotations: Vec::new(),
        })
    }

    pub fn from_seconds(suite_name: impl Into<String>, seconds: f64) -> Result<Self, ValidationError> {
        Self::new(suite_name, seconds / 60.0)
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    /// Suite name followed by any annotations.
    pub fn label(&self) -> String {
        if self.annotations.is_empty() {
            self.suite_name.clone()
        } else {
            format!("{} {}", self.suite_name, self.annotations.join(" "))
        }
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration_minutes)
    }
}

/// Renders minutes in the largest unit that keeps the value at least 1.
///
/// Seconds are whole numbers; minutes and hours keep one decimal place,
/// dropped when it is zero. The unit is picked after rounding, so a value
/// that rounds up to the next unit renders in that unit.
pub fn format_duration(minutes: f64) -> String {
    let seconds = (minutes * 60.0).round();
    if seconds < 60.0 {
        return format!("{}s", seconds as u64);
    }
    let rounded_minutes = round_to(minutes, 1);
    if rounded_minutes < 60.0 {
        format!("{}m", one_decimal(rounded_minutes))
    } else {
        format!("{}h", one_decimal(round_to(minutes / 60.0, 1)))
    }
}

fn one_decimal(value: f64) -> String {
    let rendered = format!("{:.1}", value);
    match rendered.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => rendered,
    }
}
