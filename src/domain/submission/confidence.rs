use serde::{Deserialize, Serialize};
use std::fmt;

/// Confidence tier the extraction step attaches to a candidate value.
///
/// Ordered `Low < Medium < High` so thresholds compare naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionConfidence {
    #[default]
    Low,
    Medium,
    High,
}

impl ExtractionConfidence {
    /// Parses a model-supplied tier. Anything unrecognised counts as low.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }

    /// True if this tier is at or above `threshold`.
    pub fn meets(&self, threshold: ExtractionConfidence) -> bool {
        *self >= threshold
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ExtractionConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
