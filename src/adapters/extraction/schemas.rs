//! Payload shapes the model is asked to produce, with their JSON schemas.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::submission::{CoverageDraft, MAX_TEST_CASES};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPayload {
    #[serde(default)]
    pub project_id: Option<String>,
    /// Filled when the user named more than one project.
    #[serde(default)]
    pub candidates: Vec<String>,
    #[serde(default)]
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    IsoMonth,
    CurrentMonth,
    PreviousMonth,
    Unspecified,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodPayload {
    #[serde(default)]
    pub kind: Option<PeriodKind>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoveragePayload {
    #[serde(default)]
    pub manual_total: Option<i64>,
    #[serde(default)]
    pub automated_total: Option<i64>,
    #[serde(default, alias = "manual_created_in_reporting_month")]
    pub manual_created_last_month: Option<i64>,
    #[serde(default, alias = "manual_updated_in_reporting_month")]
    pub manual_updated_last_month: Option<i64>,
    #[serde(default, alias = "automated_created_in_reporting_month")]
    pub automated_created_last_month: Option<i64>,
    #[serde(default, alias = "automated_updated_in_reporting_month")]
    pub automated_updated_last_month: Option<i64>,
    #[serde(default)]
    pub confidence: Option<String>,
}

impl CoveragePayload {
    /// First stated value outside `0..=MAX_TEST_CASES`, by field name.
    pub fn first_out_of_range(&self) -> Option<(&'static str, i64)> {
        [
            ("manual_total", self.manual_total),
            ("automated_total", self.automated_total),
            ("manual_created_last_month", self.manual_created_last_month),
            ("manual_updated_last_month", self.manual_updated_last_month),
            ("automated_created_last_month", self.automated_created_last_month),
            ("automated_updated_last_month", self.automated_updated_last_month),
        ]
        .into_iter()
        .find_map(|(name, value)| {
            value
                .filter(|v| !(0..=MAX_TEST_CASES).contains(v))
                .map(|v| (name, v))
        })
    }

    pub fn draft(&self) -> CoverageDraft {
        CoverageDraft {
            manual_total: self.manual_total,
            automated_total: self.automated_total,
            manual_created_last_month: self.manual_created_last_month,
            manual_updated_last_month: self.manual_updated_last_month,
            automated_created_last_month: self.automated_created_last_month,
            automated_updated_last_month: self.automated_updated_last_month,
        }
    }
}

fn confidence_schema() -> Value {
    json!({"type": "string", "enum": ["high", "medium", "low"]})
}

fn count_schema() -> Value {
    json!({"type": ["integer", "null"], "minimum": 0})
}

pub fn project_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "project_id": {"type": ["string", "null"]},
            "candidates": {"type": "array", "items": {"type": "string"}},
            "confidence": confidence_schema(),
        },
        "required": ["project_id", "confidence"],
    })
}

pub fn period_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "kind": {
                "type": "string",
                "enum": ["iso_month", "current_month", "previous_month", "unspecified"],
            },
            "month": {"type": ["string", "null"], "pattern": "^[0-9]{4}-[0-9]{2}$"},
            "confidence": confidence_schema(),
        },
        "required": ["kind"],
    })
}

pub fn coverage_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "manual_total": count_schema(),
            "automated_total": count_schema(),
            "manual_created_last_month": count_schema(),
            "manual_updated_last_month": count_schema(),
            "automated_created_last_month": count_schema(),
            "automated_updated_last_month": count_schema(),
            "confidence": confidence_schema(),
        },
    })
}
