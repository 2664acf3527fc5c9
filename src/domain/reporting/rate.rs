//! Percentage rates and the zero-denominator rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a rate with a zero denominator renders as.
///
/// One policy applies to a whole column of a report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ZeroDenominatorPolicy {
    /// `(0/0) * 100` is defined as `0%`.
    #[default]
    Zero,
    /// The rate is not applicable and renders as `N/A`.
    #[serde(alias = "na", alias = "n/a")]
    NotApplicable,
}

/// A computed percentage, or the explicit absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateValue {
    Percent(f64),
    NotApplicable,
}

impl RateValue {
    pub fn as_percent(&self) -> Option<f64> {
        match self {
            RateValue::Percent(value) => Some(*value),
            RateValue::NotApplicable => None,
        }
    }
}

impl fmt::Display for RateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateValue::Percent(value) => write!(f, "{}%", value),
            RateValue::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Computes `numerator / denominator * 100` under one column's rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub zero_denominator: ZeroDenominatorPolicy,
    pub decimals: u32,
}

impl RatePolicy {
    pub fn new(zero_denominator: ZeroDenominatorPolicy, decimals: u32) -> Self {
        Self {
            zero_denominator,
            decimals,
        }
    }

    pub fn rate(&self, numerator: u64, denominator: u64) -> RateValue {
        if denominator == 0 {
            return match self.zero_denominator {
                ZeroDenominatorPolicy::Zero => RateValue::Percent(0.0),
                ZeroDenominatorPolicy::NotApplicable => RateValue::NotApplicable,
            };
        }
        let ratio = numerator as f64 / denominator as f64;
        RateValue::Percent(round_to(ratio * 100.0, self.decimals))
    }
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self::new(ZeroDenominatorPolicy::Zero, 2)
    }
}
