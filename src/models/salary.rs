//! Parsed salary value type.

use serde::{Deserialize, Serialize};

/// Pay period a salary figure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryInterval {
    Year,
    Month,
    Week,
    Day,
    Hour,
}

/// Structured salary parsed from free text.
///
/// Invariant: when both bounds are present, `min <= max`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryInfo {
    /// Trimmed source text, kept even when nothing else parsed.
    pub text: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// ISO 4217 code.
    pub currency: Option<String>,
    pub interval: Option<SalaryInterval>,
}
