use serde::{Deserialize, Serialize};
use std::fmt;

/// One raw record from the EU datalake API, field name → JSON value.
/// `serde_json::Map` with the `preserve_order` feature keeps the API's
/// field order, which drives the cache file column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub record_count: usize,
    pub csv_output: String,
}

/// A reference MRL as published by the EU database.
///
/// The raw field is numeric-as-text and may carry a trailing `*`
/// qualifier, or be the literal "No MRL required".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MrlValue {
    /// "No MRL required": any measured value complies.
    Unbounded,
    Numeric { value: f64, qualified: bool },
}

pub const NO_MRL_REQUIRED: &str = "No MRL required";

impl MrlValue {
    /// Parse a raw `mrl_value` field. Unparsable numerics fall back to
    /// a threshold of 0 with a logged warning, matching the lenient
    /// handling expected of reference data.
    pub fn parse(raw: &str) -> Self {
        if raw == NO_MRL_REQUIRED {
            return MrlValue::Unbounded;
        }

        let qualified = raw.ends_with('*');
        match raw.trim_end_matches('*').trim().parse::<f64>() {
            Ok(value) => MrlValue::Numeric { value, qualified },
            Err(_) => {
                tracing::warn!("Unable to convert MRL value '{}' to float, setting to 0", raw);
                MrlValue::Numeric {
                    value: 0.0,
                    qualified: false,
                }
            }
        }
    }

    /// Numeric threshold used for display. "No MRL required" shows as 0
    /// even though it complies unconditionally.
    pub fn threshold(&self) -> f64 {
        match self {
            MrlValue::Unbounded => 0.0,
            MrlValue::Numeric { value, .. } => *value,
        }
    }

    /// Strict comparison: a measured value equal to the threshold does
    /// NOT comply. Preserved as-is from the regulatory workflow.
    pub fn permits(&self, measured: f64) -> bool {
        match self {
            MrlValue::Unbounded => true,
            MrlValue::Numeric { value, .. } => measured < *value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Conforme,
    NonConforme,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Conforme => write!(f, "CONFORME"),
            Verdict::NonConforme => write!(f, "NON CONFORME"),
        }
    }
}

/// Structured outcome of a compliance check.
#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub verdict: Verdict,
    pub product_id: String,
    pub substance_id: String,
    /// `mrl_value` exactly as returned by the API.
    pub reference: String,
    pub limit: MrlValue,
    pub measured: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_numeric() {
        assert_eq!(
            MrlValue::parse("0.05"),
            MrlValue::Numeric {
                value: 0.05,
                qualified: false
            }
        );
    }

    #[test]
    fn test_parse_qualified_numeric() {
        assert_eq!(
            MrlValue::parse("0.01*"),
            MrlValue::Numeric {
                value: 0.01,
                qualified: true
            }
        );
    }

    #[test]
    fn test_parse_no_mrl_required() {
        let value = MrlValue::parse("No MRL required");
        assert_eq!(value, MrlValue::Unbounded);
        assert_eq!(value.threshold(), 0.0);
        assert!(value.permits(123.4));
    }

    #[test]
    fn test_parse_garbage_defaults_to_zero() {
        let value = MrlValue::parse("abc");
        assert_eq!(
            value,
            MrlValue::Numeric {
                value: 0.0,
                qualified: false
            }
        );
        assert!(!value.permits(0.001));
    }

    #[test]
    fn test_strict_comparison_at_threshold() {
        let value = MrlValue::parse("0.01*");
        assert!(value.permits(0.005));
        assert!(!value.permits(0.01)); // equality fails
        assert!(!value.permits(0.02));
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Conforme.to_string(), "CONFORME");
        assert_eq!(Verdict::NonConforme.to_string(), "NON CONFORME");
    }
}
