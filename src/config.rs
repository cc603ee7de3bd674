use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::core::money::MONEY_TOLERANCE;

/// Limits enforced by the settlement guard.
///
/// Every field has a default, so a JSON override only needs the fields it
/// changes:
///
/// ```
/// use expense_settlement::config::EngineLimits;
///
/// let limits = EngineLimits::from_json_str(r#"{ "max_participants": 10 }"#).unwrap();
/// assert_eq!(limits.max_participants, 10);
/// assert_eq!(limits.max_title_len, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    pub max_title_len: usize,
    pub max_participants: usize,
    pub max_total_amount: Decimal,
    /// Allowed drift when comparing split sums.
    pub tolerance: Decimal,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_title_len: 200,
            max_participants: 50,
            max_total_amount: dec!(1_000_000.00),
            tolerance: MONEY_TOLERANCE,
        }
    }
}

impl EngineLimits {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = EngineLimits::default();
        assert_eq!(limits.max_participants, 50);
        assert_eq!(limits.max_total_amount, dec!(1000000));
        assert_eq!(limits.tolerance, dec!(0.01));
    }

    #[test]
    fn test_partial_override() {
        let limits = EngineLimits::from_json_str(r#"{ "max_total_amount": "500" }"#).unwrap();
        assert_eq!(limits.max_total_amount, dec!(500));
        assert_eq!(limits.max_participants, 50);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(EngineLimits::from_json_str("{ nope").is_err());
    }
}
