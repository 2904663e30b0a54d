//! Speed tier classification of advertised download rates (Mb/s).
//!
//! | Mb/s            | code |
//! |-----------------|------|
//! | <= 0.2          | 1    |
//! | (0.2, 0.768)    | 2    |
//! | [0.768, 1.5)    | 3    |
//! | [1.5, 3)        | 4    |
//! | [3, 6)          | 5    |
//! | [6, 10)         | 6    |
//! | [10, 25)        | 7    |
//! | [25, 50)        | 8    |
//! | [50, 100)       | 9    |
//! | [100, 1000)     | 10   |
//! | >= 1000         | 11   |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SwapError;
use crate::record::FieldValue;

const CODES: [&str; 11] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11"];

/// Upper bound (inclusive) of tier 1.
const TIER_ONE_CEILING: f64 = 0.2;

/// Inclusive lower bounds of tiers 3 through 11.
const LOWER_BOUNDS: [f64; 9] = [0.768, 1.5, 3.0, 6.0, 10.0, 25.0, 50.0, 100.0, 1000.0];

/// A download speed tier, 1 through 11.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeedTier(u8);

impl SpeedTier {
    pub const MIN: SpeedTier = SpeedTier(1);
    pub const MAX: SpeedTier = SpeedTier(11);

    pub fn level(self) -> u8 {
        self.0
    }

    /// The stored text code, "1" to "11".
    pub fn code(self) -> &'static str {
        CODES[usize::from(self.0 - 1)]
    }
}

impl fmt::Display for SpeedTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Classify a download speed in Mb/s. NaN is rejected; every other value,
/// negative and infinite included, lands in exactly one tier.
pub fn classify(mbps: f64) -> Result<SpeedTier, SwapError> {
    if mbps.is_nan() {
        return Err(SwapError::Conversion("download speed is NaN".into()));
    }
    if mbps <= TIER_ONE_CEILING {
        return Ok(SpeedTier(1));
    }
    let reached = LOWER_BOUNDS.iter().take_while(|bound| mbps >= **bound).count();
    Ok(SpeedTier(2 + reached as u8))
}

/// Classify a stored attribute value, coercing integers and numeric text.
pub fn classify_value(value: &FieldValue) -> Result<SpeedTier, SwapError> {
    let mbps = match value {
        FieldValue::Double(value) => *value,
        FieldValue::Integer(value) => *value as f64,
        FieldValue::Text(text) => text.trim().parse::<f64>().map_err(|e| {
            SwapError::Conversion(format!("download speed {:?} is not a number: {}", text, e))
        })?,
        other => {
            return Err(SwapError::Conversion(format!(
                "download speed must be numeric, got {}",
                other.type_name()
            )))
        }
    };
    classify(mbps)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(mbps: f64) -> &'static str {
        classify(mbps).unwrap().code()
    }

    #[test]
    fn boundaries_map_to_upper_tier() {
        assert_eq!(code(0.2), "1");
        assert_eq!(code(0.768), "3");
        assert_eq!(code(1.5), "4");
        assert_eq!(code(3.0), "5");
        assert_eq!(code(6.0), "6");
        assert_eq!(code(10.0), "7");
        assert_eq!(code(25.0), "8");
        assert_eq!(code(50.0), "9");
        assert_eq!(code(100.0), "10");
        assert_eq!(code(1000.0), "11");
    }

    #[test]
    fn interior_values() {
        assert_eq!(code(0.0), "1");
        assert_eq!(code(0.5), "2");
        assert_eq!(code(0.767), "2");
        assert_eq!(code(1.0), "3");
        assert_eq!(code(24.9), "7");
        assert_eq!(code(999.99), "10");
        assert_eq!(code(10_000.0), "11");
    }

    #[test]
    fn out_of_range_inputs_still_classify() {
        assert_eq!(code(-5.0), "1");
        assert_eq!(code(f64::INFINITY), "11");
        assert_eq!(code(f64::NEG_INFINITY), "1");
    }

    #[test]
    fn nan_is_a_conversion_error() {
        assert!(classify(f64::NAN).unwrap_err().is_conversion());
    }

    #[test]
    fn values_are_coerced() {
        assert_eq!(classify_value(&FieldValue::Integer(25)).unwrap().code(), "8");
        assert_eq!(classify_value(&FieldValue::from(" 100 ")).unwrap().code(), "10");
        assert_eq!(classify_value(&FieldValue::Double(0.768)).unwrap().code(), "3");
    }

    #[test]
    fn non_numeric_values_fail() {
        assert!(classify_value(&FieldValue::from("fast")).unwrap_err().is_conversion());
        assert!(classify_value(&FieldValue::Null).unwrap_err().is_conversion());
        assert!(classify_value(&FieldValue::Geometry(vec![1]))
            .unwrap_err()
            .is_conversion());
    }

    #[test]
    fn display_matches_code() {
        assert_eq!(SpeedTier::MAX.to_string(), "11");
        assert_eq!(SpeedTier::MIN.level(), 1);
    }
}
