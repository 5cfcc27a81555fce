//! Numeric helpers used throughout the compiler

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Number of decimal places every derived timing or rate is rounded to
pub const ROUND_DIGITS: i32 = 5;

/// Round to [`ROUND_DIGITS`] places.
///
/// All timing comparisons happen on rounded values so floating noise from
/// the source data (0.30000000000000004 and friends) never changes a result.
pub fn fr(x: f64) -> f64 {
    let scale = 10f64.powi(ROUND_DIGITS);
    let rounded = (x * scale).round() / scale;
    // normalize -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// A config number that renders as an integer when it has no fraction
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Num(pub f64);

impl Num {
    pub fn rounded(x: f64) -> Self {
        Self(fr(x))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    fn is_integral(self) -> bool {
        self.0.is_finite() && self.0.fract() == 0.0 && self.0.abs() < 9.0e15
    }
}

impl Serialize for Num {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_integral() {
            serializer.serialize_i64(self.0 as i64)
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl From<Num> for Value {
    fn from(n: Num) -> Self {
        if n.is_integral() {
            Value::from(n.0 as i64)
        } else {
            Value::from(n.0)
        }
    }
}

/// Shorthand for a rounded JSON number inside tuple payloads
pub fn num(x: f64) -> Value {
    Num::rounded(x).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fr_suppresses_float_noise() {
        assert_eq!(fr(0.1 + 0.2), 0.3);
        assert_eq!(fr(1.000004), 1.0);
        assert_eq!(fr(-0.000001), 0.0);
    }

    #[test]
    fn test_num_renders_integers_without_fraction() {
        assert_eq!(serde_json::to_string(&Num(100.0)).unwrap(), "100");
        assert_eq!(serde_json::to_string(&Num(0.25)).unwrap(), "0.25");
        assert_eq!(num(2.0), Value::from(2));
    }

    proptest! {
        #[test]
        fn fr_is_idempotent(x in -1.0e6f64..1.0e6f64) {
            prop_assert_eq!(fr(fr(x)), fr(x));
        }
    }
}
