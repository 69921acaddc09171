//! Fixed-point helpers for deterministic ratio arithmetic.
//!
//! Slot ratios are blended and apportioned in fixed-point so that the
//! generated grid never depends on platform float behaviour. Catalog data
//! stays in plain `f64` and is converted at the boundary.

use fixed::types::I32F32;

/// Fixed-point number type for generation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Convert a catalog float to fixed-point, mapping non-finite input to zero.
#[must_use]
pub fn to_fixed(value: f64) -> Fixed {
    if value.is_finite() {
        Fixed::saturating_from_num(value)
    } else {
        Fixed::ZERO
    }
}

/// Round a value to the given number of decimal places.
#[must_use]
pub fn round_places(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_fixed_finite() {
        assert_eq!(to_fixed(0.5), Fixed::from_num(0.5));
        assert_eq!(to_fixed(-0.25), Fixed::from_num(-0.25));
    }

    #[test]
    fn test_to_fixed_non_finite_is_zero() {
        assert_eq!(to_fixed(f64::NAN), Fixed::ZERO);
        assert_eq!(to_fixed(f64::INFINITY), Fixed::ZERO);
    }

    #[test]
    fn test_round_places() {
        assert!((round_places(0.833_333, 3) - 0.833).abs() < 1e-12);
        assert!((round_places(12.25, 1) - 12.3).abs() < 1e-12);
        assert!((round_places(99.5, 0) - 100.0).abs() < 1e-12);
    }
}
