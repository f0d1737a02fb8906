//! Exact scaling of arbitrary-precision integers by floating-point factors.
//!
//! Multipliers in the economy (price growth, output growth, modifier
//! factors) are `f64`, while balances are unbounded [`BigInt`]s. Converting a
//! large balance to `f64` and back would silently drop low digits, so every
//! product here is formed in [`BigRational`]: the double is turned into the
//! exact binary fraction it represents and multiplied without rounding.
//! Only the final step (truncate or floor) loses information, and it does
//! so deliberately.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};

/// Return the exact rational value of `factor`.
///
/// Infinities saturate to `±f64::MAX` and NaN maps to zero, so a runaway
/// growth curve caps out instead of poisoning a balance.
pub fn exact(factor: f64) -> BigRational {
    let finite = if factor.is_nan() {
        0.0
    } else if factor.is_infinite() {
        f64::MAX.copysign(factor)
    } else {
        factor
    };
    BigRational::from_float(finite).unwrap_or_else(BigRational::zero)
}

/// `multiplier` raised to a level-derived exponent.
#[allow(clippy::cast_precision_loss)]
pub fn growth(multiplier: f64, exponent: u64) -> f64 {
    match i32::try_from(exponent) {
        Ok(small) => multiplier.powi(small),
        // Exponents this large only occur near the level ceiling.
        Err(_) => multiplier.powf(exponent as f64),
    }
}

/// `value × factor`, truncated toward zero.
pub fn scale_truncate(value: &BigInt, factor: f64) -> BigInt {
    (BigRational::from_integer(value.clone()) * exact(factor)).to_integer()
}

/// `value × factor`, rounded toward negative infinity.
pub fn scale_floor(value: &BigInt, factor: f64) -> BigInt {
    (BigRational::from_integer(value.clone()) * exact(factor))
        .floor()
        .to_integer()
}

/// The fractional part of a non-negative rational as `f64`.
///
/// Returns 0.0 when the value cannot be represented.
pub fn fraction(value: &BigRational) -> f64 {
    value.fract().to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_is_lossless_for_binary_fractions() {
        assert_eq!(exact(0.5), BigRational::new(BigInt::from(1), BigInt::from(2)));
        assert_eq!(exact(3.0), BigRational::from_integer(BigInt::from(3)));
    }

    #[test]
    fn exact_saturates_non_finite() {
        assert!(exact(f64::INFINITY) > BigRational::zero());
        assert!(exact(f64::NEG_INFINITY) < BigRational::zero());
        assert!(exact(f64::NAN).is_zero());
    }

    #[test]
    fn growth_small_and_large_exponents() {
        assert!((growth(1.5, 0) - 1.0).abs() < f64::EPSILON);
        assert!((growth(1.5, 2) - 2.25).abs() < f64::EPSILON);
        assert!((growth(1.0, u64::MAX) - 1.0).abs() < f64::EPSILON);
        assert!(growth(2.0, u64::MAX).is_infinite());
    }

    #[test]
    fn scale_truncate_keeps_large_integers_exact() {
        // 10^30 cannot survive a round trip through f64.
        let big = BigInt::from(10_u8).pow(30);
        assert_eq!(scale_truncate(&big, 1.0), big);
        assert_eq!(scale_truncate(&big, 2.0), &big * 2);
    }

    #[test]
    fn scale_truncate_vs_floor_on_negatives() {
        let value = BigInt::from(-3);
        assert_eq!(scale_truncate(&value, 0.5), BigInt::from(-1));
        assert_eq!(scale_floor(&value, 0.5), BigInt::from(-2));
    }

    #[test]
    fn price_curve_matches_double_product() {
        // 500 × 1.1 is 550.000000000000044..., which truncates to 550.
        assert_eq!(scale_truncate(&BigInt::from(500), 1.1), BigInt::from(550));
    }

    #[test]
    fn fraction_of_one_point_two() {
        let value = exact(1.2);
        let frac = fraction(&value);
        assert!((frac - 0.2).abs() < 1e-12);
        assert!(frac < 0.2);
    }
}
