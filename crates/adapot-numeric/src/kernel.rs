//! Division, floor and boundary conversions.
//!
//! Two rules cover every formula in the workspace:
//!
//! - a division result is rounded to [`PRECISION`] significant digits
//!   (half-up) before it is used again;
//! - a product that yields an amount is floored to a whole lovelace.
//!
//! Binary floating point never enters a formula. Values that arrive as
//! `f64` go through [`rate_from_f64`], which uses the shortest decimal
//! rendering of the float rather than its binary expansion.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::{NumericError, Result};

/// Significant digits kept after every division.
pub const PRECISION: u64 = 32;

/// Divide two decimals, rounding the quotient to [`PRECISION`] digits.
///
/// The quotient is computed on the unscaled integers and rounded once,
/// half-up on the exact remainder.
///
/// # Errors
///
/// - [`NumericError::DivisionByZero`] if `denominator` is zero
pub fn divide(numerator: &BigDecimal, denominator: &BigDecimal) -> Result<BigDecimal> {
    if denominator.is_zero() {
        return Err(NumericError::DivisionByZero);
    }
    if numerator.is_zero() {
        return Ok(BigDecimal::zero());
    }
    let negative = numerator.is_negative() != denominator.is_negative();
    let (numerator_digits, numerator_scale) = numerator.as_bigint_and_exponent();
    let (denominator_digits, denominator_scale) = denominator.as_bigint_and_exponent();
    let denominator_digits = denominator_digits.abs();

    // Widen the numerator so the quotient carries at least one digit past PRECISION.
    let extra = (PRECISION + 1 + denominator.digits()).saturating_sub(numerator.digits());
    let (quotient, remainder) =
        (numerator_digits.abs() * pow10(extra)).div_rem(&denominator_digits);

    let dropped = BigDecimal::new(quotient.clone(), 0)
        .digits()
        .saturating_sub(PRECISION);
    let unit = pow10(dropped);
    let (mut head, tail) = quotient.div_rem(&unit);
    // Discarded part is (tail + remainder / denominator) / unit.
    if (tail * &denominator_digits + remainder) * 2u8 >= &unit * &denominator_digits {
        head += 1u8;
    }
    if negative {
        head = -head;
    }

    let scale = numerator_scale - denominator_scale + extra as i64 - dropped as i64;
    Ok(BigDecimal::new(head, scale))
}

fn pow10(exponent: u64) -> BigInt {
    BigInt::from(10u8).pow(exponent as u32)
}

/// Ratio of two amounts at [`PRECISION`] digits.
///
/// # Errors
///
/// - [`NumericError::DivisionByZero`] if `denominator` is zero
pub fn ratio(numerator: &BigInt, denominator: &BigInt) -> Result<BigDecimal> {
    divide(&lovelace_to_rate(numerator), &lovelace_to_rate(denominator))
}

/// Round toward negative infinity and return the integral part.
pub fn floor(value: &BigDecimal) -> BigInt {
    let (digits, scale) = value
        .with_scale_round(0, RoundingMode::Floor)
        .into_bigint_and_exponent();
    if scale < 0 {
        digits * BigInt::from(10u8).pow(scale.unsigned_abs() as u32)
    } else {
        digits
    }
}

/// Multiply an amount by every rate exactly, then floor once.
pub fn multiply_and_floor(amount: &BigInt, rates: &[&BigDecimal]) -> BigInt {
    let product = rates
        .iter()
        .fold(lovelace_to_rate(amount), |acc, rate| acc * *rate);
    floor(&product)
}

/// Lift an amount into decimal space without loss.
pub fn lovelace_to_rate(amount: &BigInt) -> BigDecimal {
    BigDecimal::new(amount.clone(), 0)
}

/// The smaller of two decimals.
pub fn min_rate(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
    if a <= b {
        a.clone()
    } else {
        b.clone()
    }
}

/// Parse a decimal string such as `"0.003"`.
///
/// # Errors
///
/// - [`NumericError::InvalidDecimal`] if the string is not a decimal
pub fn parse_rate(text: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(text.trim()).map_err(|_| NumericError::InvalidDecimal(text.to_string()))
}

/// Parse a whole amount such as `"45000000000000000"`.
///
/// # Errors
///
/// - [`NumericError::InvalidDecimal`] if the string is not an integer
pub fn parse_lovelace(text: &str) -> Result<BigInt> {
    BigInt::from_str(text.trim()).map_err(|_| NumericError::InvalidDecimal(text.to_string()))
}

/// Convert a float received at a system boundary into a decimal.
///
/// `0.003_f64` becomes exactly `0.003`.
///
/// # Errors
///
/// - [`NumericError::InvalidDecimal`] for NaN or infinities
pub fn rate_from_f64(value: f64) -> Result<BigDecimal> {
    if !value.is_finite() {
        return Err(NumericError::InvalidDecimal(value.to_string()));
    }
    parse_rate(&value.to_string())
}

/// Reject negative amounts.
///
/// # Errors
///
/// - [`NumericError::NegativeAmount`] if `value < 0`
pub fn ensure_non_negative(what: &str, value: &BigInt) -> Result<()> {
    if value.is_negative() {
        return Err(NumericError::NegativeAmount {
            what: what.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rate(text: &str) -> BigDecimal {
        parse_rate(text).expect("valid decimal")
    }

    #[test]
    fn test_divide_keeps_32_digits() {
        let third = divide(&rate("1"), &rate("3")).expect("divide");
        assert_eq!(third, rate("0.33333333333333333333333333333333"));

        let two_thirds = divide(&rate("2"), &rate("3")).expect("divide");
        assert_eq!(two_thirds, rate("0.66666666666666666666666666666667"));
    }

    #[test]
    fn test_divide_rounds_once() {
        // 0.12345678901234567890123456789012 4999...9 (77 nines) 8765...
        // Rounding to 100 digits first would carry into the 33rd digit.
        let numerator = BigInt::parse_bytes(b"123456789012345678901234567890125", 10)
            .expect("integer")
            * BigInt::from(10u8).pow(77);
        let denominator = BigInt::from(10u8).pow(110) + 1u8;
        let quotient = ratio(&numerator, &denominator).expect("ratio");
        assert_eq!(quotient, rate("0.12345678901234567890123456789012"));
    }

    #[test]
    fn test_divide_scales_and_signs() {
        assert_eq!(
            divide(&rate("-1"), &rate("3")).expect("divide"),
            rate("-0.33333333333333333333333333333333")
        );
        assert_eq!(divide(&rate("0.5"), &rate("2")).expect("divide"), rate("0.25"));
        assert_eq!(divide(&rate("1E+3"), &rate("8")).expect("divide"), rate("125"));
        assert_eq!(divide(&rate("0"), &rate("7")).expect("divide"), rate("0"));
        assert_eq!(
            divide(&rate("999999999999999999999999999999999"), &rate("1")).expect("divide"),
            rate("1E+33")
        );
    }

    #[test]
    fn test_divide_by_zero() {
        let err = divide(&rate("1"), &rate("0")).expect_err("zero denominator");
        assert_eq!(err, NumericError::DivisionByZero);
    }

    #[test]
    fn test_ratio_of_blocks() {
        let eta = ratio(&BigInt::from(4625), &BigInt::from(4752)).expect("ratio");
        assert_eq!(eta, rate("0.97327441077441077441077441077441"));
    }

    #[test]
    fn test_floor_positive_and_negative() {
        assert_eq!(floor(&rate("12.999")), BigInt::from(12));
        assert_eq!(floor(&rate("12")), BigInt::from(12));
        assert_eq!(floor(&rate("-1.5")), BigInt::from(-2));
        assert_eq!(floor(&rate("1E+3")), BigInt::from(1000));
    }

    #[test]
    fn test_multiply_and_floor_is_exact_before_floor() {
        // 13,888,022,852,926,644 * 0.003 = 41,664,068,558,779.932
        let reserves = BigInt::from(13_888_022_852_926_644_u64);
        let pot = multiply_and_floor(&reserves, &[&rate("0.003"), &rate("1")]);
        assert_eq!(pot, BigInt::from(41_664_068_558_779_u64));
    }

    #[test]
    fn test_rate_from_f64_uses_shortest_form() {
        assert_eq!(rate_from_f64(0.003).expect("finite"), rate("0.003"));
        assert_eq!(rate_from_f64(0.05).expect("finite"), rate("0.05"));
        assert!(rate_from_f64(f64::NAN).is_err());
        assert!(rate_from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_rate("zero point three").is_err());
        assert!(parse_lovelace("1.5").is_err());
        assert_eq!(parse_lovelace(" 42 ").expect("integer"), BigInt::from(42));
    }

    #[test]
    fn test_ensure_non_negative() {
        ensure_non_negative("treasury", &BigInt::from(0)).expect("zero is fine");
        let err = ensure_non_negative("treasury", &BigInt::from(-1)).expect_err("negative");
        assert!(matches!(err, NumericError::NegativeAmount { .. }));
    }

    #[test]
    fn test_min_rate() {
        assert_eq!(min_rate(&rate("0.2"), &rate("0.1")), rate("0.1"));
        assert_eq!(min_rate(&rate("0.1"), &rate("0.1")), rate("0.1"));
    }

    proptest! {
        #[test]
        fn test_divide_within_half_unit(numerator in 1u64.., denominator in 1u64..) {
            let quotient = divide(&BigDecimal::from(numerator), &BigDecimal::from(denominator))
                .expect("divide");
            // Off by at most half a unit in the last kept digit.
            let (_, scale) = quotient.as_bigint_and_exponent();
            let unit = BigDecimal::new(BigInt::from(1), scale);
            let error =
                (&quotient * BigDecimal::from(denominator) - BigDecimal::from(numerator)).abs();
            prop_assert!(error * BigDecimal::from(2) <= unit * BigDecimal::from(denominator));
        }

        #[test]
        fn test_floor_never_exceeds_product(amount in 0u64.., numerator in 0u32..=1_000_000) {
            let amount = BigInt::from(amount);
            let fraction = BigDecimal::new(BigInt::from(numerator), 6);
            let floored = multiply_and_floor(&amount, &[&fraction]);
            let exact = lovelace_to_rate(&amount) * &fraction;

            prop_assert!(lovelace_to_rate(&floored) <= exact);
            prop_assert!(exact - lovelace_to_rate(&floored) < BigDecimal::from(1));
            prop_assert!(floored >= BigInt::from(0));
            prop_assert!(floored <= amount);
        }
    }
}
