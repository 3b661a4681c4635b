//! Functions to construct [`Integer`]s and [`Rational`]s from various types, and to bring numbers
//! into the canonical form used by [`Expr`](crate::Expr).

use crate::error::InvalidLiteral;
use rug::{Integer, Rational};
use std::cmp::Ordering;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates a [`Rational`] with the given value.
pub fn rational<T>(n: T) -> Rational
where
    Rational: From<T>,
{
    Rational::from(n)
}

/// Parses a decimal integer literal, such as `144` or `-7`.
pub fn int_from_str(s: &str) -> Result<Integer, InvalidLiteral> {
    Integer::from_str_radix(s, 10).map_err(|err| InvalidLiteral {
        literal: s.to_string(),
        reason: err.to_string(),
    })
}

/// Parses a real literal, such as `0.5` or `1.5e-3`. The value must be finite.
pub fn real_from_str(s: &str) -> Result<f64, InvalidLiteral> {
    let value = s.parse::<f64>().map_err(|err| InvalidLiteral {
        literal: s.to_string(),
        reason: err.to_string(),
    })?;
    canonical_real(value).ok_or_else(|| InvalidLiteral {
        literal: s.to_string(),
        reason: "the value is not finite".to_string(),
    })
}

/// Returns the canonical form of a real number, or [`None`] if it is not finite.
///
/// Negative zero is mapped to positive zero, so that two reals are equal exactly when their bit
/// patterns are equal.
pub fn canonical_real(value: f64) -> Option<f64> {
    if !value.is_finite() {
        None
    } else if value == 0.0 {
        Some(0.0)
    } else {
        Some(value)
    }
}

/// Builds the exact quotient `numer / denom`, or [`None`] if the denominator is zero.
pub fn quotient(numer: Integer, denom: Integer) -> Option<Rational> {
    if denom.cmp0() == Ordering::Equal {
        None
    } else {
        Some(Rational::from((numer, denom)))
    }
}

/// Returns true if the rational number has a denominator of one.
pub fn is_integral(value: &Rational) -> bool {
    *value.denom() == 1
}

/// Compares an exact value with a real one numerically. Reals are finite, so the comparison is
/// always exact.
pub fn cmp_exact_real(lhs: &Rational, rhs: f64) -> Ordering {
    match Rational::from_f64(rhs) {
        Some(rhs) => lhs.cmp(&rhs),
        // unreachable for canonical reals; fall back to the approximate comparison
        None => lhs.to_f64().total_cmp(&rhs),
    }
}
