//! Numeric helpers shared by the built-in rules.

use crate::expr::Expr;
use rug::{ops::Pow, Integer, Rational};
use std::cmp::Ordering;

/// The largest number of bits an exact power is allowed to produce. Powers that would be larger
/// are left unevaluated.
const MAX_POWER_BITS: u64 = 1 << 20;

/// The largest root taken when raising an exact number to a fractional power.
const MAX_ROOT: u32 = 64;

/// A number taken out of an [`Expr`] for arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Exact(Rational),
    Real(f64),
}

impl Number {
    /// Returns the number held by the expression, if it is a number.
    pub fn from_expr(expr: &Expr) -> Option<Self> {
        match expr {
            Expr::Real(value) => Some(Self::Real(*value)),
            expr => expr.as_exact().map(Self::Exact),
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Exact(value) => value.to_f64(),
            Self::Real(value) => *value,
        }
    }

    /// Returns the sign of the number.
    pub fn sign(&self) -> Ordering {
        match self {
            Self::Exact(value) => value.cmp0(),
            Self::Real(value) => value.total_cmp(&0.0),
        }
    }

    /// Adds two numbers. The sum is exact if both numbers are.
    pub fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::Exact(lhs), Self::Exact(rhs)) => Self::Exact(lhs + rhs),
            (lhs, rhs) => Self::Real(lhs.to_f64() + rhs.to_f64()),
        }
    }

    /// Multiplies two numbers. The product is exact if both numbers are.
    pub fn mul(self, other: Self) -> Self {
        match (self, other) {
            (Self::Exact(lhs), Self::Exact(rhs)) => Self::Exact(lhs * rhs),
            (lhs, rhs) => Self::Real(lhs.to_f64() * rhs.to_f64()),
        }
    }

    /// Converts the number back into an expression. A real that overflowed becomes
    /// [`Expr::Indeterminate`].
    pub fn into_expr(self) -> Expr {
        match self {
            Self::Exact(value) => Expr::from_rational(value),
            Self::Real(value) => Expr::from_real(value),
        }
    }
}

/// Splits the arguments of a call into its numbers and everything else, preserving their order.
pub fn partition_numbers(args: &[Expr]) -> (Vec<Number>, Vec<Expr>) {
    let mut numbers = Vec::new();
    let mut rest = Vec::new();
    for arg in args {
        match Number::from_expr(arg) {
            Some(number) => numbers.push(number),
            None => rest.push(arg.clone()),
        }
    }
    (numbers, rest)
}

/// Raises a number to a numeric power, returning [`None`] if the result cannot be represented
/// (for example, a root of a negative number) or would be too large.
///
/// - `0^a` is `0` for positive `a`, and [`Expr::Indeterminate`] otherwise.
/// - Exact numbers raised to an integer power are computed exactly.
/// - Exact numbers raised to a fractional power `p/q` are computed exactly if the base is a
/// perfect `q`-th power.
/// - If either number is a real, the result is a real, or [`Expr::Indeterminate`] if it is not
/// finite (as for `0.0^-1`).
pub fn power(base: Number, exp: Number) -> Option<Expr> {
    if base == Number::Exact(Rational::new()) {
        return Some(match exp.sign() {
            Ordering::Greater => Expr::from(0),
            _ => Expr::Indeterminate,
        });
    }

    match (base, exp) {
        (Number::Exact(base), Number::Exact(exp)) => exact_power(base, exp),
        (base, exp) => {
            let (base, exp) = (base.to_f64(), exp.to_f64());
            // the value is complex
            if base < 0.0 && exp.fract() != 0.0 {
                return None;
            }
            Some(Expr::from_real(base.powf(exp)))
        },
    }
}

/// Raises a nonzero exact number to an exact power.
fn exact_power(base: Rational, exp: Rational) -> Option<Expr> {
    if base == 1 {
        return Some(Expr::from(1));
    }

    let (numer, denom) = exp.into_numer_denom();
    let numer = numer.to_i32()?;
    let base = match denom.to_u32()? {
        1 => base,
        root if root <= MAX_ROOT => exact_root(&base, root)?,
        _ => return None,
    };

    if base == -1 {
        return Some(Expr::from(if numer % 2 == 0 { 1 } else { -1 }));
    }

    let bits = u64::from(base.numer().significant_bits()) + u64::from(base.denom().significant_bits());
    if bits.saturating_mul(u64::from(numer.unsigned_abs())) > MAX_POWER_BITS {
        return None;
    }

    Some(Expr::from_rational(base.pow(numer)))
}

/// Returns the exact `n`-th root of a positive rational number, if it has one.
fn exact_root(value: &Rational, n: u32) -> Option<Rational> {
    if value.cmp0() != Ordering::Greater {
        return None;
    }

    let root_of = |int: &Integer| {
        let root = int.clone().root(n);
        (root.clone().pow(n) == *int).then_some(root)
    };
    let numer = root_of(value.numer())?;
    let denom = root_of(value.denom())?;
    Some(Rational::from((numer, denom)))
}
