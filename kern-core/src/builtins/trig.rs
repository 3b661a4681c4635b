//! Rules for the trigonometric functions.
//!
//! Exact values are known for multiples of `Pi/6` and `Pi/4`. An angle is recognized if it is
//! `0`, `Pi`, or `Times[k, Pi]` for an exact number `k`.

use crate::{
    consts::{PI, POWER, TIMES},
    expr::Expr,
    pattern::Pattern,
    rule::Rule,
};
use once_cell::sync::Lazy;
use rug::Rational;
use std::collections::HashMap;

/// `n/d`, the angle `n/d * Pi`.
fn turn(n: i32, d: i32) -> Rational {
    Rational::from((n, d))
}

/// `coefficient * Sqrt[radicand]`, in normal form.
fn surd(coefficient: (i32, i32), radicand: i32) -> Expr {
    let coefficient = Expr::from_rational(coefficient.into());
    if radicand == 1 {
        return coefficient;
    }

    let root = Expr::apply(&POWER, [Expr::from(radicand), Expr::from_rational((1, 2).into())]);
    if coefficient.is_one() {
        root
    } else {
        Expr::apply(&TIMES, [coefficient, root])
    }
}

/// Values of `Sin[k Pi]` for `0 <= k < 2`.
static SIN_TABLE: Lazy<HashMap<Rational, Expr>> = Lazy::new(|| HashMap::from([
    // sin(0) = 0
    (turn(0, 1), surd((0, 1), 1)),

    // sin(pi/6) = 1/2
    (turn(1, 6), surd((1, 2), 1)),

    // sin(pi/4) = sqrt(2)/2
    (turn(1, 4), surd((1, 2), 2)),

    // sin(pi/3) = sqrt(3)/2
    (turn(1, 3), surd((1, 2), 3)),

    // sin(pi/2) = 1
    (turn(1, 2), surd((1, 1), 1)),

    // sin(2pi/3) = sqrt(3)/2
    (turn(2, 3), surd((1, 2), 3)),

    // sin(3pi/4) = sqrt(2)/2
    (turn(3, 4), surd((1, 2), 2)),

    // sin(5pi/6) = 1/2
    (turn(5, 6), surd((1, 2), 1)),

    // sin(pi) = 0
    (turn(1, 1), surd((0, 1), 1)),

    // sin(7pi/6) = -1/2
    (turn(7, 6), surd((-1, 2), 1)),

    // sin(5pi/4) = -sqrt(2)/2
    (turn(5, 4), surd((-1, 2), 2)),

    // sin(4pi/3) = -sqrt(3)/2
    (turn(4, 3), surd((-1, 2), 3)),

    // sin(3pi/2) = -1
    (turn(3, 2), surd((-1, 1), 1)),

    // sin(5pi/3) = -sqrt(3)/2
    (turn(5, 3), surd((-1, 2), 3)),

    // sin(7pi/4) = -sqrt(2)/2
    (turn(7, 4), surd((-1, 2), 2)),

    // sin(11pi/6) = -1/2
    (turn(11, 6), surd((-1, 2), 1)),
]));

/// Values of `Tan[k Pi]` for `0 <= k < 1`. `Tan[Pi/2]` is undefined and left unevaluated.
static TAN_TABLE: Lazy<HashMap<Rational, Expr>> = Lazy::new(|| HashMap::from([
    // tan(0) = 0
    (turn(0, 1), surd((0, 1), 1)),

    // tan(pi/6) = sqrt(3)/3
    (turn(1, 6), surd((1, 3), 3)),

    // tan(pi/4) = 1
    (turn(1, 4), surd((1, 1), 1)),

    // tan(pi/3) = sqrt(3)
    (turn(1, 3), surd((1, 1), 3)),

    // tan(2pi/3) = -sqrt(3)
    (turn(2, 3), surd((-1, 1), 3)),

    // tan(3pi/4) = -1
    (turn(3, 4), surd((-1, 1), 1)),

    // tan(5pi/6) = -sqrt(3)/3
    (turn(5, 6), surd((-1, 3), 3)),
]));

/// If the expression is an exact multiple of `Pi`, returns the multiplier.
fn pi_multiple(expr: &Expr) -> Option<Rational> {
    match expr {
        Expr::Symbol(symbol) if *symbol == *PI => Some(Rational::from(1)),
        Expr::Function(_) if expr.has_head(&TIMES) => match expr.args() {
            [k, Expr::Symbol(symbol)] if *symbol == *PI => k.as_exact(),
            _ => None,
        },
        expr if expr.is_zero() => Some(Rational::new()),
        _ => None,
    }
}

/// Reduces `k` into the range `0 <= k < period`.
fn reduce(k: Rational, period: i32) -> Rational {
    let periods = (k.clone() / period).floor();
    k - periods * period
}

/// `Sin[k Pi]` for known `k`
fn sin_exact() -> Rule {
    Rule::native(Pattern::call("Sin", [Pattern::blank("x")]), ["x"], |bindings, _| {
        let k = reduce(pi_multiple(bindings.one("x")?)?, 2);
        SIN_TABLE.get(&k).cloned()
    })
    .with_name("Sin[k Pi] -> exact value")
}

/// `Cos[k Pi] = Sin[(k + 1/2) Pi]` for known `k`
fn cos_exact() -> Rule {
    Rule::native(Pattern::call("Cos", [Pattern::blank("x")]), ["x"], |bindings, _| {
        let k = reduce(pi_multiple(bindings.one("x")?)? + turn(1, 2), 2);
        SIN_TABLE.get(&k).cloned()
    })
    .with_name("Cos[k Pi] -> exact value")
}

/// `Tan[k Pi]` for known `k`
fn tan_exact() -> Rule {
    Rule::native(Pattern::call("Tan", [Pattern::blank("x")]), ["x"], |bindings, _| {
        let k = reduce(pi_multiple(bindings.one("x")?)?, 1);
        TAN_TABLE.get(&k).cloned()
    })
    .with_name("Tan[k Pi] -> exact value")
}

/// Evaluates `name[x]` numerically when `x` is a real.
fn numeric(name: &'static str, f: fn(f64) -> f64) -> Rule {
    Rule::native(Pattern::call(name, [Pattern::blank_head("x", "Real")]), ["x"], move |bindings, _| {
        let x = bindings.one("x")?.as_real()?;
        Some(Expr::from_real(f(x)))
    })
    .with_name(format!("{}[x_Real] -> real", name))
}

/// Returns the trigonometric rules, in the order they are tried.
pub(super) fn all() -> Vec<Rule> {
    vec![
        sin_exact(),
        cos_exact(),
        tan_exact(),
        numeric("Sin", f64::sin),
        numeric("Cos", f64::cos),
        numeric("Tan", f64::tan),
    ]
}
