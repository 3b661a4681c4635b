//! Predicates, which evaluate to `True` or `False`.

use crate::{
    attributes::Attribute,
    consts::{E, PI},
    expr::Expr,
    pattern::Pattern,
    rule::{Rule, RuleDatabase},
};
use std::cmp::Ordering;
use super::number::Number;

/// A predicate that always decides, such as `IntegerQ`.
fn total(name: &'static str, test: fn(&Expr, &RuleDatabase) -> bool) -> Rule {
    Rule::native(Pattern::call(name, [Pattern::blank("x")]), ["x"], move |bindings, db| {
        let x = bindings.one("x")?;
        Some(Expr::boolean(test(x, db)))
    })
    .with_name(format!("{}[x_] -> True | False", name))
}

/// A predicate that may not be able to decide, such as `PositiveQ[x]` for a symbol `x`. Calls it
/// cannot decide are left unevaluated.
fn partial(name: &'static str, test: fn(&Expr, &RuleDatabase) -> Option<bool>) -> Rule {
    Rule::native(Pattern::call(name, [Pattern::blank("x")]), ["x"], move |bindings, db| {
        let x = bindings.one("x")?;
        test(x, db).map(Expr::boolean)
    })
    .with_name(format!("{}[x_] -> True | False", name))
}

/// Returns true if the expression is a symbol with the `Constant` attribute.
fn is_constant_symbol(expr: &Expr, db: &RuleDatabase) -> bool {
    expr.as_symbol()
        .map_or(false, |symbol| db.attributes(symbol).contains(Attribute::Constant))
}

/// The sign of a number, `Pi` or `E`. Other constants may have any sign.
fn sign(expr: &Expr) -> Option<Ordering> {
    match Number::from_expr(expr) {
        Some(number) => Some(number.sign()),
        None => expr
            .as_symbol()
            .filter(|symbol| **symbol == *PI || **symbol == *E)
            .map(|_| Ordering::Greater),
    }
}

/// Returns the predicate rules.
pub(super) fn all() -> Vec<Rule> {
    vec![
        total("IntegerQ", |x, _| matches!(x, Expr::Integer(_))),
        total("NumberQ", |x, _| x.is_number()),
        total("ConstantQ", |x, db| x.is_number() || is_constant_symbol(x, db)),
        partial("RealQ", |x, db| (x.is_number() || is_constant_symbol(x, db)).then_some(true)),
        partial("PositiveQ", |x, _| sign(x).map(|sign| sign == Ordering::Greater)),
        partial("NonNegativeQ", |x, _| sign(x).map(|sign| sign != Ordering::Less)),
    ]
}
