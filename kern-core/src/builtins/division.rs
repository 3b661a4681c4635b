//! Rules that rewrite derived operators (`Divide`, `Subtract`, `Minus`, `Sqrt` and `Rational`)
//! in terms of `Plus`, `Times` and `Power`.

use crate::{
    expr::Expr,
    pattern::Pattern,
    primitive::quotient,
    rule::{Rule, Template},
};

/// `Divide[0, 0] = Indeterminate`
fn divide_zero_by_zero() -> Rule {
    Rule::new(
        Pattern::call("Divide", [Pattern::literal(0), Pattern::literal(0)]),
        Template::from(Expr::Indeterminate),
    )
}

/// `Divide[a, b] = Times[a, Power[b, -1]]`
fn divide() -> Rule {
    Rule::new(
        Pattern::call("Divide", [Pattern::blank("a"), Pattern::blank("b")]),
        Template::call("Times", [
            Template::var("a"),
            Template::call("Power", [Template::var("b"), Template::from(-1)]),
        ]),
    )
}

/// `Subtract[a, b] = Plus[a, Times[-1, b]]`
fn subtract() -> Rule {
    Rule::new(
        Pattern::call("Subtract", [Pattern::blank("a"), Pattern::blank("b")]),
        Template::call("Plus", [
            Template::var("a"),
            Template::call("Times", [Template::from(-1), Template::var("b")]),
        ]),
    )
}

/// `Minus[a] = Times[-1, a]`
fn minus() -> Rule {
    Rule::new(
        Pattern::call("Minus", [Pattern::blank("a")]),
        Template::call("Times", [Template::from(-1), Template::var("a")]),
    )
}

/// `Sqrt[a] = Power[a, 1/2]`
fn sqrt() -> Rule {
    let half = Expr::from_rational((1, 2).into());
    Rule::new(
        Pattern::call("Sqrt", [Pattern::blank("a")]),
        Template::call("Power", [Template::var("a"), Template::from(half)]),
    )
}

/// `Rational[1, 2] = 1/2`, `Rational[1, 0] = Indeterminate`
fn rational() -> Rule {
    Rule::native(
        Pattern::call("Rational", [Pattern::blank_head("n", "Integer"), Pattern::blank_head("d", "Integer")]),
        ["n", "d"],
        |bindings, _| {
            let numer = bindings.one("n")?.as_integer()?.clone();
            let denom = bindings.one("d")?.as_integer()?.clone();
            Some(quotient(numer, denom).map_or(Expr::Indeterminate, Expr::from_rational))
        },
    )
    .with_name("Rational[n_Integer, d_Integer] -> n/d")
}

/// Returns the derived operator rules, in the order they are tried.
pub(super) fn all() -> Vec<Rule> {
    vec![
        divide_zero_by_zero(),
        divide(),
        subtract(),
        minus(),
        sqrt(),
        rational(),
    ]
}
