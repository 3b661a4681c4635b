//! Rules for logarithms and exponentials.

use crate::{
    expr::Expr,
    pattern::Pattern,
    rule::{Rule, Template},
};
use super::number::Number;

/// `Log[1] = 0`
fn log_one() -> Rule {
    Rule::new(Pattern::call("Log", [Pattern::literal(1)]), Template::from(0))
}

/// `Log[E] = 1`
fn log_e() -> Rule {
    Rule::new(Pattern::call("Log", [Pattern::symbol("E")]), Template::from(1))
}

/// `Log[b, a] = Log[a] / Log[b]`
fn log_base() -> Rule {
    Rule::new(
        Pattern::call("Log", [Pattern::blank("b"), Pattern::blank("a")]),
        Template::call("Times", [
            Template::call("Log", [Template::var("a")]),
            Template::call("Power", [
                Template::call("Log", [Template::var("b")]),
                Template::from(-1),
            ]),
        ]),
    )
}

/// `Log[E^a] = a`, for real `a`
fn log_exp() -> Rule {
    Rule::new(
        Pattern::call("Log", [
            Pattern::call("Power", [Pattern::symbol("E"), Pattern::blank_test("a", Expr::is_number)]),
        ]),
        Template::var("a"),
    )
}

/// `Log[x]` for positive real `x`
fn log_numeric() -> Rule {
    Rule::native(Pattern::call("Log", [Pattern::blank_head("x", "Real")]), ["x"], |bindings, _| {
        let x = bindings.one("x")?.as_real()?;
        (x > 0.0).then(|| Expr::from_real(x.ln()))
    })
    .with_name("Log[x_Real] -> real")
}

/// `Exp[a] = E^a`
fn exp() -> Rule {
    Rule::new(
        Pattern::call("Exp", [Pattern::blank("a")]),
        Template::call("Power", [Template::symbol("E"), Template::var("a")]),
    )
}

/// `E^Log[a] = a`
fn exp_log() -> Rule {
    Rule::new(
        Pattern::call("Power", [
            Pattern::symbol("E"),
            Pattern::call("Log", [Pattern::blank("a")]),
        ]),
        Template::var("a"),
    )
}

/// `E^x` for real `x`
fn exp_numeric() -> Rule {
    Rule::native(
        Pattern::call("Power", [Pattern::symbol("E"), Pattern::blank_head("x", "Real")]),
        ["x"],
        |bindings, _| {
            let x = Number::from_expr(bindings.one("x")?)?;
            Some(Expr::from_real(x.to_f64().exp()))
        },
    )
    .with_name("Power[E, x_Real] -> real")
}

/// Returns the logarithm and exponential rules, in the order they are tried.
pub(super) fn all() -> Vec<Rule> {
    vec![
        log_one(),
        log_e(),
        log_base(),
        log_exp(),
        log_numeric(),
        exp(),
        exp_log(),
        exp_numeric(),
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use crate::builtins::testing::{call, real, simplify, sym};
    use super::*;

    #[test]
    fn exact_logs() {
        assert_eq!(simplify(&call("Log", [1.into()])), Expr::from(0));
        assert_eq!(simplify(&call("Log", [sym("E")])), Expr::from(1));
        assert_eq!(simplify(&call("Log", [call("Exp", [3.into()])])), Expr::from(3));
        assert_eq!(simplify(&call("Log", [2.into()])).to_string(), "Log[2]");
    }

    #[test]
    fn change_of_base() {
        let expr = call("Log", [2.into(), sym("x")]);
        assert_eq!(simplify(&expr).to_string(), "Times[Log[x], Power[Log[2], -1]]");

        let expr = call("Log", [sym("b"), sym("b")]);
        assert_eq!(simplify(&expr), Expr::from(1));
    }

    #[test]
    fn exponentials() {
        assert_eq!(simplify(&call("Exp", [call("Log", [sym("y")])])), sym("y"));
        assert_eq!(simplify(&call("Exp", [0.into()])), Expr::from(1));
        assert_eq!(simplify(&call("Exp", [sym("x")])).to_string(), "Power[E, x]");
    }

    #[test]
    fn reals() {
        assert_eq!(simplify(&call("Exp", [real(1.5)])), Expr::Real(1.5f64.exp()));
        assert_eq!(simplify(&call("Log", [real(2.0)])), Expr::Real(2f64.ln()));

        // the logarithm of a negative real is not real
        assert_eq!(simplify(&call("Log", [real(-2.0)])).to_string(), "Log[-2.0]");
    }
}
