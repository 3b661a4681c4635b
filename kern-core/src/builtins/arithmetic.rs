//! Rules for `Plus`, `Times` and `Power`.
//!
//! `Plus` and `Times` are `Flat` and `Orderless`, so by the time these rules run, nested sums and
//! products have been spliced into their parent and the arguments are sorted, with every number
//! at the front.

use crate::{
    consts::{ONE, PLUS, POWER, TIMES},
    expr::Expr,
    pattern::Pattern,
    rule::{Rule, Template},
};
use super::number::{partition_numbers, power, Number};

/// `Plus[] = 0`
fn plus_empty() -> Rule {
    Rule::new(Pattern::call("Plus", []), Template::from(0))
}

/// `Plus[a] = a`
fn plus_single() -> Rule {
    Rule::new(Pattern::call("Plus", [Pattern::blank("a")]), Template::var("a"))
}

/// `Plus[2, 3, x] = Plus[5, x]`
fn plus_numbers() -> Rule {
    Rule::native(Pattern::call("Plus", [Pattern::sequence("xs")]), ["xs"], |bindings, _| {
        let (numbers, rest) = partition_numbers(bindings.sequence("xs")?);
        if numbers.len() < 2 {
            return None;
        }

        let sum = numbers.into_iter().reduce(Number::add)?;
        Some(Expr::apply(&PLUS, std::iter::once(sum.into_expr()).chain(rest)))
    })
    .with_name("Plus[numbers..] -> sum")
}

/// `Plus[0, a, b] = Plus[a, b]`
fn plus_zero() -> Rule {
    Rule::new(
        Pattern::call("Plus", [Pattern::literal(0), Pattern::sequence("xs")]),
        Template::call("Plus", [Template::var("xs")]),
    )
}

/// `Plus[x, 2 x, y] = Plus[3 x, y]`
fn plus_like_terms() -> Rule {
    Rule::native(Pattern::call("Plus", [Pattern::sequence("xs")]), ["xs"], |bindings, _| {
        collect_terms(bindings.sequence("xs")?)
    })
    .with_name("Plus[like terms..] -> Plus[Times[coefficient, term]..]")
}

/// Splits a term into its numeric coefficient and the rest of the term, so that `Times[3, x, y]`
/// becomes `3` and `Times[x, y]`. Terms without a coefficient have a coefficient of one.
fn split_coefficient(term: &Expr) -> (Number, Expr) {
    if term.has_head(&TIMES) {
        if let [first, rest @ ..] = term.args() {
            if let Some(coefficient) = Number::from_expr(first).filter(|_| !rest.is_empty()) {
                let rest = match rest {
                    [single] => single.clone(),
                    rest => Expr::apply(&TIMES, rest.iter().cloned()),
                };
                return (coefficient, rest);
            }
        }
    }
    (Number::Exact(1.into()), term.clone())
}

/// Adds the coefficients of terms that differ only by their coefficient. Returns [`None`] if no
/// two terms are alike.
fn collect_terms(terms: &[Expr]) -> Option<Expr> {
    let mut out = Vec::new();
    let mut groups: Vec<(Expr, Vec<Number>)> = Vec::new();
    for term in terms {
        if term.is_number() {
            out.push(term.clone());
            continue;
        }

        let (coefficient, rest) = split_coefficient(term);
        match groups.iter_mut().find(|(existing, _)| *existing == rest) {
            Some((_, coefficients)) => coefficients.push(coefficient),
            None => groups.push((rest, vec![coefficient])),
        }
    }

    if groups.iter().all(|(_, coefficients)| coefficients.len() == 1) {
        return None;
    }

    for (rest, coefficients) in groups {
        let coefficient = coefficients.into_iter().reduce(Number::add)?.into_expr();
        if coefficient.is_zero() {
            continue;
        } else if coefficient.is_one() {
            out.push(rest);
        } else {
            out.push(Expr::apply(&TIMES, [coefficient, rest]));
        }
    }
    Some(Expr::apply(&PLUS, out))
}

/// `Times[] = 1`
fn times_empty() -> Rule {
    Rule::new(Pattern::call("Times", []), Template::from(1))
}

/// `Times[a] = a`
fn times_single() -> Rule {
    Rule::new(Pattern::call("Times", [Pattern::blank("a")]), Template::var("a"))
}

/// `Times[2, 3, x] = Times[6, x]`
fn times_numbers() -> Rule {
    Rule::native(Pattern::call("Times", [Pattern::sequence("xs")]), ["xs"], |bindings, _| {
        let (numbers, rest) = partition_numbers(bindings.sequence("xs")?);
        if numbers.len() < 2 {
            return None;
        }

        let product = numbers.into_iter().reduce(Number::mul)?;
        Some(Expr::apply(&TIMES, std::iter::once(product.into_expr()).chain(rest)))
    })
    .with_name("Times[numbers..] -> product")
}

/// `Times[0, a, b] = 0`
///
/// Does not apply if one of the factors is `Indeterminate`, since `0 * Indeterminate` is
/// `Indeterminate`.
fn times_zero() -> Rule {
    Rule::new(
        Pattern::call("Times", [Pattern::literal(0), Pattern::sequence("xs")]),
        Template::from(0),
    )
    .when(["xs"], |bindings| {
        bindings
            .sequence("xs")
            .map_or(false, |xs| !xs.iter().any(Expr::is_indeterminate))
    })
}

/// `Times[1, a, b] = Times[a, b]`
fn times_one() -> Rule {
    Rule::new(
        Pattern::call("Times", [Pattern::literal(1), Pattern::sequence("xs")]),
        Template::call("Times", [Template::var("xs")]),
    )
}

/// `Times[x, x^2, y] = Times[x^3, y]`
fn times_like_factors() -> Rule {
    Rule::native(Pattern::call("Times", [Pattern::sequence("xs")]), ["xs"], |bindings, _| {
        collect_factors(bindings.sequence("xs")?)
    })
    .with_name("Times[like factors..] -> Times[Power[base, Plus[exponents..]]..]")
}

/// Splits a factor into its base and exponent, so that `Power[x, 2]` becomes `x` and `2`.
/// Factors that are not powers have an exponent of one.
fn split_power(factor: &Expr) -> (Expr, Expr) {
    match factor.args() {
        [base, exp] if factor.has_head(&POWER) => (base.clone(), exp.clone()),
        _ => (factor.clone(), ONE.clone()),
    }
}

/// Adds the exponents of factors with the same base. Returns [`None`] if no two factors share a
/// base. Numbers are left alone, since they are folded together by [`times_numbers`].
fn collect_factors(factors: &[Expr]) -> Option<Expr> {
    let mut out = Vec::new();
    let mut groups: Vec<(Expr, Vec<Expr>)> = Vec::new();
    for factor in factors {
        if factor.is_number() {
            out.push(factor.clone());
            continue;
        }

        let (base, exp) = split_power(factor);
        match groups.iter_mut().find(|(existing, _)| *existing == base) {
            Some((_, exps)) => exps.push(exp),
            None => groups.push((base, vec![exp])),
        }
    }

    if groups.iter().all(|(_, exps)| exps.len() == 1) {
        return None;
    }

    for (base, mut exps) in groups {
        let exp = if exps.len() == 1 {
            exps.remove(0)
        } else {
            Expr::apply(&PLUS, exps)
        };
        out.push(Expr::apply(&POWER, [base, exp]));
    }
    Some(Expr::apply(&TIMES, out))
}

/// `Power[2, 3] = 8`, `Power[4, 1/2] = 2`, `Power[0, 0] = Indeterminate`
fn power_numbers() -> Rule {
    Rule::native(
        Pattern::call("Power", [
            Pattern::blank_test("a", Expr::is_number),
            Pattern::blank_test("b", Expr::is_number),
        ]),
        ["a", "b"],
        |bindings, _| {
            let base = Number::from_expr(bindings.one("a")?)?;
            let exp = Number::from_expr(bindings.one("b")?)?;
            power(base, exp)
        },
    )
    .with_name("Power[number, number] -> number")
}

/// `Power[a, 1] = a`
fn power_one() -> Rule {
    Rule::new(
        Pattern::call("Power", [Pattern::blank("a"), Pattern::literal(1)]),
        Template::var("a"),
    )
}

/// `Power[a, 0] = 1`, if `a` is not zero
fn power_zero() -> Rule {
    Rule::new(
        Pattern::call("Power", [Pattern::blank("a"), Pattern::literal(0)]),
        Template::from(1),
    )
    .when(["a"], |bindings| {
        bindings
            .one("a")
            .map_or(false, |a| !a.is_zero() && !a.is_indeterminate())
    })
}

/// `Power[1, a] = 1`
fn power_one_left() -> Rule {
    Rule::new(
        Pattern::call("Power", [Pattern::literal(1), Pattern::blank("a")]),
        Template::from(1),
    )
    .when(["a"], |bindings| bindings.one("a").map_or(false, |a| !a.is_indeterminate()))
}

/// `Power[Power[a, b], c] = Power[a, Times[b, c]]`, for integer `c`
fn power_power() -> Rule {
    Rule::new(
        Pattern::call("Power", [
            Pattern::call("Power", [Pattern::blank("a"), Pattern::blank("b")]),
            Pattern::blank_head("c", "Integer"),
        ]),
        Template::call("Power", [
            Template::var("a"),
            Template::call("Times", [Template::var("b"), Template::var("c")]),
        ]),
    )
}

/// `Power[Times[a, b], c] = Times[Power[a, c], Power[b, c]]`, for integer `c`
fn power_distribute() -> Rule {
    Rule::native(
        Pattern::call("Power", [
            Pattern::call("Times", [Pattern::sequence("xs")]),
            Pattern::blank_head("c", "Integer"),
        ]),
        ["xs", "c"],
        |bindings, _| {
            let exp = bindings.one("c")?;
            let factors = bindings
                .sequence("xs")?
                .iter()
                .map(|factor| Expr::apply(&POWER, [factor.clone(), exp.clone()]));
            Some(Expr::apply(&TIMES, factors))
        },
    )
    .with_name("Power[Times[xs..], c_Integer] -> Times[Power[x, c]..]")
}

/// Returns the arithmetic rules, in the order they are tried.
pub(super) fn all() -> Vec<Rule> {
    vec![
        plus_empty(),
        plus_single(),
        plus_numbers(),
        plus_zero(),
        plus_like_terms(),
        times_empty(),
        times_single(),
        times_numbers(),
        times_zero(),
        times_one(),
        times_like_factors(),
        power_numbers(),
        power_one(),
        power_zero(),
        power_one_left(),
        power_power(),
        power_distribute(),
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use crate::builtins::testing::{call, real, simplify, sym};
    use super::*;

    #[test]
    fn fold_numbers() {
        assert_eq!(simplify(&call("Plus", [2.into(), 2.into()])), Expr::from(4));
        assert_eq!(simplify(&call("Plus", [])), Expr::from(0));
        assert_eq!(simplify(&call("Times", [])), Expr::from(1));
        assert_eq!(
            simplify(&call("Plus", [1.into(), sym("x"), Expr::rational(1.into(), 2.into()).unwrap()])).to_string(),
            "Plus[Rational[3, 2], x]",
        );
        assert_eq!(
            simplify(&call("Times", [3.into(), sym("y"), real(0.5)])).to_string(),
            "Times[1.5, y]",
        );
    }

    #[test]
    fn identities() {
        assert_eq!(simplify(&call("Times", [1.into(), sym("x")])), sym("x"));
        assert_eq!(simplify(&call("Plus", [sym("x"), 0.into()])), sym("x"));
        assert_eq!(simplify(&call("Times", [sym("x"), 0.into(), sym("y")])), Expr::from(0));
        assert_eq!(simplify(&call("Power", [sym("x"), 1.into()])), sym("x"));
        assert_eq!(simplify(&call("Power", [sym("x"), 0.into()])), Expr::from(1));
        assert_eq!(simplify(&call("Power", [1.into(), sym("x")])), Expr::from(1));
    }

    #[test]
    fn zero_times_indeterminate() {
        let expr = call("Times", [0.into(), Expr::Indeterminate]);
        assert_eq!(simplify(&expr), Expr::Indeterminate);
    }

    #[test]
    fn zero_to_the_zero() {
        assert_eq!(simplify(&call("Power", [0.into(), 0.into()])), Expr::Indeterminate);
        assert_eq!(simplify(&call("Power", [0.into(), (-2).into()])), Expr::Indeterminate);
        assert_eq!(simplify(&call("Power", [0.into(), 5.into()])), Expr::from(0));
    }

    #[test]
    fn like_terms() {
        let x = sym("x");
        assert_eq!(simplify(&call("Plus", [x.clone(), x.clone()])).to_string(), "Times[2, x]");
        assert_eq!(
            simplify(&call("Plus", [x.clone(), call("Times", [3.into(), x.clone()]), sym("y")])).to_string(),
            "Plus[y, Times[4, x]]",
        );
        assert_eq!(
            simplify(&call("Plus", [x.clone(), call("Times", [(-1).into(), x.clone()])])),
            Expr::from(0),
        );
        let xy = call("Times", [sym("x"), sym("y")]);
        assert_eq!(
            simplify(&call("Plus", [xy.clone(), call("Times", [2.into(), sym("y"), sym("x")])])).to_string(),
            "Times[3, x, y]",
        );
    }

    #[test]
    fn like_factors() {
        let x = sym("x");
        assert_eq!(simplify(&call("Times", [x.clone(), x.clone()])).to_string(), "Power[x, 2]");
        assert_eq!(
            simplify(&call("Times", [x.clone(), call("Power", [x.clone(), 2.into()]), sym("y")])).to_string(),
            "Times[y, Power[x, 3]]",
        );
        assert_eq!(
            simplify(&call("Times", [x.clone(), call("Power", [x.clone(), (-1).into()])])),
            Expr::from(1),
        );
    }

    #[test]
    fn exact_powers() {
        assert_eq!(simplify(&call("Power", [2.into(), 10.into()])), Expr::from(1024));
        assert_eq!(
            simplify(&call("Power", [3.into(), (-2).into()])).to_string(),
            "Rational[1, 9]",
        );
        let sqrt_two = call("Power", [2.into(), Expr::rational(1.into(), 2.into()).unwrap()]);
        assert_eq!(simplify(&sqrt_two), sqrt_two);
        assert_eq!(simplify(&call("Times", [sqrt_two.clone(), sqrt_two])), Expr::from(2));
    }

    #[test]
    fn real_powers_without_finite_value() {
        let reciprocal = call("Power", [real(0.0), (-1).into()]);
        assert_eq!(simplify(&reciprocal), Expr::Indeterminate);
        assert_eq!(simplify(&call("Plus", [sym("x"), reciprocal])), Expr::Indeterminate);

        // complex values are left alone
        let root = call("Power", [real(-2.0), real(0.5)]);
        assert_eq!(simplify(&root), root);
    }

    #[test]
    fn nested_powers() {
        let expr = call("Power", [call("Power", [sym("x"), 2.into()]), 3.into()]);
        assert_eq!(simplify(&expr).to_string(), "Power[x, 6]");

        let expr = call("Power", [call("Times", [2.into(), sym("x")]), 2.into()]);
        assert_eq!(simplify(&expr).to_string(), "Times[4, Power[x, 2]]");
    }

    #[test]
    fn split() {
        let term = call("Times", [3.into(), sym("x"), sym("y")]);
        let (coefficient, rest) = split_coefficient(&term);
        assert_eq!(coefficient, Number::Exact(3.into()));
        assert_eq!(rest.to_string(), "Times[x, y]");

        let (base, exp) = split_power(&sym("z"));
        assert_eq!((base, exp), (sym("z"), Expr::from(1)));
    }
}
