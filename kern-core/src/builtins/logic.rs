//! Rules for the boolean connectives.
//!
//! `And` and `Or` are `Flat` and `Orderless`, so a constant or a repeated argument can appear
//! anywhere in the argument list; these rules use sequence blanks to find it.

use crate::{
    pattern::Pattern,
    rule::{Rule, Template},
};

/// `pre__, p, post__` around the given pattern.
fn surrounded(name: &str, pattern: Pattern) -> Pattern {
    Pattern::call(name, [Pattern::sequence("pre"), pattern, Pattern::sequence("post")])
}

/// The call `name[pre, inner.., post]`.
fn spliced(name: &str, inner: impl IntoIterator<Item = Template>) -> Template {
    let mut args = vec![Template::var("pre")];
    args.extend(inner);
    args.push(Template::var("post"));
    Template::call(name, args)
}

/// `And[] = True`, `Or[] = False`
fn empty(name: &str, value: &str) -> Rule {
    Rule::new(Pattern::call(name, []), Template::symbol(value))
}

/// `And[a] = a`, `Or[a] = a`
fn single(name: &str) -> Rule {
    Rule::new(Pattern::call(name, [Pattern::blank("a")]), Template::var("a"))
}

/// `And[.., False, ..] = False`, `Or[.., True, ..] = True`
fn absorbing(name: &str, value: &str) -> Rule {
    Rule::new(surrounded(name, Pattern::symbol(value)), Template::symbol(value))
}

/// `And[a, True, b] = And[a, b]`, `Or[a, False, b] = Or[a, b]`
fn identity(name: &str, value: &str) -> Rule {
    Rule::new(surrounded(name, Pattern::symbol(value)), spliced(name, []))
}

/// `And[a, a] = And[a]`, `Or[a, a] = Or[a]`
///
/// Arguments are sorted, so equal arguments are next to each other.
fn idempotent(name: &str) -> Rule {
    Rule::new(
        Pattern::call(name, [
            Pattern::sequence("pre"),
            Pattern::blank("a"),
            Pattern::blank("a"),
            Pattern::sequence("post"),
        ]),
        spliced(name, [Template::var("a")]),
    )
}

/// `And[a, Not[a]] = False`, `Or[a, Not[a]] = True`
///
/// `Not[a]` may sort before or after `a`, so both orders are covered.
fn complement(name: &str, result: &str) -> [Rule; 2] {
    let not_a = || Pattern::call("Not", [Pattern::blank("a")]);
    let rule = |first: Pattern, second: Pattern| {
        Rule::new(
            Pattern::call(name, [
                Pattern::sequence("pre"),
                first,
                Pattern::sequence("mid"),
                second,
                Pattern::sequence("post"),
            ]),
            Template::symbol(result),
        )
    };
    [
        rule(Pattern::blank("a"), not_a()),
        rule(not_a(), Pattern::blank("a")),
    ]
}

/// `Not[True] = False`, `Not[False] = True`
fn not_constant(value: &str, negation: &str) -> Rule {
    Rule::new(Pattern::call("Not", [Pattern::symbol(value)]), Template::symbol(negation))
}

/// `Not[Not[a]] = a`
fn not_not() -> Rule {
    Rule::new(
        Pattern::call("Not", [Pattern::call("Not", [Pattern::blank("a")])]),
        Template::var("a"),
    )
}

/// `Implies[a, b] = Or[Not[a], b]`
fn implies() -> Rule {
    Rule::new(
        Pattern::call("Implies", [Pattern::blank("a"), Pattern::blank("b")]),
        Template::call("Or", [
            Template::call("Not", [Template::var("a")]),
            Template::var("b"),
        ]),
    )
}

/// `Equivalent[a, b] = And[Implies[a, b], Implies[b, a]]`
fn equivalent() -> Rule {
    Rule::new(
        Pattern::call("Equivalent", [Pattern::blank("a"), Pattern::blank("b")]),
        Template::call("And", [
            Template::call("Implies", [Template::var("a"), Template::var("b")]),
            Template::call("Implies", [Template::var("b"), Template::var("a")]),
        ]),
    )
}

/// Returns the boolean rules, in the order they are tried.
pub(super) fn all() -> Vec<Rule> {
    let mut rules = Vec::new();
    for (name, identity_value, absorbing_value) in [("And", "True", "False"), ("Or", "False", "True")] {
        rules.push(empty(name, identity_value));
        rules.push(single(name));
        rules.push(absorbing(name, absorbing_value));
        rules.push(identity(name, identity_value));
        rules.push(idempotent(name));
        rules.extend(complement(name, absorbing_value));
    }
    rules.extend([
        not_constant("True", "False"),
        not_constant("False", "True"),
        not_not(),
        implies(),
        equivalent(),
    ]);
    rules
}
