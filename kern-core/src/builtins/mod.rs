//! The built-in rules and attributes.
//!
//! Built-in rules are registered at [`BUILTIN_PRIORITY`], below the default priority of zero, so
//! that rules registered later by the user are tried first and can override them.
//!
//! | Heads                                   | Rules                                               |
//! |-----------------------------------------|-----------------------------------------------------|
//! | `Plus`, `Times`, `Power`                | numeric folding, identities, like terms and factors |
//! | `Divide`, `Subtract`, `Minus`, `Sqrt`   | rewritten in terms of `Plus`, `Times` and `Power`   |
//! | `Sin`, `Cos`, `Tan`                     | exact values at multiples of `Pi`, real evaluation  |
//! | `Log`, `Exp`                            | exact values, change of base, real evaluation       |
//! | `And`, `Or`, `Not`, `Implies`, ...      | boolean simplification                              |
//! | `IntegerQ`, `NumberQ`, `ConstantQ`, ... | predicates evaluating to `True` or `False`          |

mod arithmetic;
mod division;
mod log;
mod logic;
mod number;
mod predicates;
mod trig;

use crate::{
    attributes::Attribute,
    error::MalformedRule,
    rule::RuleDatabase,
    symbol::Symbol,
};

/// The priority of every built-in rule.
pub const BUILTIN_PRIORITY: i32 = -1000;

/// Registers the built-in attributes and rules.
pub fn register(db: &mut RuleDatabase) -> Result<(), MalformedRule> {
    for name in ["Plus", "Times", "And", "Or"] {
        db.set_attributes(
            Symbol::new(name),
            Attribute::Flat | Attribute::Orderless | Attribute::OneIdentity,
        );
    }
    for name in ["Pi", "E"] {
        db.add_attribute(Symbol::new(name), Attribute::Constant);
    }
    db.add_attribute(Symbol::new("Hold"), Attribute::HoldAll);

    let rules = arithmetic::all()
        .into_iter()
        .chain(division::all())
        .chain(trig::all())
        .chain(log::all())
        .chain(logic::all())
        .chain(predicates::all())
        .map(|rule| rule.with_priority(BUILTIN_PRIORITY));
    db.register_all(rules)?;

    tracing::debug!(target: "kern::rules", rules = db.len(), "registered built-in rules");
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::{expr::Expr, normalize::normalize, rule::RuleDatabase};
    use once_cell::sync::Lazy;

    static BUILTINS: Lazy<RuleDatabase> = Lazy::new(|| RuleDatabase::with_builtins().unwrap());

    /// Normalizes the expression with the built-in rules, and checks that normalization finished.
    pub fn simplify(expr: &Expr) -> Expr {
        let result = normalize(&BUILTINS, expr);
        assert!(result.is_complete(), "{} did not reach normal form: {}", expr, result.status);
        result.expr
    }

    pub fn call(name: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::call(name, args)
    }

    pub fn sym(name: &str) -> Expr {
        Expr::symbol(name)
    }

    pub fn real(value: f64) -> Expr {
        Expr::real(value).unwrap()
    }
}
