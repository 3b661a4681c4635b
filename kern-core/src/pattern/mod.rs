//! Patterns, which describe the shape of the expressions a rule applies to.
//!
//! A [`Pattern`] is a tree that mirrors [`Expr`], with two additional kinds of node:
//!
//! - A **blank** (`x_`) matches any single expression and binds it to the variable `x`.
//! - A **sequence blank** (`xs__`) matches zero or more consecutive arguments of a function
//! application and binds the run to `xs`. Sequence blanks only have meaning inside an argument
//! list.
//!
//! Both may carry a [`Constraint`] restricting what they match: `n_Integer` only matches integers,
//! and `n_?test` only matches expressions accepted by a predicate. A variable that appears more
//! than once must match equal expressions at every occurrence, so `Plus[a_, a_]` matches
//! `Plus[x, x]` but not `Plus[x, y]`.
//!
//! See [`match_pattern`] for the matching algorithm.

mod bindings;
mod matcher;

pub use bindings::{Binding, BindingSet};
pub use matcher::{match_pattern, match_with};

use crate::{expr::Expr, symbol::Symbol};
use std::{fmt, sync::Arc};

/// A predicate over a single expression.
pub type TestFn = dyn Fn(&Expr) -> bool + Send + Sync;

/// A restriction on the expressions a blank can match.
#[derive(Clone)]
pub enum Constraint {
    /// The expression's [type](Expr::type_head) must equal the given expression. For example,
    /// `x_Integer` is a blank constrained to the head `Integer`, and `x_f` only matches calls to
    /// `f`.
    Head(Expr),

    /// The predicate must accept the expression.
    Test(Arc<TestFn>),
}

impl Constraint {
    /// Returns true if the expression satisfies the constraint.
    pub fn accepts(&self, expr: &Expr) -> bool {
        match self {
            Self::Head(head) => expr.has_type(head),
            Self::Test(test) => test(expr),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head(head) => f.debug_tuple("Head").field(head).finish(),
            Self::Test(_) => f.write_str("Test(..)"),
        }
    }
}

/// The kind of value a pattern variable is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Bound by a blank, to a single expression.
    One,

    /// Bound by a sequence blank, to a run of arguments.
    Sequence,
}

/// A pattern to match against an expression.
///
/// For more information about patterns, see the [module-level documentation](self).
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches only an expression structurally equal to this one.
    Literal(Expr),

    /// Matches a single expression, optionally binding it to a name.
    Blank {
        name: Option<Symbol>,
        constraint: Option<Constraint>,
    },

    /// Matches zero or more consecutive arguments, optionally binding them to a name. The
    /// constraint applies to every element of the run.
    BlankSequence {
        name: Option<Symbol>,
        constraint: Option<Constraint>,
    },

    /// Matches a function application whose head and arguments match these patterns.
    Function {
        head: Box<Pattern>,
        args: Vec<Pattern>,
    },
}

impl Pattern {
    /// A pattern that only matches the given expression.
    pub fn literal(expr: impl Into<Expr>) -> Self {
        Self::Literal(expr.into())
    }

    /// A pattern that only matches the symbol with the given name.
    pub fn symbol(name: &str) -> Self {
        Self::Literal(Expr::symbol(name))
    }

    /// An anonymous blank, `_`.
    pub fn anon() -> Self {
        Self::Blank { name: None, constraint: None }
    }

    /// A named blank, `x_`.
    pub fn blank(name: &str) -> Self {
        Self::Blank { name: Some(Symbol::new(name)), constraint: None }
    }

    /// A named blank constrained to a head, `x_Integer`.
    pub fn blank_head(name: &str, head: &str) -> Self {
        Self::Blank {
            name: Some(Symbol::new(name)),
            constraint: Some(Constraint::Head(Expr::symbol(head))),
        }
    }

    /// A named blank constrained by a predicate, `x_?test`.
    pub fn blank_test(name: &str, test: impl Fn(&Expr) -> bool + Send + Sync + 'static) -> Self {
        Self::Blank {
            name: Some(Symbol::new(name)),
            constraint: Some(Constraint::Test(Arc::new(test))),
        }
    }

    /// A named sequence blank, `xs__`.
    pub fn sequence(name: &str) -> Self {
        Self::BlankSequence { name: Some(Symbol::new(name)), constraint: None }
    }

    /// A named sequence blank whose elements are constrained by a predicate.
    pub fn sequence_test(name: &str, test: impl Fn(&Expr) -> bool + Send + Sync + 'static) -> Self {
        Self::BlankSequence {
            name: Some(Symbol::new(name)),
            constraint: Some(Constraint::Test(Arc::new(test))),
        }
    }

    /// A pattern matching calls to the symbol with the given name.
    pub fn call(name: &str, args: impl IntoIterator<Item = Pattern>) -> Self {
        Self::function(Self::symbol(name), args)
    }

    /// A pattern matching function applications with an arbitrary head pattern.
    pub fn function(head: Pattern, args: impl IntoIterator<Item = Pattern>) -> Self {
        Self::Function {
            head: Box::new(head),
            args: args.into_iter().collect(),
        }
    }

    /// Returns every variable bound by the pattern, in the order of their first occurrence,
    /// along with the kind of value it is bound to.
    ///
    /// A variable used both as a blank and as a sequence blank is reported once for each kind.
    pub fn variables(&self) -> Vec<(Symbol, VariableKind)> {
        let mut variables = Vec::new();
        self.collect_variables(&mut variables);
        variables
    }

    fn collect_variables(&self, variables: &mut Vec<(Symbol, VariableKind)>) {
        fn add(variables: &mut Vec<(Symbol, VariableKind)>, name: &Option<Symbol>, kind: VariableKind) {
            if let Some(name) = name {
                if !variables.iter().any(|(existing, k)| existing == name && *k == kind) {
                    variables.push((name.clone(), kind));
                }
            }
        }

        match self {
            Self::Literal(_) => {},
            Self::Blank { name, .. } => add(variables, name, VariableKind::One),
            Self::BlankSequence { name, .. } => add(variables, name, VariableKind::Sequence),
            Self::Function { head, args } => {
                head.collect_variables(variables);
                for arg in args {
                    arg.collect_variables(variables);
                }
            },
        }
    }

    /// Returns the names of the sequence blanks that appear somewhere other than directly in an
    /// argument list. Such blanks can never match. Anonymous sequence blanks are reported as
    /// `__`.
    pub(crate) fn misplaced_sequences(&self) -> Vec<String> {
        fn visit(pattern: &Pattern, in_args: bool, out: &mut Vec<String>) {
            match pattern {
                Pattern::BlankSequence { name, .. } if !in_args => {
                    out.push(name.as_ref().map_or_else(|| "__".to_string(), |name| name.to_string()));
                },
                Pattern::Function { head, args } => {
                    visit(head, false, out);
                    for arg in args {
                        visit(arg, true, out);
                    }
                },
                _ => {},
            }
        }

        let mut out = Vec::new();
        visit(self, false, &mut out);
        out
    }
}

impl From<Expr> for Pattern {
    fn from(expr: Expr) -> Self {
        Self::Literal(expr)
    }
}

impl From<i32> for Pattern {
    fn from(n: i32) -> Self {
        Self::Literal(Expr::from(n))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_blank(
            f: &mut fmt::Formatter<'_>,
            name: &Option<Symbol>,
            underscores: &str,
            constraint: &Option<Constraint>,
        ) -> fmt::Result {
            if let Some(name) = name {
                write!(f, "{}", name)?;
            }
            write!(f, "{}", underscores)?;
            match constraint {
                Some(Constraint::Head(head)) => write!(f, "{}", head),
                Some(Constraint::Test(_)) => write!(f, "?test"),
                None => Ok(()),
            }
        }

        match self {
            Self::Literal(expr) => write!(f, "{}", expr),
            Self::Blank { name, constraint } => write_blank(f, name, "_", constraint),
            Self::BlankSequence { name, constraint } => write_blank(f, name, "__", constraint),
            Self::Function { head, args } => {
                write!(f, "{}[", head)?;
                let mut iter = args.iter();
                if let Some(arg) = iter.next() {
                    write!(f, "{}", arg)?;
                    for arg in iter {
                        write!(f, ", {}", arg)?;
                    }
                }
                write!(f, "]")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn display() {
        let pattern = Pattern::call("Plus", [
            Pattern::blank_head("n", "Integer"),
            Pattern::sequence("xs"),
            Pattern::blank_test("t", Expr::is_number),
            Pattern::anon(),
            Pattern::literal(0),
        ]);
        assert_eq!(pattern.to_string(), "Plus[n_Integer, xs__, t_?test, _, 0]");
    }

    #[test]
    fn variables() {
        let pattern = Pattern::call("f", [
            Pattern::blank("a"),
            Pattern::call("g", [Pattern::sequence("b"), Pattern::blank("a")]),
            Pattern::anon(),
        ]);
        let names = pattern
            .variables()
            .into_iter()
            .map(|(name, kind)| (name.to_string(), kind))
            .collect::<Vec<_>>();
        assert_eq!(names, [
            ("a".to_string(), VariableKind::One),
            ("b".to_string(), VariableKind::Sequence),
        ]);
    }

    #[test]
    fn misplaced_sequences() {
        assert!(Pattern::call("f", [Pattern::sequence("xs")]).misplaced_sequences().is_empty());
        assert_eq!(Pattern::sequence("xs").misplaced_sequences(), ["xs"]);
        let head = Pattern::function(
            Pattern::BlankSequence { name: None, constraint: None },
            [Pattern::blank("x")],
        );
        assert_eq!(head.misplaced_sequences(), ["__"]);
    }
}
