//! Rewrite rules.
//!
//! A [`Rule`] pairs a [`Pattern`] with a [`Replacement`]. When the pattern matches an expression
//! (and the optional [`Guard`] accepts the bindings), the expression is replaced by the
//! instantiated replacement:
//!
//! ```
//! use kern_core::{Expr, Pattern, Rule, RuleDatabase, Template};
//!
//! // `Square[x_] -> Times[x, x]`
//! let rule = Rule::new(
//!     Pattern::call("Square", [Pattern::blank("x")]),
//!     Template::call("Times", [Template::var("x"), Template::var("x")]),
//! );
//!
//! let db = RuleDatabase::new();
//! let expr = Expr::call("Square", [Expr::symbol("y")]);
//! assert_eq!(rule.apply(&expr, &db).unwrap().to_string(), "Times[y, y]");
//! ```
//!
//! Replacements that cannot be written as a template, such as folding numbers together, are
//! [native](Replacement::Native) functions of the bindings.

mod database;

pub use database::{Candidates, RuleDatabase, RuleKey};

use crate::{
    error::{MalformedReason, MalformedRule},
    expr::Expr,
    pattern::{match_with, BindingSet, Binding, Pattern, VariableKind},
    symbol::Symbol,
};
use std::{fmt, sync::Arc};

/// A predicate over the bindings of a match.
pub type GuardFn = dyn Fn(&BindingSet) -> bool + Send + Sync;

/// A computation that builds the replacement of a match. Returning [`None`] rejects the match.
pub type NativeFn = dyn Fn(&BindingSet, &RuleDatabase) -> Option<Expr> + Send + Sync;

/// A condition on the bindings of a match, which must hold for the rule to fire.
#[derive(Clone)]
pub struct Guard {
    vars: Vec<Symbol>,
    pred: Arc<GuardFn>,
}

impl Guard {
    /// Creates a guard that reads the given variables.
    pub fn new<'a>(
        vars: impl IntoIterator<Item = &'a str>,
        pred: impl Fn(&BindingSet) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            vars: vars.into_iter().map(Symbol::new).collect(),
            pred: Arc::new(pred),
        }
    }

    /// The variables the guard reads.
    pub fn vars(&self) -> &[Symbol] {
        &self.vars
    }

    /// Returns true if the guard accepts the bindings.
    pub fn accepts(&self, bindings: &BindingSet) -> bool {
        (self.pred)(bindings)
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").field("vars", &self.vars).finish_non_exhaustive()
    }
}

/// An expression with holes, filled in from the bindings of a match.
#[derive(Debug, Clone)]
pub enum Template {
    /// Copied into the result as-is.
    Literal(Expr),

    /// Replaced by the value bound to the variable. A sequence variable in an argument list is
    /// spliced into it.
    Var(Symbol),

    /// A function application built from instantiated parts.
    Function {
        head: Box<Template>,
        args: Vec<Template>,
    },
}

impl Template {
    /// The value bound to the given variable.
    pub fn var(name: &str) -> Self {
        Self::Var(Symbol::new(name))
    }

    /// The symbol with the given name.
    pub fn symbol(name: &str) -> Self {
        Self::Literal(Expr::symbol(name))
    }

    /// A call to the symbol with the given name.
    pub fn call(name: &str, args: impl IntoIterator<Item = Template>) -> Self {
        Self::function(Self::symbol(name), args)
    }

    /// A function application with an arbitrary head.
    pub fn function(head: Template, args: impl IntoIterator<Item = Template>) -> Self {
        Self::Function {
            head: Box::new(head),
            args: args.into_iter().collect(),
        }
    }

    /// Builds the expression, or returns [`None`] if a variable is unbound or a sequence variable
    /// appears outside an argument list.
    pub fn instantiate(&self, bindings: &BindingSet) -> Option<Expr> {
        match self {
            Self::Literal(expr) => Some(expr.clone()),
            Self::Var(name) => match bindings.get(name)? {
                Binding::One(expr) => Some(expr.clone()),
                Binding::Sequence(_) => None,
            },
            Self::Function { head, args } => {
                let head = head.instantiate(bindings)?;
                let mut out = Vec::with_capacity(args.len());
                for arg in args {
                    match arg {
                        Self::Var(name) => match bindings.get(name)? {
                            Binding::One(expr) => out.push(expr.clone()),
                            Binding::Sequence(run) => out.extend(run.iter().cloned()),
                        },
                        arg => out.push(arg.instantiate(bindings)?),
                    }
                }
                Some(Expr::function(head, out))
            },
        }
    }

    /// Calls `f` on every variable in the template, along with whether it appears directly in an
    /// argument list.
    fn visit_vars(&self, in_args: bool, f: &mut impl FnMut(&Symbol, bool)) {
        match self {
            Self::Literal(_) => {},
            Self::Var(name) => f(name, in_args),
            Self::Function { head, args } => {
                head.visit_vars(false, f);
                for arg in args {
                    arg.visit_vars(true, f);
                }
            },
        }
    }
}

impl From<Expr> for Template {
    fn from(expr: Expr) -> Self {
        Self::Literal(expr)
    }
}

impl From<i32> for Template {
    fn from(n: i32) -> Self {
        Self::Literal(Expr::from(n))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(expr) => write!(f, "{}", expr),
            Self::Var(name) => write!(f, "{}", name),
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

/// How the result of a rule is built.
#[derive(Clone)]
pub enum Replacement {
    /// Instantiate a template.
    Template(Template),

    /// Run a computation over the bindings, which reads the given variables.
    Native {
        vars: Vec<Symbol>,
        compute: Arc<NativeFn>,
    },
}

impl Replacement {
    /// Builds the replacement for the given bindings.
    pub fn instantiate(&self, bindings: &BindingSet, db: &RuleDatabase) -> Option<Expr> {
        match self {
            Self::Template(template) => template.instantiate(bindings),
            Self::Native { compute, .. } => compute(bindings, db),
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Native { vars, .. } => f.debug_struct("Native").field("vars", vars).finish_non_exhaustive(),
        }
    }
}

/// A rewrite rule.
///
/// For more information about rules, see the [module-level documentation](self).
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    pattern: Pattern,
    guard: Option<Guard>,
    replacement: Replacement,
    priority: i32,
}

impl Rule {
    /// Creates a rule that replaces matches of the pattern with the instantiated template. The
    /// rule is named after its source form, such as `Plus[x_] -> x`.
    pub fn new(pattern: Pattern, template: impl Into<Template>) -> Self {
        let template = template.into();
        Self {
            name: format!("{} -> {}", pattern, template),
            pattern,
            guard: None,
            replacement: Replacement::Template(template),
            priority: 0,
        }
    }

    /// Creates a rule whose replacement is computed by the given function, which reads the given
    /// variables. If the function returns [`None`], the rule does not fire.
    pub fn native<'a>(
        pattern: Pattern,
        vars: impl IntoIterator<Item = &'a str>,
        compute: impl Fn(&BindingSet, &RuleDatabase) -> Option<Expr> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: format!("{} -> <native>", pattern),
            pattern,
            guard: None,
            replacement: Replacement::Native {
                vars: vars.into_iter().map(Symbol::new).collect(),
                compute: Arc::new(compute),
            },
            priority: 0,
        }
    }

    /// Adds a guard to the rule.
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Adds a guard reading the given variables to the rule.
    pub fn when<'a>(
        self,
        vars: impl IntoIterator<Item = &'a str>,
        pred: impl Fn(&BindingSet) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.with_guard(Guard::new(vars, pred))
    }

    /// Sets the priority of the rule. Rules with higher priority are tried first. The default
    /// priority is zero.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the name of the rule, used in logs and errors.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    pub fn replacement(&self) -> &Replacement {
        &self.replacement
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// The bucket of the database the rule is stored in.
    pub fn key(&self) -> RuleKey {
        match &self.pattern {
            Pattern::Function { head, .. } => match &**head {
                Pattern::Literal(head) => RuleKey::Head(head.clone()),
                _ => RuleKey::Any,
            },
            Pattern::Literal(expr @ Expr::Function(_)) => RuleKey::Head(expr.head()),
            _ => RuleKey::Any,
        }
    }

    /// Applies the rule to the expression, returning the replacement if the rule fires.
    ///
    /// The guard and the replacement are tried against every way the pattern matches, in the
    /// order the matcher produces them; the first accepted match wins. Arguments of `Orderless`
    /// and `Flat` heads are matched using the attributes recorded in `db`.
    pub fn apply(&self, expr: &Expr, db: &RuleDatabase) -> Option<Expr> {
        let mut result = None;
        let attributes = |head: &Expr| db.attributes_of(head);
        match_with(&self.pattern, expr, BindingSet::new(), attributes, |bindings| {
            if let Some(guard) = &self.guard {
                if !guard.accepts(bindings) {
                    return false;
                }
            }
            result = self.replacement.instantiate(bindings, db);
            result.is_some()
        })?;
        result
    }

    /// Checks that the rule can be applied consistently: no variable is bound both as a single
    /// expression and as a sequence, every sequence blank is in an argument list, and every
    /// variable read by the guard or the replacement is bound by the pattern.
    pub fn validate(&self) -> Result<(), MalformedRule> {
        let fail = |variables: Vec<String>, reason| {
            Err(MalformedRule {
                rule: self.name.clone(),
                variables,
                reason,
            })
        };

        let bound = self.pattern.variables();
        let mixed = bound
            .iter()
            .filter(|(name, kind)| {
                *kind == VariableKind::Sequence
                    && bound.iter().any(|(other, k)| other == name && *k == VariableKind::One)
            })
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>();
        if !mixed.is_empty() {
            return fail(mixed, MalformedReason::MixedBinding);
        }

        let misplaced = self.pattern.misplaced_sequences();
        if !misplaced.is_empty() {
            return fail(misplaced, MalformedReason::MisplacedSequence);
        }

        let kind_of = |name: &Symbol| {
            bound.iter().find(|(bound, _)| bound == name).map(|(_, kind)| *kind)
        };

        let mut unbound = Vec::new();
        let mut misplaced = Vec::new();
        let mut read = |name: &Symbol, in_args: bool| match kind_of(name) {
            None => push_unique(&mut unbound, name),
            Some(VariableKind::Sequence) if !in_args => push_unique(&mut misplaced, name),
            Some(_) => {},
        };

        if let Some(guard) = &self.guard {
            guard.vars.iter().for_each(|name| read(name, true));
        }
        match &self.replacement {
            Replacement::Template(template) => template.visit_vars(false, &mut read),
            Replacement::Native { vars, .. } => vars.iter().for_each(|name| read(name, true)),
        }

        if !unbound.is_empty() {
            return fail(unbound, MalformedReason::UnboundVariable);
        }
        if !misplaced.is_empty() {
            return fail(misplaced, MalformedReason::MisplacedSequence);
        }
        Ok(())
    }
}

fn push_unique(names: &mut Vec<String>, name: &Symbol) {
    if !names.iter().any(|existing| existing == name.name()) {
        names.push(name.to_string());
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
