//! The evaluation core of the kern computer-algebra kernel.
//!
//! # Expression representation
//!
//! Every mathematical object is an [`Expr`]: a number, a [`Symbol`], a function application such
//! as `Sin[2]` (`Function(Symbol("Sin"), [Integer(2)])`), or the [`Expr::Indeterminate`] value.
//! Expressions are immutable; function nodes are reference counted, so rewriting an expression
//! builds new nodes while sharing every untouched subtree with the original.
//!
//! # Rewriting
//!
//! Simplification is done by a [`Normalizer`], which repeatedly applies the [`Rule`]s stored in
//! a [`RuleDatabase`] until no rule changes the expression. Rules are plain data: a [`Pattern`]
//! to match, an optional [`Guard`], and a [`Replacement`] to build from the variables bound by the
//! pattern.
//!
//! ```
//! use kern_core::{normalize, Expr, RuleDatabase};
//!
//! let db = RuleDatabase::with_builtins().unwrap();
//!
//! // `2 + 2 = 4`
//! let expr = Expr::call("Plus", [Expr::from(2), Expr::from(2)]);
//! assert_eq!(normalize(&db, &expr).expr, Expr::from(4));
//!
//! // `Sin[2*Pi] = 0`
//! let expr = Expr::call("Sin", [Expr::call("Times", [Expr::from(2), Expr::symbol("Pi")])]);
//! assert_eq!(normalize(&db, &expr).expr, Expr::from(0));
//! ```
//!
//! New behavior is added by registering rules, without touching the engine:
//!
//! ```
//! use kern_core::{normalize, Expr, Pattern, Rule, RuleDatabase, Template};
//!
//! let mut db = RuleDatabase::with_builtins().unwrap();
//!
//! // `Double[x_] -> Times[2, x]`
//! db.register(Rule::new(
//!     Pattern::call("Double", [Pattern::blank("x")]),
//!     Template::call("Times", [Template::from(2), Template::var("x")]),
//! )).unwrap();
//!
//! let expr = Expr::call("Double", [Expr::from(21)]);
//! assert_eq!(normalize(&db, &expr).expr, Expr::from(42));
//! ```

pub mod attributes;
pub mod builtins;
pub mod consts;
pub mod error;
pub mod expr;
pub mod normalize;
pub mod pattern;
pub mod primitive;
pub mod rule;
pub mod symbol;

pub use attributes::{Attribute, Attributes};
pub use error::{InvalidLiteral, MalformedReason, MalformedRule};
pub use expr::{Expr, Function};
pub use normalize::{normalize, Normalized, NormalizeConfig, NormalizeConfigBuilder, Normalizer, Status};
pub use pattern::{match_pattern, match_with, Binding, BindingSet, Constraint, Pattern, VariableKind};
pub use rule::{Guard, Replacement, Rule, RuleDatabase, Template};
pub use symbol::Symbol;
