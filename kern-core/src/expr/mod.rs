//! The expression tree that every part of the kernel operates on.
//!
//! An [`Expr`] is either an atom (a number, a [`Symbol`], or [`Expr::Indeterminate`]) or a
//! function application with a head and a list of arguments. Operators are ordinary function
//! applications: `x + 2` is `Plus[x, 2]`, and `x / y` is `Divide[x, y]` until the built-in rules
//! rewrite it. Only the [`Normalizer`](crate::Normalizer) gives these heads any meaning.
//!
//! # Canonical numbers
//!
//! Numbers have exactly one representation each. A [`Rational`] whose reduced denominator is one
//! is always stored as an [`Expr::Integer`], and reals are always finite, with negative zero
//! stored as positive zero. The constructors in this module maintain these properties; code that
//! builds the variants directly must maintain them too.
//!
//! # Equality and ordering
//!
//! [`PartialEq`] is **structural**: two expressions are equal when they have the same shape and
//! the same atoms, in the same order. `Plus[x, y]` and `Plus[y, x]` are different expressions;
//! the normalizer makes them equal by sorting the arguments of `Orderless` heads using the total
//! order implemented by [`Ord`]:
//!
//! - numbers come first, ordered by numeric value (`1 < 3/2 < 2.5 < 3`); a tie between numbers of
//! different types orders `Integer < Rational < Real`,
//! - then symbols, ordered by name,
//! - then function applications, ordered by head and then by argument list,
//! - and finally [`Expr::Indeterminate`].
//!
//! # Printing
//!
//! The [`Display`](std::fmt::Display) implementation prints the full form of the expression, in
//! which every operator is written as a function application: `Plus[Times[2, x], 1]`. The full
//! form can be read back by `kern_parser`.

mod iter;

use crate::{
    consts::{FALSE, INTEGER, RATIONAL, REAL, SYMBOL, TRUE},
    error::InvalidLiteral,
    primitive::{canonical_real, cmp_exact_real, is_integral, quotient},
    symbol::Symbol,
};
use iter::ExprIter;
use rug::{Integer, Rational};
use std::{cmp::Ordering, fmt, hash::{Hash, Hasher}, sync::Arc};

/// A function application, such as `Sin[x]` or `f[a][b]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    head: Expr,
    args: Vec<Expr>,
}

impl Function {
    /// The head of the application; `Sin` in `Sin[x]`.
    pub fn head(&self) -> &Expr {
        &self.head
    }

    /// The arguments of the application.
    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    /// If the head is a symbol, returns it.
    pub fn head_symbol(&self) -> Option<&Symbol> {
        self.head.as_symbol()
    }
}

/// A symbolic expression.
///
/// For more information about this type, see the [module-level documentation](self).
#[derive(Debug, Clone)]
pub enum Expr {
    /// An integer of arbitrary size, such as `2` or `-144`.
    Integer(Integer),

    /// An exact fraction, such as `1/2`. The denominator is never one.
    Rational(Rational),

    /// A finite floating-point number, such as `0.5`.
    Real(f64),

    /// A symbol, such as `x` or `Pi`.
    Symbol(Symbol),

    /// A function application, such as `Plus[x, 2]`.
    Function(Arc<Function>),

    /// The result of an undefined operation, such as `0/0`.
    Indeterminate,
}

impl Expr {
    /// Creates the exact quotient `numer / denom`, reduced to lowest terms. The result is an
    /// [`Expr::Integer`] if the quotient is a whole number.
    pub fn rational(numer: Integer, denom: Integer) -> Result<Self, InvalidLiteral> {
        let literal = format!("{}/{}", numer, denom);
        quotient(numer, denom)
            .map(Self::from_rational)
            .ok_or_else(|| InvalidLiteral {
                literal,
                reason: "division by zero".to_string(),
            })
    }

    /// Creates an exact number from a [`Rational`], demoting it to an [`Expr::Integer`] if its
    /// denominator is one.
    pub fn from_rational(value: Rational) -> Self {
        if is_integral(&value) {
            let (numer, _) = value.into_numer_denom();
            Self::Integer(numer)
        } else {
            Self::Rational(value)
        }
    }

    /// Creates a real expression. The value must be finite.
    pub fn real(value: f64) -> Result<Self, InvalidLiteral> {
        canonical_real(value).map(Self::Real).ok_or_else(|| InvalidLiteral {
            literal: value.to_string(),
            reason: "the value is not finite".to_string(),
        })
    }

    /// Creates a real expression, or [`Expr::Indeterminate`] if the value is not finite.
    ///
    /// This is the constructor used for the results of floating-point arithmetic.
    pub fn from_real(value: f64) -> Self {
        canonical_real(value).map(Self::Real).unwrap_or(Self::Indeterminate)
    }

    /// Creates a symbol expression.
    pub fn symbol(name: &str) -> Self {
        Self::Symbol(Symbol::new(name))
    }

    /// Creates the symbol `True` or `False`.
    pub fn boolean(value: bool) -> Self {
        if value {
            Self::Symbol(TRUE.clone())
        } else {
            Self::Symbol(FALSE.clone())
        }
    }

    /// Creates a function application with an arbitrary head.
    pub fn function(head: Expr, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::Function(Arc::new(Function {
            head,
            args: args.into_iter().collect(),
        }))
    }

    /// Creates a function application whose head is the symbol with the given name.
    pub fn call(name: &str, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::function(Self::symbol(name), args)
    }

    /// Creates a function application whose head is the given symbol.
    pub fn apply(head: &Symbol, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::function(Self::Symbol(head.clone()), args)
    }

    /// Returns the head of the expression: the head of a function application, or the
    /// expression itself if it is an atom.
    pub fn head(&self) -> Expr {
        match self {
            Self::Function(function) => function.head.clone(),
            atom => atom.clone(),
        }
    }

    /// Returns the type of the expression: the symbol `Integer`, `Rational`, `Real` or `Symbol`
    /// for atoms, and the head of a function application.
    ///
    /// [`Expr::Indeterminate`] is its own type.
    pub fn type_head(&self) -> Expr {
        match self {
            Self::Integer(_) => Self::Symbol(INTEGER.clone()),
            Self::Rational(_) => Self::Symbol(RATIONAL.clone()),
            Self::Real(_) => Self::Symbol(REAL.clone()),
            Self::Symbol(_) => Self::Symbol(SYMBOL.clone()),
            Self::Function(function) => function.head.clone(),
            Self::Indeterminate => Self::Indeterminate,
        }
    }

    /// Returns true if the expression has the type given by [`Expr::type_head`], without
    /// building the type expression.
    pub fn has_type(&self, ty: &Expr) -> bool {
        match (self, ty) {
            (Self::Integer(_), Self::Symbol(sym)) => *sym == *INTEGER,
            (Self::Rational(_), Self::Symbol(sym)) => *sym == *RATIONAL,
            (Self::Real(_), Self::Symbol(sym)) => *sym == *REAL,
            (Self::Symbol(_), Self::Symbol(sym)) => *sym == *SYMBOL,
            (Self::Function(function), ty) => function.head == *ty,
            (Self::Indeterminate, Self::Indeterminate) => true,
            _ => false,
        }
    }

    /// Returns true if the expression is not a function application.
    pub fn is_atom(&self) -> bool {
        !matches!(self, Self::Function(_))
    }

    /// Returns true if the expression is an [`Expr::Integer`], [`Expr::Rational`] or
    /// [`Expr::Real`].
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Rational(_) | Self::Real(_))
    }

    /// Returns true if the expression is an exact number equal to zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Integer(n) if n.cmp0() == Ordering::Equal)
    }

    /// Returns true if the expression is an exact number equal to one.
    pub fn is_one(&self) -> bool {
        matches!(self, Self::Integer(n) if *n == 1)
    }

    /// If the expression is an [`Expr::Integer`], returns a reference to the contained integer.
    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Self::Integer(int) => Some(int),
            _ => None,
        }
    }

    /// If the expression is an exact number, returns its value.
    pub fn as_exact(&self) -> Option<Rational> {
        match self {
            Self::Integer(int) => Some(Rational::from(int)),
            Self::Rational(rational) => Some(rational.clone()),
            _ => None,
        }
    }

    /// If the expression is an [`Expr::Real`], returns the contained value.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// If the expression is an [`Expr::Symbol`], returns a reference to the contained symbol.
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Self::Symbol(sym) => Some(sym),
            _ => None,
        }
    }

    /// If the expression is an [`Expr::Function`], returns a reference to the application.
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Self::Function(function) => Some(function),
            _ => None,
        }
    }

    /// Returns the arguments of a function application, or an empty slice for atoms.
    pub fn args(&self) -> &[Expr] {
        match self {
            Self::Function(function) => &function.args,
            _ => &[],
        }
    }

    /// Returns true if the expression is a function application whose head is the given symbol.
    pub fn has_head(&self, head: &Symbol) -> bool {
        match self {
            Self::Function(function) => function.head_symbol() == Some(head),
            _ => false,
        }
    }

    /// Returns true if the expression is [`Expr::Indeterminate`].
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::Indeterminate)
    }

    /// Returns the number of atoms in the expression, counting heads.
    pub fn leaf_count(&self) -> usize {
        self.post_order_iter().filter(|expr| expr.is_atom()).count()
    }

    /// Builds the function application `head[args]`. If this expression is already that
    /// application, its allocation is reused.
    pub fn with_args(&self, head: Expr, args: Vec<Expr>) -> Self {
        match self {
            Self::Function(function) if function.head == head && function.args == args => self.clone(),
            _ => Self::function(head, args),
        }
    }

    /// Returns an iterator that traverses the tree of expressions in left-to-right post-order
    /// (i.e. depth-first). The head of a function application is visited before its arguments.
    pub fn post_order_iter(&self) -> ExprIter {
        ExprIter::new(self)
    }

    /// The position of the expression's variant in the total order.
    fn rank(&self) -> u8 {
        match self {
            Self::Integer(_) | Self::Rational(_) | Self::Real(_) => 0,
            Self::Symbol(_) => 1,
            Self::Function(_) => 2,
            Self::Indeterminate => 3,
        }
    }

    /// The position of a number's type, used to break ties between numerically equal numbers.
    fn number_rank(&self) -> u8 {
        match self {
            Self::Integer(_) => 0,
            Self::Rational(_) => 1,
            _ => 2,
        }
    }
}

/// Compares two numbers by value, then by type.
fn cmp_numbers(lhs: &Expr, rhs: &Expr) -> Ordering {
    let by_value = match (lhs, rhs) {
        (Expr::Integer(lhs), Expr::Integer(rhs)) => lhs.cmp(rhs),
        (Expr::Real(lhs), Expr::Real(rhs)) => lhs.total_cmp(rhs),
        (Expr::Real(lhs), rhs) => rhs
            .as_exact()
            .map(|rhs| cmp_exact_real(&rhs, *lhs).reverse())
            .unwrap_or(Ordering::Equal),
        (lhs, Expr::Real(rhs)) => lhs
            .as_exact()
            .map(|lhs| cmp_exact_real(&lhs, *rhs))
            .unwrap_or(Ordering::Equal),
        (lhs, rhs) => lhs.as_exact().cmp(&rhs.as_exact()),
    };
    by_value.then_with(|| lhs.number_rank().cmp(&rhs.number_rank()))
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(lhs), Self::Integer(rhs)) => lhs == rhs,
            (Self::Rational(lhs), Self::Rational(rhs)) => lhs == rhs,
            (Self::Real(lhs), Self::Real(rhs)) => lhs.to_bits() == rhs.to_bits(),
            (Self::Symbol(lhs), Self::Symbol(rhs)) => lhs == rhs,
            (Self::Function(lhs), Self::Function(rhs)) => Arc::ptr_eq(lhs, rhs) || lhs == rhs,
            (Self::Indeterminate, Self::Indeterminate) => true,
            _ => false,
        }
    }
}

/// Reals are always finite and never negative zero, so comparing their bits is the same as
/// comparing their values.
impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Integer(int) => int.hash(state),
            Self::Rational(rational) => rational.hash(state),
            Self::Real(value) => value.to_bits().hash(state),
            Self::Symbol(sym) => sym.hash(state),
            Self::Function(function) => function.hash(state),
            Self::Indeterminate => {},
        }
    }
}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Symbol(lhs), Self::Symbol(rhs)) => lhs.cmp(rhs),
            (Self::Function(lhs), Self::Function(rhs)) => {
                if Arc::ptr_eq(lhs, rhs) {
                    Ordering::Equal
                } else {
                    lhs.head.cmp(&rhs.head).then_with(|| lhs.args.cmp(&rhs.args))
                }
            },
            (lhs, rhs) if lhs.is_number() && rhs.is_number() => cmp_numbers(lhs, rhs),
            (lhs, rhs) => lhs.rank().cmp(&rhs.rank()),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(int) => write!(f, "{}", int),
            Self::Rational(rational) => {
                write!(f, "Rational[{}, {}]", rational.numer(), rational.denom())
            },
            // `Debug` prints the shortest representation that reads back to the same value, and
            // always includes a decimal point or an exponent
            Self::Real(value) => write!(f, "{:?}", value),
            Self::Symbol(sym) => write!(f, "{}", sym),
            Self::Function(function) => {
                write!(f, "{}[", function.head)?;
                let mut iter = function.args.iter();
                if let Some(arg) = iter.next() {
                    write!(f, "{}", arg)?;
                    for arg in iter {
                        write!(f, ", {}", arg)?;
                    }
                }
                write!(f, "]")
            },
            Self::Indeterminate => write!(f, "Indeterminate"),
        }
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        Self::Integer(Integer::from(n))
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Self::Integer(Integer::from(n))
    }
}

impl From<Integer> for Expr {
    fn from(n: Integer) -> Self {
        Self::Integer(n)
    }
}

impl From<Rational> for Expr {
    fn from(value: Rational) -> Self {
        Self::from_rational(value)
    }
}

impl From<Symbol> for Expr {
    fn from(sym: Symbol) -> Self {
        Self::Symbol(sym)
    }
}

impl From<&Symbol> for Expr {
    fn from(sym: &Symbol) -> Self {
        Self::Symbol(sym.clone())
    }
}
