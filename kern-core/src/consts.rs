//! Symbols and values used throughout the kernel. This module consists of static constants that
//! are created once, on first use.

use once_cell::sync::Lazy;
use crate::{expr::Expr, symbol::Symbol};

pub static PLUS: Lazy<Symbol> = Lazy::new(|| Symbol::new("Plus"));

pub static TIMES: Lazy<Symbol> = Lazy::new(|| Symbol::new("Times"));

pub static POWER: Lazy<Symbol> = Lazy::new(|| Symbol::new("Power"));

pub static AND: Lazy<Symbol> = Lazy::new(|| Symbol::new("And"));

pub static OR: Lazy<Symbol> = Lazy::new(|| Symbol::new("Or"));

pub static NOT: Lazy<Symbol> = Lazy::new(|| Symbol::new("Not"));

pub static TRUE: Lazy<Symbol> = Lazy::new(|| Symbol::new("True"));

pub static FALSE: Lazy<Symbol> = Lazy::new(|| Symbol::new("False"));

/// The circle constant.
pub static PI: Lazy<Symbol> = Lazy::new(|| Symbol::new("Pi"));

/// Euler's number.
pub static E: Lazy<Symbol> = Lazy::new(|| Symbol::new("E"));

/// The head reported by [`Expr::type_head`] for integers.
pub static INTEGER: Lazy<Symbol> = Lazy::new(|| Symbol::new("Integer"));

/// The head reported by [`Expr::type_head`] for exact non-integer fractions.
pub static RATIONAL: Lazy<Symbol> = Lazy::new(|| Symbol::new("Rational"));

/// The head reported by [`Expr::type_head`] for reals.
pub static REAL: Lazy<Symbol> = Lazy::new(|| Symbol::new("Real"));

/// The head reported by [`Expr::type_head`] for symbols.
pub static SYMBOL: Lazy<Symbol> = Lazy::new(|| Symbol::new("Symbol"));

pub static ONE: Lazy<Expr> = Lazy::new(|| Expr::from(1));
