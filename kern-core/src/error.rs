//! Errors reported by the kernel.
//!
//! Rewriting itself never fails: an expression that cannot be simplified further is simply
//! returned as-is. Errors only arise when constructing values from user input, or when registering
//! a rule that could never be applied consistently.

use kern_attrs::ErrorKind;
use kern_error::ErrorKind;
use std::fmt;

/// A numeric literal could not be turned into a number.
#[derive(Debug, Clone, ErrorKind, PartialEq, Eq)]
#[error(
    message = format!("invalid numeric literal `{}`", literal),
    labels = [format!("{}", reason)],
)]
pub struct InvalidLiteral {
    /// The literal as written.
    pub literal: String,

    /// Why the literal was rejected.
    pub reason: String,
}

/// The reason a rule was rejected by [`RuleDatabase::register`](crate::RuleDatabase::register).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// The same pattern variable is used both as a single blank (`x_`) and as a sequence blank
    /// (`x__`).
    MixedBinding,

    /// The replacement or guard refers to a variable that the pattern never binds.
    UnboundVariable,

    /// A sequence blank appears somewhere other than directly in an argument list, where it can
    /// never match anything.
    MisplacedSequence,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MixedBinding => write!(f, "used as both a single and a sequence variable"),
            Self::UnboundVariable => write!(f, "not bound by the pattern"),
            Self::MisplacedSequence => write!(f, "sequence variable outside of an argument list"),
        }
    }
}

/// A rule was rejected at registration time.
#[derive(Debug, Clone, ErrorKind, PartialEq, Eq)]
#[error(
    message = format!("cannot register rule `{}`", rule),
    help = format!("{}: {}", reason, variables.join(", ")),
)]
pub struct MalformedRule {
    /// The name of the rejected rule.
    pub rule: String,

    /// The offending pattern variables.
    pub variables: Vec<String>,

    /// What is wrong with the variables.
    pub reason: MalformedReason,
}
