use kern_core::{consts::{AND, OR, PLUS, POWER, TIMES}, Expr, Symbol};
use crate::tokenizer::TokenKind;

/// The associativity of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a op b op c = (a op b) op c`
    Left,

    /// `a op b op c = a op (b op c)`
    Right,
}

/// The precedence of an operator, from lowest to highest.
///
/// `Not` and `Neg` are the precedences of the prefix operators `!` and `-`. The operand of a
/// prefix operator extends over every binary operator of higher precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Binds looser than every operator; used to parse a complete expression.
    Any,
    Or,
    And,
    Not,
    Term,
    Factor,
    Neg,
    Exp,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Exp,
    And,
    Or,

    /// Two operands written next to each other, as in `2 x`. There is no token for this
    /// operator.
    ImplicitMul,
}

impl BinOp {
    /// Returns the operator written with the given token, if any.
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Add => Self::Add,
            TokenKind::Sub => Self::Sub,
            TokenKind::Mul => Self::Mul,
            TokenKind::Div => Self::Div,
            TokenKind::Exp => Self::Exp,
            TokenKind::And => Self::And,
            TokenKind::Or => Self::Or,
            _ => return None,
        })
    }

    /// Returns the precedence of the operator.
    pub fn precedence(self) -> Precedence {
        match self {
            Self::Add | Self::Sub => Precedence::Term,
            Self::Mul | Self::Div | Self::ImplicitMul => Precedence::Factor,
            Self::Exp => Precedence::Exp,
            Self::And => Precedence::And,
            Self::Or => Precedence::Or,
        }
    }

    /// Returns the associativity of the operator.
    pub fn associativity(self) -> Associativity {
        match self {
            Self::Exp => Associativity::Right,
            _ => Associativity::Left,
        }
    }

    /// Returns true if the operator is not written with a token.
    pub fn is_implicit(self) -> bool {
        matches!(self, Self::ImplicitMul)
    }

    /// Builds the expression `lhs op rhs`.
    ///
    /// Chains of the same associative operator build a single call, so `a + b + c` is
    /// `Plus[a, b, c]` rather than `Plus[Plus[a, b], c]`.
    pub fn build(self, lhs: Expr, rhs: Expr) -> Expr {
        match self {
            Self::Add => chain(&PLUS, lhs, rhs),
            Self::Sub => chain(&PLUS, lhs, Expr::apply(&TIMES, [Expr::from(-1), rhs])),
            Self::Mul | Self::ImplicitMul => chain(&TIMES, lhs, rhs),
            Self::Div => Expr::call("Divide", [lhs, rhs]),
            Self::Exp => Expr::apply(&POWER, [lhs, rhs]),
            Self::And => chain(&AND, lhs, rhs),
            Self::Or => chain(&OR, lhs, rhs),
        }
    }
}

/// Appends `rhs` to `lhs` if `lhs` is already a call to `head`, otherwise builds `head[lhs, rhs]`.
fn chain(head: &Symbol, lhs: Expr, rhs: Expr) -> Expr {
    if lhs.has_head(head) {
        let args = lhs.args().iter().cloned().chain([rhs]);
        Expr::apply(head, args)
    } else {
        Expr::apply(head, [lhs, rhs])
    }
}
