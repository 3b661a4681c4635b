pub mod error;
pub mod op;

use kern_core::{
    consts::{NOT, RATIONAL, TIMES},
    primitive::{int_from_str, real_from_str},
    Expr,
    InvalidLiteral,
};
use kern_error::{Error, ErrorKind};
use std::ops::Range;
use crate::tokenizer::{tokenize_complete, Token, TokenKind};
use error::{ExpectedEof, UnclosedBracket, UnexpectedEof, UnexpectedToken};
use op::{Associativity, BinOp, Precedence};

/// The tokens that can begin an expression.
const EXPR_START: &[TokenKind] = &[
    TokenKind::Name,
    TokenKind::Int,
    TokenKind::Real,
    TokenKind::OpenParen,
    TokenKind::Sub,
    TokenKind::Not,
];

/// A parser that reads the kernel's input notation directly into an [`Expr`].
///
/// Operators are lowered into calls as they are parsed: `a - b` becomes
/// `Plus[a, Times[-1, b]]`, `a / b` becomes `Divide[a, b]`, and so on. Function calls are written
/// with square brackets, `f[a, b]`, so the [`Display`](std::fmt::Display) form of any expression
/// parses back into the same expression.
#[derive(Debug, Clone)]
pub struct Parser<'source> {
    tokens: Box<[Token<'source>]>,
    cursor: usize,
}

impl<'source> Parser<'source> {
    /// Create a new parser for the given source.
    pub fn new(source: &'source str) -> Self {
        Self {
            tokens: tokenize_complete(source),
            cursor: 0,
        }
    }

    /// Creates an error that points at the current token, or the end of the source code if the
    /// cursor is at the end of the stream.
    pub fn error(&self, kind: impl ErrorKind + 'static) -> Error {
        Error::new(vec![self.span()], kind)
    }

    /// Returns a span pointing at the end of the source code.
    pub fn eof_span(&self) -> Range<usize> {
        let end = self.tokens.last().map_or(0, |token| token.span.end);
        end..end
    }

    /// Returns the span of the current token, or the end of the source code if the cursor is at
    /// the end of the stream.
    pub fn span(&self) -> Range<usize> {
        self.tokens
            .get(self.cursor)
            .map_or_else(|| self.eof_span(), |token| token.span.clone())
    }

    /// Skips whitespace and returns the kind of the next token, without consuming it.
    fn peek_kind(&mut self) -> Option<TokenKind> {
        while self.tokens.get(self.cursor).map_or(false, Token::is_whitespace) {
            self.cursor += 1;
        }
        self.tokens.get(self.cursor).map(|token| token.kind)
    }

    /// Returns the next non-whitespace token, consuming it.
    fn next_token(&mut self) -> Result<Token<'source>, Error> {
        self.peek_kind();
        let token = self.tokens.get(self.cursor).cloned();
        match token {
            Some(token) => {
                self.cursor += 1;
                Ok(token)
            },
            None => Err(self.error(UnexpectedEof)),
        }
    }

    /// Parses a complete expression, and checks that the entire source code was consumed.
    pub fn try_parse_full(&mut self) -> Result<Expr, Error> {
        let expr = self.parse_expr(Precedence::Any)?;

        match self.peek_kind() {
            None => Ok(expr),
            Some(kind) => match closing_bracket(kind) {
                Some(bracket) => Err(self.error(UnclosedBracket { bracket, opening: false })),
                None => {
                    let span = self.span().start..self.eof_span().end;
                    Err(Error::new(vec![span], ExpectedEof))
                },
            },
        }
    }

    /// Parses an expression containing only operators that bind tighter than `min`.
    ///
    /// A right-associative operator also continues a chain of operators of precedence `min`.
    fn parse_expr(&mut self, min: Precedence) -> Result<Expr, Error> {
        let mut lhs = self.parse_prefix()?;

        while let Some(op) = self.peek_binary() {
            let precedence = op.precedence();
            let binds = precedence > min
                || (precedence == min && op.associativity() == Associativity::Right);
            if !binds {
                break;
            }

            if !op.is_implicit() {
                self.cursor += 1;
            }
            let rhs = self.parse_expr(precedence)?;
            lhs = op.build(lhs, rhs);
        }

        Ok(lhs)
    }

    /// Returns the binary operator at the cursor, if any.
    fn peek_binary(&mut self) -> Option<BinOp> {
        let kind = self.peek_kind()?;
        BinOp::from_token(kind).or_else(|| kind.starts_operand().then_some(BinOp::ImplicitMul))
    }

    /// Parses an operand, possibly preceded by the prefix operators `-` and `!`.
    fn parse_prefix(&mut self) -> Result<Expr, Error> {
        match self.peek_kind() {
            Some(TokenKind::Sub) => {
                self.cursor += 1;
                let operand = self.parse_expr(Precedence::Neg)?;
                Ok(negate(operand))
            },
            Some(TokenKind::Not) => {
                self.cursor += 1;
                let operand = self.parse_expr(Precedence::Not)?;
                Ok(Expr::apply(&NOT, [operand]))
            },
            _ => self.parse_calls(),
        }
    }

    /// Parses an atom or parenthesized expression, followed by any number of argument lists.
    fn parse_calls(&mut self) -> Result<Expr, Error> {
        self.peek_kind();
        let start = self.span().start;
        let mut expr = self.parse_primary()?;

        while self.peek_kind() == Some(TokenKind::OpenBracket) {
            let args = self.parse_args()?;
            let span = start..self.tokens[self.cursor - 1].span.end;
            expr = build_call(expr, args, span)?;
        }

        Ok(expr)
    }

    /// Parses a literal, a name, or a parenthesized expression.
    fn parse_primary(&mut self) -> Result<Expr, Error> {
        let token = self.next_token()?;
        let invalid = |err: InvalidLiteral| Error::new(vec![token.span.clone()], err);
        match token.kind {
            TokenKind::Int => int_from_str(token.lexeme).map(Expr::Integer).map_err(invalid),
            TokenKind::Real => real_from_str(token.lexeme).map(Expr::Real).map_err(invalid),
            TokenKind::Name if token.lexeme == "Indeterminate" => Ok(Expr::Indeterminate),
            TokenKind::Name => Ok(Expr::symbol(token.lexeme)),
            TokenKind::OpenParen => {
                let expr = self.parse_expr(Precedence::Any)?;
                self.expect_closing(&token, &[TokenKind::CloseParen])?;
                Ok(expr)
            },
            kind => {
                self.cursor -= 1;
                match closing_bracket(kind) {
                    Some(bracket) => Err(self.error(UnclosedBracket { bracket, opening: false })),
                    None => Err(self.error(UnexpectedToken { expected: EXPR_START, found: kind })),
                }
            },
        }
    }

    /// Parses a bracketed argument list, `[a, b, ...]`.
    fn parse_args(&mut self) -> Result<Vec<Expr>, Error> {
        let open = self.next_token()?;
        let mut args = Vec::new();

        if self.peek_kind() == Some(TokenKind::CloseBracket) {
            self.cursor += 1;
            return Ok(args);
        }

        loop {
            args.push(self.parse_expr(Precedence::Any)?);
            let kind = self.expect_closing(&open, &[TokenKind::Comma, TokenKind::CloseBracket])?;
            if kind == TokenKind::CloseBracket {
                return Ok(args);
            }
        }
    }

    /// Consumes one of the `expected` tokens, which include the bracket closing `open`.
    ///
    /// Running out of input reports the opening bracket as unclosed.
    fn expect_closing(
        &mut self,
        open: &Token<'source>,
        expected: &'static [TokenKind],
    ) -> Result<TokenKind, Error> {
        match self.peek_kind() {
            Some(kind) if expected.contains(&kind) => {
                self.cursor += 1;
                Ok(kind)
            },
            Some(kind) => Err(self.error(UnexpectedToken { expected, found: kind })),
            None => {
                let bracket = match open.kind {
                    TokenKind::OpenParen => '(',
                    _ => '[',
                };
                Err(Error::new(vec![open.span.clone()], UnclosedBracket { bracket, opening: true }))
            },
        }
    }
}

/// Returns the bracket character if the token is a closing bracket.
fn closing_bracket(kind: TokenKind) -> Option<char> {
    match kind {
        TokenKind::CloseParen => Some(')'),
        TokenKind::CloseBracket => Some(']'),
        _ => None,
    }
}

/// `-operand`, as a negative literal if the operand is a number.
fn negate(operand: Expr) -> Expr {
    match operand {
        Expr::Integer(n) => Expr::Integer(-n),
        Expr::Rational(r) => Expr::Rational(-r),
        Expr::Real(x) => Expr::from_real(-x),
        operand => Expr::apply(&TIMES, [Expr::from(-1), operand]),
    }
}

/// Builds the call `head[args..]`.
///
/// `Rational[n, d]` with integer literals is read as the exact number `n/d`, since that is how
/// rationals are displayed.
fn build_call(head: Expr, args: Vec<Expr>, span: Range<usize>) -> Result<Expr, Error> {
    if head.as_symbol() == Some(&*RATIONAL) {
        if let [Expr::Integer(numer), Expr::Integer(denom)] = args.as_slice() {
            return Expr::rational(numer.clone(), denom.clone())
                .map_err(|err| Error::new(vec![span], err));
        }
    }
    Ok(Expr::function(head, args))
}
