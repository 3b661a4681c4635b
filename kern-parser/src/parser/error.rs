use ariadne::Fmt;
use kern_attrs::ErrorKind;
use kern_error::{ErrorKind, EXPR};
use crate::tokenizer::TokenKind;

/// The end of the source code was reached unexpectedly.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected end of input",
    labels = [format!("you might need to add another {} here", "expression".fg(EXPR))],
)]
pub struct UnexpectedEof;

/// The end of the source code was expected, but something else was found.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "expected end of input",
    labels = [format!("I could not understand the remaining {} here", "expression".fg(EXPR))],
)]
pub struct ExpectedEof;

/// An unexpected token was encountered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unexpected token",
    labels = [format!("expected one of: {}", expected.iter().map(|t| format!("{:?}", t)).collect::<Vec<_>>().join(", "))],
    help = format!("found {:?}", found),
)]
pub struct UnexpectedToken {
    /// The token(s) that were expected.
    pub expected: &'static [TokenKind],

    /// The token that was found.
    pub found: TokenKind,
}

/// A parenthesis or bracket was opened but never closed, or closed without being opened.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = "unclosed bracket",
    labels = ["this bracket"],
    help = if *opening {
        format!("add a closing `{}` after the {}", closing_of(*bracket), "expression".fg(EXPR))
    } else {
        format!("remove this `{}`, or add an opening `{}` before it", bracket, opening_of(*bracket))
    },
)]
pub struct UnclosedBracket {
    /// The bracket character at the reported span.
    pub bracket: char,

    /// Whether the reported bracket is an opening bracket.
    pub opening: bool,
}

fn closing_of(bracket: char) -> char {
    match bracket {
        '(' => ')',
        _ => ']',
    }
}

fn opening_of(bracket: char) -> char {
    match bracket {
        ')' => '(',
        _ => '[',
    }
}
