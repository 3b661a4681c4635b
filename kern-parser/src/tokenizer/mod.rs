pub mod token;

use logos::{Lexer, Logos};
pub use token::{Token, TokenKind};

/// Returns an iterator over the token kinds produced by the tokenizer.
pub fn tokenize(input: &str) -> Lexer<TokenKind> {
    TokenKind::lexer(input)
}

/// Returns an owned array containing all of the tokens produced by the tokenizer. This allows the
/// parser to look ahead and backtrack freely.
pub fn tokenize_complete(input: &str) -> Box<[Token]> {
    let mut lexer = tokenize(input);
    let mut tokens = Vec::new();

    while let Some(Ok(kind)) = lexer.next() {
        tokens.push(Token {
            span: lexer.span(),
            kind,
            lexeme: lexer.slice(),
        });
    }

    tokens.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    /// Compares the tokens produced by the tokenizer to the raw expected tokens.
    fn compare_tokens<'source, const N: usize>(input: &'source str, expected: [(TokenKind, &'source str); N]) {
        let mut lexer = tokenize(input);

        for (expected_kind, expected_lexeme) in expected.into_iter() {
            assert_eq!(lexer.next(), Some(Ok(expected_kind)));
            assert_eq!(lexer.slice(), expected_lexeme);
        }

        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn basic_expr() {
        compare_tokens(
            "1 + 2",
            [
                (TokenKind::Int, "1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Add, "+"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Int, "2"),
            ],
        );
    }

    #[test]
    fn full_form() {
        compare_tokens(
            "Plus[x2, Times[-1, y]]",
            [
                (TokenKind::Name, "Plus"),
                (TokenKind::OpenBracket, "["),
                (TokenKind::Name, "x2"),
                (TokenKind::Comma, ","),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "Times"),
                (TokenKind::OpenBracket, "["),
                (TokenKind::Sub, "-"),
                (TokenKind::Int, "1"),
                (TokenKind::Comma, ","),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "y"),
                (TokenKind::CloseBracket, "]"),
                (TokenKind::CloseBracket, "]"),
            ],
        );
    }

    #[test]
    fn reals() {
        compare_tokens(
            "0.5 2. 1e-7 1.5E+300",
            [
                (TokenKind::Real, "0.5"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Real, "2."),
                (TokenKind::Whitespace, " "),
                (TokenKind::Real, "1e-7"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Real, "1.5E+300"),
            ],
        );
    }

    #[test]
    fn logic_and_stray_symbols() {
        compare_tokens(
            "!p && q || $",
            [
                (TokenKind::Not, "!"),
                (TokenKind::Name, "p"),
                (TokenKind::Whitespace, " "),
                (TokenKind::And, "&&"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Name, "q"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Or, "||"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Symbol, "$"),
            ],
        );
    }

    #[test]
    fn complete_keeps_spans() {
        let tokens = tokenize_complete("f[ab]");
        let spans = tokens.iter().map(|token| token.span.clone()).collect::<Vec<_>>();
        assert_eq!(spans, vec![0..1, 1..2, 2..4, 4..5]);
    }
}
