//! Parser for the input notation of the kern rewriting kernel.
//!
//! The notation is a small infix language over the kernel's [`Expr`] type:
//!
//! | Notation                 | Expression                       |
//! |--------------------------|----------------------------------|
//! | `f[a, b]`, `f[a][b]`     | calls, with any head             |
//! | `a + b`, `a - b`         | `Plus[a, b]`, `Plus[a, Times[-1, b]]` |
//! | `a * b`, `a b`, `a / b`  | `Times[a, b]`, `Times[a, b]`, `Divide[a, b]` |
//! | `a ^ b`                  | `Power[a, b]` (right associative) |
//! | `-a`                     | `Times[-1, a]`, or a negative number literal |
//! | `!a`, `a && b`, `a \|\| b` | `Not[a]`, `And[a, b]`, `Or[a, b]` |
//! | `Indeterminate`          | [`Expr::Indeterminate`]          |
//!
//! The full form printed by the kernel is itself valid input, so results can be pasted back in.
//!
//! ```
//! use kern_parser::parse;
//!
//! let expr = parse("2 x + Sin[Pi / 2]").unwrap();
//! assert_eq!(expr.to_string(), "Plus[Times[2, x], Sin[Divide[Pi, 2]]]");
//! ```

pub mod parser;
pub mod tokenizer;

use kern_core::Expr;
use kern_error::Error;
use parser::Parser;

/// Parses the source into a single expression.
pub fn parse(source: &str) -> Result<Expr, Error> {
    Parser::new(source).try_parse_full()
}

#[cfg(test)]
mod tests {
    use kern_core::{normalize, RuleDatabase};
    use pretty_assertions::assert_eq;
    use super::*;

    /// Parses and normalizes the source with the built-in rules.
    fn simplify(source: &str) -> String {
        let db = RuleDatabase::with_builtins().unwrap();
        normalize(&db, &parse(source).unwrap()).expr.to_string()
    }

    #[test]
    fn simplify_input() {
        assert_eq!(simplify("2 + 2"), "4");
        assert_eq!(simplify("Sin[2 Pi]"), "0");
        assert_eq!(simplify("1 x"), "x");
        assert_eq!(simplify("0 / 0"), "Indeterminate");
        assert_eq!(simplify("(x + 1)^2 - (1 + x)^2"), "0");
        assert_eq!(simplify("1 / 2 + 1 / 3"), "Rational[5, 6]");
        assert_eq!(simplify("p && !p"), "False");
    }

    #[test]
    fn results_read_back() {
        for source in ["x / 2", "Sqrt[2] / 2", "Log[2, y]", "-x^3 + 0.5"] {
            let db = RuleDatabase::with_builtins().unwrap();
            let once = normalize(&db, &parse(source).unwrap()).expr;
            let again = normalize(&db, &parse(&once.to_string()).unwrap()).expr;
            assert_eq!(again, once, "{}", source);
        }
    }
}
