//! The backtracking matcher.
//!
//! Matching is written in continuation-passing style: every matching function receives the rest
//! of the work as a callback, and only reports success if the callback succeeds too. When the
//! callback fails, the function undoes its bindings and tries its next alternative (a shorter run
//! for a sequence blank, another argument for a pattern under an `Orderless` head), which is how
//! a failure late in a pattern backtracks into an earlier choice.

use std::borrow::Borrow;
use crate::{attributes::Attributes, expr::Expr};
use super::{Binding, BindingSet, Constraint, Pattern};

/// The rest of a match. Returns true if it succeeded.
type Continuation<'c> = dyn FnMut(&mut BindingSet) -> bool + 'c;

/// Looks up the attributes of a function head.
type AttributesOf<'a> = dyn Fn(&Expr) -> Attributes + 'a;

/// Matches `pattern` against `target`, extending the given bindings. Returns the bindings of the
/// first successful match, or [`None`] if the pattern does not match.
///
/// - A literal matches only a structurally equal expression.
/// - A blank matches any expression satisfying its constraint. If its variable is already bound,
/// the expression must also equal the existing binding.
/// - A function pattern matches a function application if the head patterns match, and the
/// argument patterns match the arguments positionally.
/// - A sequence blank in an argument list first claims the longest run of arguments it can, and
/// gives up arguments one at a time whenever the rest of the argument patterns fail to match. If
/// its variable is already bound, it matches only the same run again.
///
/// Every pattern is finite and every sequence blank is bounded by the length of the argument
/// list, so matching always terminates.
///
/// This function treats every head as having no attributes. Use [`match_with`] to match
/// arguments of `Orderless` and `Flat` heads the way rules do.
pub fn match_pattern(pattern: &Pattern, target: &Expr, bindings: BindingSet) -> Option<BindingSet> {
    match_with(pattern, target, bindings, |_| Attributes::NONE, |_| true)
}

/// Matches `pattern` against `target` like [`match_pattern`], taking the attributes of each
/// function head from `attributes`, and only succeeds with bindings that `accept` returns true
/// for.
///
/// The arguments of a head with attributes are matched differently:
///
/// - Under an `Orderless` head, every argument pattern that is not a sequence blank may match any
/// one argument, each argument being used at most once. The arguments left over are then matched
/// in order by the sequence blanks, so `Plus[Times[2, x_], x_]` matches `Plus[x, Times[2, x]]`.
/// - Under a `Flat` head, a blank may match a run of arguments, bound as a call to the same head,
/// so `f[a_, b_]` matches `f[p, q, r]` with `a` bound to `p` and `b` to `f[q, r]`. Single
/// arguments are tried before longer runs. If the head is also `Orderless` and the pattern has no
/// sequence blank, the last blank takes all the arguments the other patterns leave over.
///
/// When `accept` rejects a set of bindings, the matcher backtracks and offers the next way the
/// pattern can match, until `accept` succeeds or the alternatives run out.
pub fn match_with(
    pattern: &Pattern,
    target: &Expr,
    mut bindings: BindingSet,
    attributes: impl Fn(&Expr) -> Attributes,
    mut accept: impl FnMut(&BindingSet) -> bool,
) -> Option<BindingSet> {
    let mut next = |bindings: &mut BindingSet| accept(bindings);
    if match_one(pattern, target, &attributes, &mut bindings, &mut next) {
        Some(bindings)
    } else {
        None
    }
}

/// Returns true if the expression satisfies the optional constraint.
fn satisfies(constraint: &Option<Constraint>, expr: &Expr) -> bool {
    constraint.as_ref().map_or(true, |constraint| constraint.accepts(expr))
}

fn is_sequence(pattern: &Pattern) -> bool {
    matches!(pattern, Pattern::BlankSequence { .. })
}

/// Matches a single pattern against a single expression, then runs the continuation.
fn match_one(
    pattern: &Pattern,
    target: &Expr,
    attributes: &AttributesOf,
    bindings: &mut BindingSet,
    next: &mut Continuation,
) -> bool {
    match pattern {
        Pattern::Literal(expr) => expr == target && next(bindings),
        Pattern::Blank { name, constraint } => {
            if !satisfies(constraint, target) {
                return false;
            }

            let Some(name) = name else {
                return next(bindings);
            };

            match bindings.get(name) {
                Some(Binding::One(existing)) => existing == target && next(bindings),
                Some(Binding::Sequence(_)) => false,
                None => {
                    let mark = bindings.len();
                    bindings.insert(name.clone(), Binding::One(target.clone()));
                    if next(bindings) {
                        true
                    } else {
                        bindings.truncate(mark);
                        false
                    }
                },
            }
        },
        // a sequence outside an argument list has nothing to match against
        Pattern::BlankSequence { .. } => false,
        Pattern::Function { head, args } => {
            let Expr::Function(function) = target else {
                return false;
            };

            match_one(head, function.head(), attributes, bindings, &mut |bindings: &mut BindingSet| {
                let attrs = attributes(function.head());
                if attrs.is_orderless() {
                    let unordered = Unordered::new(args, function.head(), attrs.is_flat(), function.args());
                    let mut used = vec![false; function.args().len()];
                    unordered.match_singles(0, &mut used, attributes, bindings, next)
                } else {
                    let flat = attrs.is_flat().then(|| function.head());
                    match_args(args, function.args(), flat, attributes, bindings, next)
                }
            })
        },
    }
}

/// Matches a list of argument patterns against a list of arguments in order, then runs the
/// continuation.
///
/// If `flat` is the head of a `Flat` application, a blank may also match a run of two or more
/// arguments wrapped in that head.
fn match_args<P: Borrow<Pattern>>(
    patterns: &[P],
    args: &[Expr],
    flat: Option<&Expr>,
    attributes: &AttributesOf,
    bindings: &mut BindingSet,
    next: &mut Continuation,
) -> bool {
    let Some((first, rest)) = patterns.split_first() else {
        return args.is_empty() && next(bindings);
    };
    let first = Borrow::<Pattern>::borrow(first);

    // every single-element pattern that follows needs an argument of its own
    let required = rest
        .iter()
        .filter(|pattern| !is_sequence(Borrow::<Pattern>::borrow(*pattern)))
        .count();

    let Pattern::BlankSequence { name, constraint } = first else {
        let runs = match (flat, first) {
            (Some(_), Pattern::Blank { .. }) => args.len().saturating_sub(required),
            _ => args.len().min(1),
        };
        for len in 1..=runs {
            let run = match flat {
                Some(head) if len > 1 => Expr::function(head.clone(), args[..len].to_vec()),
                _ => args[0].clone(),
            };
            let matched = match_one(first, &run, attributes, bindings, &mut |bindings: &mut BindingSet| {
                match_args(rest, &args[len..], flat, attributes, bindings, next)
            });
            if matched {
                return true;
            }
        }
        return false;
    };

    // a previously bound sequence must match the same run again
    if let Some(name) = name {
        match bindings.get(name) {
            Some(Binding::Sequence(run)) => {
                let len = run.len();
                let same = args.get(..len) == Some(&run[..]);
                return same && match_args(rest, &args[len..], flat, attributes, bindings, next);
            },
            Some(Binding::One(_)) => return false,
            None => {},
        }
    }

    let Some(available) = args.len().checked_sub(required) else {
        return false;
    };
    let longest = args[..available]
        .iter()
        .take_while(|arg| satisfies(constraint, arg))
        .count();

    for len in (0..=longest).rev() {
        let mark = bindings.len();
        if let Some(name) = name {
            bindings.insert(name.clone(), Binding::Sequence(args[..len].to_vec()));
        }
        if match_args(rest, &args[len..], flat, attributes, bindings, next) {
            return true;
        }
        bindings.truncate(mark);
    }

    false
}

/// The argument patterns of an `Orderless` application, split by how they claim arguments.
struct Unordered<'a> {
    /// Patterns that each claim any one unused argument, in pattern order.
    singles: Vec<&'a Pattern>,

    /// Sequence blanks, which share the arguments left over by `singles` in order.
    sequences: Vec<&'a Pattern>,

    /// For a `Flat` head with no sequence blank, the last blank, which takes every argument the
    /// other patterns leave over.
    rest: Option<&'a Pattern>,

    head: &'a Expr,
    args: &'a [Expr],
}

impl<'a> Unordered<'a> {
    fn new(patterns: &'a [Pattern], head: &'a Expr, flat: bool, args: &'a [Expr]) -> Self {
        let (sequences, mut singles): (Vec<_>, Vec<_>) = patterns
            .iter()
            .partition(|pattern| is_sequence(pattern));
        let mut rest = None;
        if flat && sequences.is_empty() {
            if let Some(index) = singles.iter().rposition(|pattern| matches!(pattern, Pattern::Blank { .. })) {
                rest = Some(singles.remove(index));
            }
        }
        Self { singles, sequences, rest, head, args }
    }

    /// Assigns an unused argument to each single pattern from `index` on, then matches the
    /// leftovers.
    fn match_singles(
        &self,
        index: usize,
        used: &mut [bool],
        attributes: &AttributesOf,
        bindings: &mut BindingSet,
        next: &mut Continuation,
    ) -> bool {
        let Some(pattern) = self.singles.get(index) else {
            return self.match_leftovers(used, attributes, bindings, next);
        };
        let unclaimed = self.singles.len() - index + usize::from(self.rest.is_some());
        if used.iter().filter(|used| !**used).count() < unclaimed {
            return false;
        }

        for (position, arg) in self.args.iter().enumerate() {
            if used[position] {
                continue;
            }
            used[position] = true;
            let matched = match_one(pattern, arg, attributes, bindings, &mut |bindings: &mut BindingSet| {
                self.match_singles(index + 1, &mut *used, attributes, bindings, next)
            });
            used[position] = false;
            if matched {
                return true;
            }
        }
        false
    }

    fn match_leftovers(
        &self,
        used: &[bool],
        attributes: &AttributesOf,
        bindings: &mut BindingSet,
        next: &mut Continuation,
    ) -> bool {
        let mut leftovers = self.args
            .iter()
            .zip(used)
            .filter(|(_, used)| !**used)
            .map(|(arg, _)| arg.clone())
            .collect::<Vec<_>>();

        let Some(pattern) = self.rest else {
            return match_args(&self.sequences, &leftovers, None, attributes, bindings, next);
        };
        let target = match leftovers.len() {
            0 => return false,
            1 => leftovers.remove(0),
            _ => Expr::function(self.head.clone(), leftovers),
        };
        match_one(pattern, &target, attributes, bindings, next)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use crate::{attributes::Attribute, symbol::Symbol};
    use super::*;

    fn sym(name: &str) -> Expr {
        Expr::symbol(name)
    }

    /// Renders the bindings as `name -> value` strings, with sequences in braces.
    fn render(bindings: &BindingSet) -> Vec<String> {
        bindings
            .iter()
            .map(|(name, binding)| match binding {
                Binding::One(expr) => format!("{} -> {}", name, expr),
                Binding::Sequence(run) => {
                    let run = run.iter().map(ToString::to_string).collect::<Vec<_>>();
                    format!("{} -> {{{}}}", name, run.join(", "))
                },
            })
            .collect()
    }

    fn matches(pattern: &Pattern, target: &Expr) -> Option<Vec<String>> {
        match_pattern(pattern, target, BindingSet::new()).map(|bindings| render(&bindings))
    }

    /// `Plus` is `Flat` and `Orderless`, `g` is `Orderless` and `f` is `Flat`.
    fn attributes_of(head: &Expr) -> Attributes {
        match head.as_symbol().map(Symbol::name) {
            Some("Plus") => Attribute::Flat | Attribute::Orderless,
            Some("g") => Attribute::Orderless.into(),
            Some("f") => Attribute::Flat.into(),
            _ => Attributes::NONE,
        }
    }

    fn matches_with_attributes(pattern: &Pattern, target: &Expr) -> Option<Vec<String>> {
        match_with(pattern, target, BindingSet::new(), attributes_of, |_| true)
            .map(|bindings| render(&bindings))
    }

    #[test]
    fn literal() {
        let pattern = Pattern::literal(2);
        assert_eq!(matches(&pattern, &Expr::from(2)), Some(vec![]));
        assert_eq!(matches(&pattern, &Expr::real(2.0).unwrap()), None);
    }

    #[test]
    fn blank_binds() {
        let pattern = Pattern::call("Sin", [Pattern::blank("x")]);
        let target = Expr::call("Sin", [Expr::call("Times", [Expr::from(2), sym("Pi")])]);
        assert_eq!(matches(&pattern, &target), Some(vec!["x -> Times[2, Pi]".to_string()]));
        assert_eq!(matches(&pattern, &Expr::call("Cos", [sym("x")])), None);
        assert_eq!(matches(&pattern, &Expr::call("Sin", [sym("x"), sym("y")])), None);
    }

    #[test]
    fn repeated_variable() {
        let pattern = Pattern::call("Plus", [Pattern::blank("a"), Pattern::blank("a")]);
        assert!(matches(&pattern, &Expr::call("Plus", [sym("x"), sym("x")])).is_some());
        assert_eq!(matches(&pattern, &Expr::call("Plus", [sym("x"), sym("y")])), None);
    }

    #[test]
    fn head_constraint() {
        let pattern = Pattern::call("f", [Pattern::blank_head("n", "Integer")]);
        assert!(matches(&pattern, &Expr::call("f", [Expr::from(3)])).is_some());
        assert_eq!(matches(&pattern, &Expr::call("f", [Expr::real(3.0).unwrap()])), None);
        assert_eq!(matches(&pattern, &Expr::call("f", [sym("x")])), None);

        let calls = Pattern::call("f", [Pattern::blank_head("g", "Sin")]);
        assert!(matches(&calls, &Expr::call("f", [Expr::call("Sin", [sym("x")])])).is_some());
    }

    #[test]
    fn test_constraint() {
        let pattern = Pattern::call("f", [Pattern::blank_test("n", Expr::is_number)]);
        assert!(matches(&pattern, &Expr::call("f", [Expr::real(0.5).unwrap()])).is_some());
        assert_eq!(matches(&pattern, &Expr::call("f", [sym("x")])), None);
    }

    #[test]
    fn sequence_is_greedy() {
        let pattern = Pattern::call("f", [Pattern::sequence("xs"), Pattern::sequence("ys")]);
        let target = Expr::call("f", [Expr::from(1), Expr::from(2)]);
        assert_eq!(matches(&pattern, &target), Some(vec![
            "xs -> {1, 2}".to_string(),
            "ys -> {}".to_string(),
        ]));
    }

    #[test]
    fn sequence_matches_empty_run() {
        let pattern = Pattern::call("Plus", [Pattern::literal(0), Pattern::sequence("xs")]);
        assert_eq!(matches(&pattern, &Expr::call("Plus", [Expr::from(0)])), Some(vec![
            "xs -> {}".to_string(),
        ]));
    }

    #[test]
    fn sequence_backtracks() {
        // Plus[pre__, a_, a_, post__] finds the duplicated pair in the middle
        let pattern = Pattern::call("Plus", [
            Pattern::sequence("pre"),
            Pattern::blank("a"),
            Pattern::blank("a"),
            Pattern::sequence("post"),
        ]);
        let target = Expr::call("Plus", [sym("w"), sym("x"), sym("x"), sym("y"), sym("z")]);
        assert_eq!(matches(&pattern, &target), Some(vec![
            "pre -> {w}".to_string(),
            "a -> x".to_string(),
            "post -> {y, z}".to_string(),
        ]));
    }

    #[test]
    fn bound_sequence_must_repeat() {
        let pattern = Pattern::call("f", [
            Pattern::sequence("xs"),
            Pattern::literal(0),
            Pattern::sequence("xs"),
        ]);
        let yes = Expr::call("f", [sym("a"), sym("b"), Expr::from(0), sym("a"), sym("b")]);
        let no = Expr::call("f", [sym("a"), sym("b"), Expr::from(0), sym("a")]);
        assert_eq!(matches(&pattern, &yes), Some(vec!["xs -> {a, b}".to_string()]));
        assert_eq!(matches(&pattern, &no), None);
    }

    #[test]
    fn sequence_constraint_limits_run() {
        let pattern = Pattern::call("f", [
            Pattern::sequence_test("ns", Expr::is_number),
            Pattern::sequence("rest"),
        ]);
        let target = Expr::call("f", [Expr::from(1), Expr::from(2), sym("x"), Expr::from(3)]);
        assert_eq!(matches(&pattern, &target), Some(vec![
            "ns -> {1, 2}".to_string(),
            "rest -> {x, 3}".to_string(),
        ]));
    }

    #[test]
    fn sequence_outside_arguments_never_matches() {
        assert_eq!(matches(&Pattern::sequence("xs"), &sym("x")), None);
    }

    #[test]
    fn existing_bindings_are_respected() {
        let mut bindings = BindingSet::new();
        bindings.insert(Symbol::new("x"), Binding::One(sym("y")));
        let pattern = Pattern::call("f", [Pattern::blank("x")]);
        assert!(match_pattern(&pattern, &Expr::call("f", [sym("y")]), bindings.clone()).is_some());
        assert!(match_pattern(&pattern, &Expr::call("f", [sym("z")]), bindings).is_none());
    }

    #[test]
    fn guard_drives_backtracking() {
        // the first split is rejected, so the matcher offers the next one
        let pattern = Pattern::call("f", [Pattern::sequence("xs"), Pattern::sequence("ys")]);
        let target = Expr::call("f", [Expr::from(1), Expr::from(2), Expr::from(3)]);
        let bindings = match_with(&pattern, &target, BindingSet::new(), |_| Attributes::NONE, |bindings| {
            bindings.sequence("xs").map_or(false, |xs| xs.len() == 1)
        })
        .unwrap();
        assert_eq!(render(&bindings), [
            "xs -> {1}".to_string(),
            "ys -> {2, 3}".to_string(),
        ]);
    }

    #[test]
    fn failed_match_leaves_no_bindings() {
        let pattern = Pattern::call("f", [Pattern::blank("a"), Pattern::literal(1)]);
        let target = Expr::call("f", [sym("x"), Expr::from(2)]);
        assert_eq!(match_with(&pattern, &target, BindingSet::new(), attributes_of, |_| true), None);
    }

    #[test]
    fn orderless_arguments_match_in_any_order() {
        // canonical order puts the symbol before the product
        let pattern = Pattern::call("Plus", [
            Pattern::call("Times", [Pattern::literal(2), Pattern::blank("x")]),
            Pattern::blank("x"),
        ]);
        let target = Expr::call("Plus", [sym("x"), Expr::call("Times", [Expr::from(2), sym("x")])]);
        assert_eq!(matches(&pattern, &target), None);
        assert_eq!(matches_with_attributes(&pattern, &target), Some(vec!["x -> x".to_string()]));

        let other = Expr::call("Plus", [sym("y"), Expr::call("Times", [Expr::from(2), sym("x")])]);
        assert_eq!(matches_with_attributes(&pattern, &other), None);
    }

    #[test]
    fn orderless_sequences_take_leftovers_in_order() {
        let pattern = Pattern::call("g", [Pattern::literal(0), Pattern::sequence("xs")]);
        let target = Expr::call("g", [sym("a"), Expr::from(0), sym("b")]);
        assert_eq!(matches_with_attributes(&pattern, &target), Some(vec!["xs -> {a, b}".to_string()]));

        // every argument is claimed at most once
        let pair = Pattern::call("g", [Pattern::blank("a"), Pattern::blank("a")]);
        assert_eq!(matches_with_attributes(&pair, &Expr::call("g", [sym("x")])), None);
        assert_eq!(matches_with_attributes(&pair, &Expr::call("g", [sym("x"), sym("y")])), None);
    }

    #[test]
    fn orderless_constraints_pick_matching_argument() {
        let pattern = Pattern::call("g", [Pattern::blank_head("n", "Integer"), Pattern::blank("rest")]);
        let target = Expr::call("g", [sym("x"), Expr::from(3)]);
        assert_eq!(matches_with_attributes(&pattern, &target), Some(vec![
            "n -> 3".to_string(),
            "rest -> x".to_string(),
        ]));
    }

    #[test]
    fn flat_blank_absorbs_run() {
        let target = Expr::call("Plus", [sym("p"), sym("q"), sym("r")]);
        let pattern = Pattern::call("Plus", [Pattern::blank("a"), Pattern::blank("b")]);
        assert_eq!(matches(&pattern, &target), None);
        assert_eq!(matches_with_attributes(&pattern, &target), Some(vec![
            "a -> p".to_string(),
            "b -> Plus[q, r]".to_string(),
        ]));

        // without `Orderless`, runs are contiguous and single arguments are tried first
        let target = Expr::call("f", [sym("p"), sym("q"), sym("r")]);
        let pattern = Pattern::call("f", [Pattern::blank("a"), Pattern::blank("b")]);
        assert_eq!(matches_with_attributes(&pattern, &target), Some(vec![
            "a -> p".to_string(),
            "b -> f[q, r]".to_string(),
        ]));
    }

    #[test]
    fn flat_runs_respect_constraints() {
        // `f[q, r]` is not a symbol, so `a` has to take the longer run
        let pattern = Pattern::call("f", [Pattern::blank("a"), Pattern::blank_head("b", "Symbol")]);
        let target = Expr::call("f", [sym("p"), sym("q"), sym("r")]);
        assert_eq!(matches_with_attributes(&pattern, &target), Some(vec![
            "a -> f[p, q]".to_string(),
            "b -> r".to_string(),
        ]));
    }

    #[test]
    fn guard_backtracks_through_orderings() {
        let pattern = Pattern::call("g", [Pattern::blank("a"), Pattern::blank("b")]);
        let target = Expr::call("g", [sym("x"), sym("y")]);
        let bindings = match_with(&pattern, &target, BindingSet::new(), attributes_of, |bindings| {
            bindings.one("a") == Some(&sym("y"))
        })
        .unwrap();
        assert_eq!(render(&bindings), ["a -> y".to_string(), "b -> x".to_string()]);
    }
}
