//! The normalizer, which rewrites an expression with the rules of a [`RuleDatabase`] until no
//! rule applies.
//!
//! # Algorithm
//!
//! Expressions are normalized bottom-up. For every function application:
//!
//! 1. The head is normalized, then every argument (unless the head is `HoldAll`).
//! 2. If the head is `Flat`, arguments that are calls to the same head are spliced into the
//! argument list. If the head is `Orderless`, the arguments are sorted into canonical order.
//! 3. The candidate rules for the head are tried in order. The first rule that fires replaces the
//! node, and the replacement is normalized from step 1.
//! 4. If no rule fires, the node is in normal form, unless one of its arguments is
//! [`Expr::Indeterminate`], in which case the whole node becomes [`Expr::Indeterminate`].
//!
//! A rule whose result is identical to its input is treated as not having fired.
//!
//! # Termination
//!
//! A rule set may rewrite forever (for example, `x_ -> f[x]`). Every normalization counts the
//! rules that fire, across all threads, and stops once [`NormalizeConfig::max_rewrites`] firings
//! have happened or [`NormalizeConfig::time_limit`] has elapsed. The expression built so far is
//! returned, tagged with a [`Status`] explaining why normalization stopped.
//!
//! Normalizing a subterm recurses, and a rule that wraps its input (like the one above) makes
//! every firing one level deeper. The recursion depth is therefore bounded explicitly: past 1024
//! levels (128 when no thread pool could be built and the calling thread's stack is used),
//! normalization stops with [`Status::RewriteLimitExceeded`], the same as when the firing limit
//! is reached.
//!
//! # Parallelism
//!
//! The arguments of a call are independent, so calls with many arguments (see
//! [`NormalizeConfig::fan_out_threshold`]) have their arguments normalized in parallel on a
//! [`rayon`] thread pool. Results are collected positionally and sorted afterwards, so the result
//! does not depend on which task finishes first.

mod config;

pub use config::{NormalizeConfig, NormalizeConfigBuilder, DEFAULT_FAN_OUT_THRESHOLD, DEFAULT_MAX_REWRITES};

use crate::{expr::Expr, rule::RuleDatabase};
use once_cell::sync::Lazy;
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use std::{
    fmt,
    sync::{atomic::{AtomicU8, AtomicUsize, Ordering}, Arc},
    time::{Duration, Instant},
};

/// The stack size of the worker threads. Normalization recurses once per level of the expression
/// tree, and once more per level of nesting a rule introduces.
const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

/// The deepest recursion allowed on a worker thread. Each level costs a handful of frames, plus
/// the frames `rayon` adds when the level fans out.
const MAX_DEPTH: usize = 1024;

/// The deepest recursion allowed when normalizing on the calling thread, whose stack size is not
/// known.
const MAX_CALLER_DEPTH: usize = 128;

/// The thread pool shared by normalizers that do not ask for a specific number of workers.
static DEFAULT_POOL: Lazy<Option<Arc<ThreadPool>>> = Lazy::new(|| build_pool(0));

/// Builds a thread pool with the given number of threads, or [`None`] if the pool could not be
/// created.
fn build_pool(workers: usize) -> Option<Arc<ThreadPool>> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .stack_size(WORKER_STACK_SIZE)
        .thread_name(|index| format!("kern-normalize-{}", index))
        .build();

    match pool {
        Ok(pool) => Some(Arc::new(pool)),
        Err(err) => {
            tracing::warn!(target: "kern::rewrite", %err, "could not build thread pool; normalizing on the calling thread");
            None
        },
    }
}

/// Why a normalization finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The expression is in normal form: no rule applies to any part of it.
    Complete,

    /// Normalization stopped after the given number of rule firings, or because rules nested
    /// their results too deeply. The expression is equivalent to the input, but may not be in
    /// normal form.
    RewriteLimitExceeded { firings: usize },

    /// Normalization stopped after the time limit elapsed. The expression is equivalent to the
    /// input, but may not be in normal form.
    TimeLimitExceeded { elapsed: Duration },
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::RewriteLimitExceeded { firings } => {
                write!(f, "stopped after {} rewrites; the result may not be fully simplified", firings)
            },
            Self::TimeLimitExceeded { elapsed } => {
                write!(f, "stopped after {:?}; the result may not be fully simplified", elapsed)
            },
        }
    }
}

/// The result of normalizing an expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// The normalized expression.
    pub expr: Expr,

    /// Why normalization finished.
    pub status: Status,

    /// The number of rules that fired.
    pub firings: usize,
}

impl Normalized {
    /// Returns true if the expression reached normal form.
    pub fn is_complete(&self) -> bool {
        self.status == Status::Complete
    }
}

/// Rewrites expressions to normal form using the rules of a [`RuleDatabase`].
///
/// For more information about normalization, see the [module-level documentation](self).
pub struct Normalizer<'db> {
    db: &'db RuleDatabase,
    config: NormalizeConfig,
    pool: Option<Arc<ThreadPool>>,
}

impl<'db> Normalizer<'db> {
    /// Creates a normalizer with the default configuration.
    pub fn new(db: &'db RuleDatabase) -> Self {
        Self::with_config(db, NormalizeConfig::default())
    }

    /// Creates a normalizer with the given configuration.
    pub fn with_config(db: &'db RuleDatabase, config: NormalizeConfig) -> Self {
        let pool = if config.workers == 0 {
            DEFAULT_POOL.clone()
        } else {
            build_pool(config.workers)
        };
        Self { db, config, pool }
    }

    pub fn config(&self) -> &NormalizeConfig {
        &self.config
    }

    /// Normalizes the expression.
    pub fn normalize(&self, expr: &Expr) -> Normalized {
        tracing::debug!(target: "kern::rewrite", leaves = expr.leaf_count(), "normalizing");

        let max_depth = if self.pool.is_some() { MAX_DEPTH } else { MAX_CALLER_DEPTH };
        let run = Run::new(self.db, &self.config, max_depth);
        let result = match &self.pool {
            Some(pool) => pool.install(|| run.normalize(expr, 0)),
            None => run.normalize(expr, 0),
        };

        let firings = run.firings();
        let elapsed = run.started.elapsed();
        let status = match run.stop.load(Ordering::Relaxed) {
            REWRITE_LIMIT => Status::RewriteLimitExceeded { firings },
            TIME_LIMIT => Status::TimeLimitExceeded { elapsed },
            _ => Status::Complete,
        };

        match status {
            Status::Complete => {
                tracing::debug!(target: "kern::rewrite", firings, ?elapsed, "normalized");
            },
            _ => {
                tracing::warn!(target: "kern::rewrite", firings, ?elapsed, %status, "normalization stopped early");
            },
        }

        Normalized { expr: result, status, firings }
    }
}

impl fmt::Debug for Normalizer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Normalizer")
            .field("rules", &self.db.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Normalizes the expression with the given rules and the default configuration.
pub fn normalize(db: &RuleDatabase, expr: &Expr) -> Normalized {
    Normalizer::new(db).normalize(expr)
}

const RUNNING: u8 = 0;
const REWRITE_LIMIT: u8 = 1;
const TIME_LIMIT: u8 = 2;

/// The state of a single call to [`Normalizer::normalize`], shared by every task it spawns.
struct Run<'a> {
    db: &'a RuleDatabase,
    config: &'a NormalizeConfig,
    started: Instant,
    max_depth: usize,

    /// The number of rules that fired, or tried to fire after the limit was reached.
    firings: AtomicUsize,

    /// Set once to the reason normalization stopped. Every task checks it before doing any work.
    stop: AtomicU8,
}

impl<'a> Run<'a> {
    fn new(db: &'a RuleDatabase, config: &'a NormalizeConfig, max_depth: usize) -> Self {
        Self {
            db,
            config,
            started: Instant::now(),
            max_depth,
            firings: AtomicUsize::new(0),
            stop: AtomicU8::new(RUNNING),
        }
    }

    /// The number of rules that actually fired.
    fn firings(&self) -> usize {
        self.firings.load(Ordering::Relaxed).min(self.config.max_rewrites)
    }

    /// Records the reason for stopping, unless another task already did.
    fn halt(&self, reason: u8) {
        let _ = self.stop.compare_exchange(RUNNING, reason, Ordering::Relaxed, Ordering::Relaxed);
    }

    /// Returns true if normalization should stop.
    fn stopped(&self) -> bool {
        if self.stop.load(Ordering::Relaxed) != RUNNING {
            return true;
        }
        if let Some(limit) = self.config.time_limit {
            if self.started.elapsed() >= limit {
                self.halt(TIME_LIMIT);
                return true;
            }
        }
        false
    }

    /// Claims one rule firing. Returns false if the limit has been reached.
    fn charge(&self) -> bool {
        if self.firings.fetch_add(1, Ordering::Relaxed) >= self.config.max_rewrites {
            self.halt(REWRITE_LIMIT);
            false
        } else {
            true
        }
    }

    /// Normalizes an expression found `depth` levels below the root.
    fn normalize(&self, expr: &Expr, depth: usize) -> Expr {
        let mut current = expr.clone();
        loop {
            let function = match &current {
                Expr::Function(function) => Arc::clone(function),
                _ => return current,
            };
            if self.stopped() {
                return current;
            }
            if depth >= self.max_depth {
                tracing::warn!(target: "kern::rewrite", depth, "nesting limit reached");
                self.halt(REWRITE_LIMIT);
                return current;
            }

            let head = self.normalize(function.head(), depth + 1);
            let attributes = self.db.attributes_of(&head);
            let mut args = if attributes.is_hold_all() {
                function.args().to_vec()
            } else {
                self.normalize_args(function.args(), depth + 1)
            };
            if attributes.is_flat() {
                args = flatten(&head, args);
            }
            if attributes.is_orderless() {
                args.sort();
            }

            let node = current.with_args(head, args);

            match self.rewrite(&node) {
                Some(next) => current = next,
                None => {
                    let poisoned = !attributes.is_hold_all()
                        && node.args().iter().any(Expr::is_indeterminate);
                    return if poisoned { Expr::Indeterminate } else { node };
                },
            }
        }
    }

    /// Normalizes a list of arguments, in parallel if there are enough of them.
    fn normalize_args(&self, args: &[Expr], depth: usize) -> Vec<Expr> {
        if args.len() >= self.config.fan_out_threshold {
            args.par_iter().map(|arg| self.normalize(arg, depth)).collect()
        } else {
            args.iter().map(|arg| self.normalize(arg, depth)).collect()
        }
    }

    /// Applies the first rule that changes the node, if any.
    fn rewrite(&self, node: &Expr) -> Option<Expr> {
        let function = node.as_function()?;
        for rule in self.db.candidates(function.head()) {
            if self.stopped() {
                return None;
            }

            let Some(next) = rule.apply(node, self.db) else {
                continue;
            };
            if next == *node {
                continue;
            }
            if !self.charge() {
                return None;
            }

            tracing::trace!(target: "kern::rewrite", rule = rule.name(), priority = rule.priority(), "rule fired");
            return Some(next);
        }
        None
    }
}

/// Splices arguments that are calls to `head` into the argument list.
fn flatten(head: &Expr, args: Vec<Expr>) -> Vec<Expr> {
    let nested = |arg: &Expr| matches!(arg, Expr::Function(function) if *function.head() == *head);
    if !args.iter().any(nested) {
        return args;
    }

    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        match &arg {
            Expr::Function(function) if *function.head() == *head => {
                out.extend(function.args().iter().cloned());
            },
            _ => out.push(arg),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use crate::{
        attributes::Attribute,
        pattern::Pattern,
        rule::{Rule, Template},
        symbol::Symbol,
    };
    use super::*;

    fn sym(name: &str) -> Expr {
        Expr::symbol(name)
    }

    fn builtins() -> RuleDatabase {
        RuleDatabase::with_builtins().unwrap()
    }

    /// `x_ -> f[x]`, which fires on every call forever.
    fn self_expanding() -> RuleDatabase {
        let mut db = RuleDatabase::new();
        db.register(Rule::new(
            Pattern::blank("x"),
            Template::call("f", [Template::var("x")]),
        )).unwrap();
        db
    }

    #[test]
    fn atoms_are_normal() {
        let db = builtins();
        for atom in [Expr::from(3), sym("x"), Expr::real(0.5).unwrap(), Expr::Indeterminate] {
            let result = normalize(&db, &atom);
            assert_eq!(result.expr, atom);
            assert_eq!(result.status, Status::Complete);
            assert_eq!(result.firings, 0);
        }
    }

    #[test]
    fn flat_and_orderless() {
        let mut db = RuleDatabase::new();
        db.set_attributes(Symbol::new("f"), Attribute::Flat | Attribute::Orderless);
        let expr = Expr::call("f", [sym("c"), Expr::call("f", [sym("b"), Expr::from(1)]), sym("a")]);
        assert_eq!(normalize(&db, &expr).expr.to_string(), "f[1, a, b, c]");

        // `g` has no attributes, so its arguments are left alone
        let expr = Expr::call("g", [sym("b"), Expr::call("g", [sym("a")])]);
        assert_eq!(normalize(&db, &expr).expr.to_string(), "g[b, g[a]]");
    }

    #[test]
    fn hold_all_arguments_are_not_normalized() {
        let db = builtins();
        let expr = Expr::call("Hold", [Expr::call("Plus", [Expr::from(1), Expr::from(1)])]);
        assert_eq!(normalize(&db, &expr).expr, expr);
    }

    #[test]
    fn indeterminate_propagates() {
        let db = builtins();
        let expr = Expr::call("g", [sym("x"), Expr::call("h", [Expr::Indeterminate])]);
        assert_eq!(normalize(&db, &expr).expr, Expr::Indeterminate);

        let held = Expr::call("Hold", [Expr::Indeterminate]);
        assert_eq!(normalize(&db, &held).expr, held);
    }

    #[test]
    fn replacements_are_normalized() {
        let mut db = builtins();
        db.register(Rule::new(
            Pattern::call("Double", [Pattern::blank("x")]),
            Template::call("Plus", [Template::var("x"), Template::var("x")]),
        )).unwrap();

        let expr = Expr::call("Double", [Expr::call("Double", [Expr::from(3)])]);
        assert_eq!(normalize(&db, &expr).expr, Expr::from(12));

        let expr = Expr::call("Double", [sym("y")]);
        assert_eq!(normalize(&db, &expr).expr.to_string(), "Times[2, y]");
    }

    #[test]
    fn user_rules_override_builtins() {
        let mut db = builtins();
        db.register(Rule::new(
            Pattern::call("Plus", [Pattern::literal(2), Pattern::literal(2)]),
            Template::from(5),
        )).unwrap();

        let expr = Expr::call("Plus", [Expr::from(2), Expr::from(2)]);
        assert_eq!(normalize(&db, &expr).expr, Expr::from(5));
    }

    #[test]
    fn rules_match_orderless_arguments() {
        // `Cos[y]^2` sorts before `Sin[y]^2`, so the pattern only matches out of order
        let mut db = builtins();
        let square = |name: &str| {
            Pattern::call("Power", [Pattern::call(name, [Pattern::blank("x")]), Pattern::literal(2)])
        };
        db.register(Rule::new(
            Pattern::call("Plus", [square("Sin"), square("Cos")]),
            Template::from(1),
        )).unwrap();

        let square = |name: &str| Expr::call("Power", [Expr::call(name, [sym("y")]), Expr::from(2)]);
        let expr = Expr::call("Plus", [square("Sin"), square("Cos")]);
        assert_eq!(normalize(&db, &expr).expr, Expr::from(1));

        let mixed = Expr::call("Plus", [
            Expr::call("Power", [Expr::call("Sin", [sym("y")]), Expr::from(2)]),
            Expr::call("Power", [Expr::call("Cos", [sym("z")]), Expr::from(2)]),
        ]);
        assert_eq!(normalize(&db, &mixed).expr.to_string(), "Plus[Power[Cos[z], 2], Power[Sin[y], 2]]");
    }

    #[test]
    fn identity_rewrites_do_not_count() {
        let mut db = RuleDatabase::new();
        db.register(Rule::new(
            Pattern::call("f", [Pattern::blank("x")]),
            Template::call("f", [Template::var("x")]),
        )).unwrap();

        let result = normalize(&db, &Expr::call("f", [sym("y")]));
        assert_eq!(result.status, Status::Complete);
        assert_eq!(result.firings, 0);
    }

    #[test]
    fn rewrite_limit() {
        let db = self_expanding();
        let config = NormalizeConfigBuilder::new().max_rewrites(50).build();
        let result = Normalizer::with_config(&db, config).normalize(&Expr::call("g", [Expr::from(1)]));

        assert_eq!(result.status, Status::RewriteLimitExceeded { firings: 50 });
        assert_eq!(result.firings, 50);
        assert!(!result.is_complete());
        assert!(result.expr.has_head(&Symbol::new("f")));
    }

    #[test]
    fn time_limit() {
        let db = self_expanding();
        let config = NormalizeConfigBuilder::new()
            .max_rewrites(usize::MAX)
            .time_limit(Some(Duration::ZERO))
            .build();
        let expr = Expr::call("g", [Expr::from(1)]);
        let result = Normalizer::with_config(&db, config).normalize(&expr);

        assert!(matches!(result.status, Status::TimeLimitExceeded { .. }));
        assert_eq!(result.expr, expr);
    }

    #[test]
    fn runaway_rule_stops_at_deadline() {
        // `Flip[a] -> Flip[b] -> Flip[a] -> ...` never nests, so only the clock stops it
        let mut db = RuleDatabase::new();
        db.register_all([
            Rule::new(
                Pattern::call("Flip", [Pattern::symbol("a")]),
                Template::call("Flip", [Template::symbol("b")]),
            ),
            Rule::new(
                Pattern::call("Flip", [Pattern::symbol("b")]),
                Template::call("Flip", [Template::symbol("a")]),
            ),
        ]).unwrap();

        let limit = Duration::from_millis(50);
        let config = NormalizeConfigBuilder::new()
            .max_rewrites(usize::MAX)
            .time_limit(Some(limit))
            .build();
        let result = Normalizer::with_config(&db, config).normalize(&Expr::call("Flip", [sym("a")]));

        match result.status {
            Status::TimeLimitExceeded { elapsed } => assert!(elapsed >= limit),
            status => panic!("unexpected status: {}", status),
        }
        assert!(result.firings > 0);
        assert!(result.expr.has_head(&Symbol::new("Flip")));
    }

    #[test]
    fn self_nesting_stops_with_large_budget() {
        let db = self_expanding();
        let config = NormalizeConfigBuilder::new().max_rewrites(2_000_000).build();
        let result = Normalizer::with_config(&db, config).normalize(&Expr::call("g", [Expr::from(1)]));

        match result.status {
            Status::RewriteLimitExceeded { firings } => {
                assert!(firings < 2_000_000);
                assert_eq!(firings, result.firings);
            },
            status => panic!("unexpected status: {}", status),
        }
        assert!(result.expr.has_head(&Symbol::new("f")));
    }

    #[test]
    fn self_nesting_stops_without_rewrite_limit() {
        let db = self_expanding();
        let config = NormalizeConfigBuilder::new()
            .max_rewrites(usize::MAX)
            .time_limit(Some(Duration::from_secs(60)))
            .build();
        let result = Normalizer::with_config(&db, config).normalize(&Expr::call("g", [Expr::from(1)]));

        assert!(matches!(result.status, Status::RewriteLimitExceeded { .. }), "{}", result.status);
        assert!(result.firings >= MAX_CALLER_DEPTH);
    }

    #[test]
    fn limit_is_shared_across_threads() {
        let db = self_expanding();
        let config = NormalizeConfigBuilder::new()
            .max_rewrites(100)
            .fan_out_threshold(2)
            .workers(4)
            .build();
        let expr = Expr::call("g", (0..32).map(|n| Expr::call("h", [Expr::from(n)])));
        let result = Normalizer::with_config(&db, config).normalize(&expr);

        assert_eq!(result.status, Status::RewriteLimitExceeded { firings: 100 });
    }

    #[test]
    fn parallel_matches_sequential() {
        let db = builtins();
        let terms = (0..64).map(|n| {
            Expr::call("Times", [Expr::from(n % 5), sym(["x", "y", "z"][n as usize % 3])])
        });
        let expr = Expr::call("Plus", terms);

        let sequential = NormalizeConfigBuilder::new().fan_out_threshold(usize::MAX).build();
        let parallel = NormalizeConfigBuilder::new().fan_out_threshold(1).workers(4).build();
        let a = Normalizer::with_config(&db, sequential).normalize(&expr);
        let b = Normalizer::with_config(&db, parallel).normalize(&expr);

        assert_eq!(a.expr, b.expr);
        assert_eq!(a.expr.to_string(), "Plus[Times[41, y], Times[42, z], Times[43, x]]");
    }

    #[test]
    fn flatten_splices_one_level() {
        let plus = sym("Plus");
        let args = vec![
            sym("a"),
            Expr::call("Plus", [sym("b"), sym("c")]),
            Expr::call("Times", [sym("d")]),
        ];
        let flat = flatten(&plus, args)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        assert_eq!(flat, ["a", "b", "c", "Times[d]"]);
    }

    /// Expressions built from small integers, a few symbols, and the arithmetic and trigonometric
    /// heads.
    fn arb_expr() -> impl Strategy<Value = Expr> {
        let leaf = prop_oneof![
            (-4i32..=4).prop_map(Expr::from),
            Just(sym("x")),
            Just(sym("y")),
            Just(sym("Pi")),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(|args| Expr::call("Plus", args)),
                prop::collection::vec(inner.clone(), 0..4).prop_map(|args| Expr::call("Times", args)),
                (inner.clone(), -3i32..=3).prop_map(|(base, exp)| Expr::call("Power", [base, Expr::from(exp)])),
                inner.clone().prop_map(|arg| Expr::call("Sin", [arg])),
                (inner.clone(), inner).prop_map(|(a, b)| Expr::call("Subtract", [a, b])),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn idempotent(expr in arb_expr()) {
            let db = builtins();
            let once = normalize(&db, &expr);
            prop_assume!(once.is_complete());
            let twice = normalize(&db, &once.expr);
            prop_assert_eq!(twice.expr, once.expr);
            prop_assert_eq!(twice.firings, 0);
        }

        #[test]
        fn deterministic_across_fan_out(expr in arb_expr()) {
            let db = builtins();
            let sequential = NormalizeConfigBuilder::new().fan_out_threshold(usize::MAX).build();
            let parallel = NormalizeConfigBuilder::new().fan_out_threshold(1).build();
            let a = Normalizer::with_config(&db, sequential).normalize(&expr);
            let b = Normalizer::with_config(&db, parallel).normalize(&expr);
            prop_assume!(a.is_complete() && b.is_complete());
            prop_assert_eq!(a.expr, b.expr);
        }

        #[test]
        fn commutative_arguments_canonicalize(args in prop::collection::vec(arb_expr(), 1..5)) {
            let db = builtins();
            let mut reversed = args.clone();
            reversed.reverse();
            let a = normalize(&db, &Expr::call("Plus", args.clone()));
            let b = normalize(&db, &Expr::call("Plus", reversed.clone()));
            prop_assume!(a.is_complete() && b.is_complete());
            prop_assert_eq!(a.expr, b.expr);

            let a = normalize(&db, &Expr::call("Times", args));
            let b = normalize(&db, &Expr::call("Times", reversed));
            prop_assume!(a.is_complete() && b.is_complete());
            prop_assert_eq!(a.expr, b.expr);
        }
    }
}
