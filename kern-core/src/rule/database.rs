use crate::{
    attributes::{Attribute, Attributes},
    builtins,
    error::MalformedRule,
    expr::Expr,
    symbol::Symbol,
};
use std::{cmp::Reverse, collections::HashMap, iter::FusedIterator};
use super::Rule;

/// The bucket a rule is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKey {
    /// Rules whose pattern only matches calls with this head.
    Head(Expr),

    /// Rules whose pattern may match calls with any head.
    Any,
}

/// A registered rule, along with its registration sequence number.
#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    rule: Rule,
}

impl Entry {
    /// The key entries are ordered by: descending priority, then ascending registration order.
    fn order(&self) -> (Reverse<i32>, u64) {
        (Reverse(self.rule.priority()), self.seq)
    }
}

/// The set of rules known to the kernel, along with the [`Attributes`] of symbols.
///
/// Rules are bucketed by the head of the expressions they can match, so looking up the rules for
/// a call only considers rules for its head, plus the rules that can match any head. Within the
/// candidates, rules are tried in descending priority order; rules with equal priority are tried
/// in registration order.
///
/// Registration requires `&mut self`, while normalization only borrows the database, so a
/// database cannot change while an expression is being normalized with it.
#[derive(Debug, Clone, Default)]
pub struct RuleDatabase {
    by_head: HashMap<Expr, Vec<Entry>>,
    any: Vec<Entry>,
    attributes: HashMap<Symbol, Attributes>,
    next_seq: u64,
}

impl RuleDatabase {
    /// Creates an empty database, with no rules and no attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a database containing the built-in rules and attributes.
    pub fn with_builtins() -> Result<Self, MalformedRule> {
        let mut db = Self::new();
        builtins::register(&mut db)?;
        Ok(db)
    }

    /// Registers a rule, after checking that it is well-formed.
    pub fn register(&mut self, rule: Rule) -> Result<(), MalformedRule> {
        rule.validate()?;
        tracing::debug!(target: "kern::rules", rule = %rule.name(), priority = rule.priority(), "registered rule");

        let entry = Entry { seq: self.next_seq, rule };
        self.next_seq += 1;

        let bucket = match entry.rule.key() {
            RuleKey::Head(head) => self.by_head.entry(head).or_default(),
            RuleKey::Any => &mut self.any,
        };
        // the new entry has the highest sequence number, so it goes after every entry of equal
        // or higher priority
        let index = bucket.partition_point(|existing| existing.order() < entry.order());
        bucket.insert(index, entry);
        Ok(())
    }

    /// Registers every rule in order, stopping at the first malformed one.
    pub fn register_all(&mut self, rules: impl IntoIterator<Item = Rule>) -> Result<(), MalformedRule> {
        for rule in rules {
            self.register(rule)?;
        }
        Ok(())
    }

    /// Returns the candidate rules for the given expression, in the order they should be tried.
    /// Atoms have no candidates.
    pub fn lookup(&self, expr: &Expr) -> Vec<&Rule> {
        match expr {
            Expr::Function(function) => self.candidates(function.head()).collect(),
            _ => Vec::new(),
        }
    }

    /// Returns an iterator over the candidate rules for calls with the given head, in the order
    /// they should be tried.
    pub fn candidates(&self, head: &Expr) -> Candidates<'_> {
        let by_head = self.by_head.get(head).map(Vec::as_slice).unwrap_or(&[]);
        Candidates { by_head, any: &self.any }
    }

    /// Returns every registered rule, in registration order.
    pub fn rules(&self) -> Vec<&Rule> {
        let mut entries = self.by_head.values().flatten().chain(&self.any).collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| &entry.rule).collect()
    }

    /// The number of registered rules.
    pub fn len(&self) -> usize {
        self.by_head.values().map(Vec::len).sum::<usize>() + self.any.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replaces the attributes of the given symbol.
    pub fn set_attributes(&mut self, symbol: Symbol, attributes: impl Into<Attributes>) {
        let attributes = attributes.into();
        if attributes.is_empty() {
            self.attributes.remove(&symbol);
        } else {
            self.attributes.insert(symbol, attributes);
        }
    }

    /// Adds an attribute to the given symbol, keeping the ones it already has.
    pub fn add_attribute(&mut self, symbol: Symbol, attribute: Attribute) {
        *self.attributes.entry(symbol).or_default() |= attribute;
    }

    /// Returns the attributes of the given symbol.
    pub fn attributes(&self, symbol: &Symbol) -> Attributes {
        self.attributes.get(symbol).copied().unwrap_or_default()
    }

    /// Returns the attributes of a head expression. Only symbols have attributes.
    pub fn attributes_of(&self, head: &Expr) -> Attributes {
        head.as_symbol().map(|symbol| self.attributes(symbol)).unwrap_or_default()
    }
}

/// The candidate rules for a call, produced by [`RuleDatabase::candidates`].
///
/// This merges the bucket for the call's head with the bucket of rules for any head, preserving
/// the priority and registration order across both.
#[derive(Debug, Clone)]
pub struct Candidates<'a> {
    by_head: &'a [Entry],
    any: &'a [Entry],
}

impl<'a> Iterator for Candidates<'a> {
    type Item = &'a Rule;

    fn next(&mut self) -> Option<Self::Item> {
        let take_head = match (self.by_head.first(), self.any.first()) {
            (Some(head), Some(any)) => head.order() < any.order(),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return None,
        };

        let source = if take_head { &mut self.by_head } else { &mut self.any };
        let entries: &'a [Entry] = *source;
        let (entry, rest) = entries.split_first()?;
        *source = rest;
        Some(&entry.rule)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.by_head.len() + self.any.len();
        (len, Some(len))
    }
}

impl ExactSizeIterator for Candidates<'_> {}

impl FusedIterator for Candidates<'_> {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use crate::{pattern::Pattern, rule::Template};
    use super::*;

    fn rule(name: &str, head: Option<&str>, priority: i32) -> Rule {
        let pattern = match head {
            Some(head) => Pattern::call(head, [Pattern::blank("x")]),
            None => Pattern::blank("x"),
        };
        Rule::new(pattern, Template::var("x"))
            .with_priority(priority)
            .with_name(name)
    }

    fn names(rules: &[&Rule]) -> Vec<String> {
        rules.iter().map(|rule| rule.name().to_string()).collect()
    }

    #[test]
    fn lookup_orders_by_priority_then_registration() {
        let mut db = RuleDatabase::new();
        db.register_all([
            rule("f-low", Some("f"), -1),
            rule("any-mid", None, 0),
            rule("f-mid-1", Some("f"), 0),
            rule("g", Some("g"), 10),
            rule("f-high", Some("f"), 5),
            rule("f-mid-2", Some("f"), 0),
            rule("any-high", None, 5),
        ]).unwrap();

        let expr = Expr::call("f", [Expr::from(1)]);
        assert_eq!(names(&db.lookup(&expr)), [
            "f-high",
            "any-high",
            "any-mid",
            "f-mid-1",
            "f-mid-2",
            "f-low",
        ]);

        let other = Expr::call("h", []);
        assert_eq!(names(&db.lookup(&other)), ["any-high", "any-mid"]);
        assert!(db.lookup(&Expr::symbol("f")).is_empty());
        assert_eq!(db.len(), 7);
        assert_eq!(db.candidates(&Expr::symbol("f")).len(), 6);
    }

    #[test]
    fn rules_in_registration_order() {
        let mut db = RuleDatabase::new();
        db.register(rule("b", Some("g"), 0)).unwrap();
        db.register(rule("a", None, 3)).unwrap();
        db.register(rule("c", Some("f"), 9)).unwrap();
        assert_eq!(names(&db.rules()), ["b", "a", "c"]);
    }

    #[test]
    fn malformed_rules_are_rejected() {
        let mut db = RuleDatabase::new();
        let bad = Rule::new(Pattern::call("f", [Pattern::blank("x")]), Template::var("y"));
        assert!(db.register(bad).is_err());
        assert!(db.is_empty());
    }

    #[test]
    fn attributes() {
        let mut db = RuleDatabase::new();
        let plus = Symbol::new("Plus");
        db.set_attributes(plus.clone(), Attribute::Flat | Attribute::Orderless);
        db.add_attribute(plus.clone(), Attribute::OneIdentity);

        let attributes = db.attributes(&plus);
        assert!(attributes.is_flat());
        assert!(attributes.is_orderless());
        assert!(attributes.contains(Attribute::OneIdentity));
        assert!(db.attributes_of(&Expr::symbol("Times")).is_empty());
        assert!(db.attributes_of(&Expr::call("Plus", [])).is_empty());

        db.set_attributes(plus.clone(), Attributes::NONE);
        assert!(db.attributes(&plus).is_empty());
    }
}
