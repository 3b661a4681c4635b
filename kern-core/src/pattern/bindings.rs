use crate::{expr::Expr, symbol::Symbol};

/// The value bound to a pattern variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// A single expression, bound by a blank.
    One(Expr),

    /// A run of arguments, bound by a sequence blank.
    Sequence(Vec<Expr>),
}

/// The variables bound by a successful match, in the order they were bound.
///
/// Binding sets are small, so they are stored as a list rather than a map; lookups are linear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingSet {
    entries: Vec<(Symbol, Binding)>,
}

impl BindingSet {
    /// Creates an empty binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the binding of the given variable.
    pub fn get(&self, name: &Symbol) -> Option<&Binding> {
        self.entries
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, binding)| binding)
    }

    /// Returns the binding of the variable with the given name.
    pub fn get_by_name(&self, name: &str) -> Option<&Binding> {
        self.entries
            .iter()
            .find(|(bound, _)| bound.name() == name)
            .map(|(_, binding)| binding)
    }

    /// Returns the expression bound to the given single variable.
    pub fn one(&self, name: &str) -> Option<&Expr> {
        match self.get_by_name(name)? {
            Binding::One(expr) => Some(expr),
            Binding::Sequence(_) => None,
        }
    }

    /// Returns the run bound to the given sequence variable.
    pub fn sequence(&self, name: &str) -> Option<&[Expr]> {
        match self.get_by_name(name)? {
            Binding::Sequence(run) => Some(run),
            Binding::One(_) => None,
        }
    }

    /// Binds a variable. The variable must not already be bound.
    pub fn insert(&mut self, name: Symbol, binding: Binding) {
        debug_assert!(self.get(&name).is_none(), "`{}` is already bound", name);
        self.entries.push((name, binding));
    }

    /// The number of bound variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the bound variables in the order they were bound.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &Binding)> {
        self.entries.iter().map(|(name, binding)| (name, binding))
    }

    /// Removes every binding made after the set had `len` entries.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }
}
