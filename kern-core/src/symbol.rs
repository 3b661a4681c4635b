//! Interned symbol names.

use once_cell::sync::Lazy;
use std::{
    cmp::Ordering,
    collections::HashSet,
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, Mutex},
};

/// Every symbol name ever created. Entries are never removed.
static INTERNER: Lazy<Mutex<HashSet<Arc<str>>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// A symbol, such as `x`, `Pi` or `Plus`.
///
/// Symbols are interned by name: creating two symbols with the same name yields two handles to
/// the same allocation, so equality is a pointer comparison. Ordering is by name.
#[derive(Clone)]
pub struct Symbol(Arc<str>);

impl Symbol {
    /// Returns the symbol with the given name, creating it if it does not exist yet.
    pub fn new(name: &str) -> Self {
        // the interner only ever grows, so a poisoned lock still holds a valid set
        let mut interner = INTERNER.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(existing) = interner.get(name) {
            return Self(Arc::clone(existing));
        }

        let name: Arc<str> = Arc::from(name);
        interner.insert(Arc::clone(&name));
        Self(name)
    }

    /// Returns the name of the symbol.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.0, &other.0) {
            Ordering::Equal
        } else {
            self.0.cmp(&other.0)
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({:?})", self.name())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interned() {
        let a = Symbol::new("Interned");
        let b = Symbol::new("Interned");
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert_eq!(a, b);
        assert_ne!(a, Symbol::new("interned"));
    }

    #[test]
    fn ordered_by_name() {
        let mut symbols = vec![Symbol::new("y"), Symbol::new("Pi"), Symbol::new("x")];
        symbols.sort();
        let names = symbols.iter().map(Symbol::name).collect::<Vec<_>>();
        assert_eq!(names, ["Pi", "x", "y"]);
    }
}
