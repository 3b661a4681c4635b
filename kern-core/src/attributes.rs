//! Attributes attached to symbols, which change how the normalizer treats calls to them.

use std::{fmt, ops::{BitOr, BitOrAssign}};

/// A single attribute of a function head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// The order of the arguments does not matter. Arguments are sorted into canonical order
    /// before any rule is tried, so `Plus[y, x]` and `Plus[x, y]` normalize identically.
    Orderless,

    /// The function is associative. Nested calls are spliced into their parent, so
    /// `Plus[a, Plus[b, c]]` becomes `Plus[a, b, c]`.
    Flat,

    /// A call with a single argument is equivalent to that argument, as in `Plus[x] = x`.
    ///
    /// The normalizer does not act on this attribute directly; it is implemented by built-in
    /// rules, and recorded here so that callers can query it.
    OneIdentity,

    /// The arguments of the call are not normalized before rules for the call are tried.
    HoldAll,

    /// The symbol is a mathematical constant, such as `Pi`. Queried by `ConstantQ`.
    Constant,
}

impl Attribute {
    /// All attributes, in declaration order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Orderless,
        Attribute::Flat,
        Attribute::OneIdentity,
        Attribute::HoldAll,
        Attribute::Constant,
    ];

    fn bit(self) -> u8 {
        match self {
            Self::Orderless => 1 << 0,
            Self::Flat => 1 << 1,
            Self::OneIdentity => 1 << 2,
            Self::HoldAll => 1 << 3,
            Self::Constant => 1 << 4,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A set of [`Attribute`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Attributes(u8);

impl Attributes {
    /// The empty set.
    pub const NONE: Attributes = Attributes(0);

    /// Returns true if the set contains the given attribute.
    pub fn contains(self, attribute: Attribute) -> bool {
        self.0 & attribute.bit() != 0
    }

    /// Adds the given attribute to the set.
    pub fn insert(&mut self, attribute: Attribute) {
        self.0 |= attribute.bit();
    }

    /// Returns true if the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns an iterator over the attributes in the set.
    pub fn iter(self) -> impl Iterator<Item = Attribute> {
        Attribute::ALL.into_iter().filter(move |attribute| self.contains(*attribute))
    }

    pub fn is_orderless(self) -> bool {
        self.contains(Attribute::Orderless)
    }

    pub fn is_flat(self) -> bool {
        self.contains(Attribute::Flat)
    }

    pub fn is_hold_all(self) -> bool {
        self.contains(Attribute::HoldAll)
    }
}

impl From<Attribute> for Attributes {
    fn from(attribute: Attribute) -> Self {
        Attributes(attribute.bit())
    }
}

impl<const N: usize> From<[Attribute; N]> for Attributes {
    fn from(attributes: [Attribute; N]) -> Self {
        attributes.into_iter().collect()
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut set = Attributes::NONE;
        for attribute in iter {
            set.insert(attribute);
        }
        set
    }
}

impl BitOr<Attribute> for Attributes {
    type Output = Attributes;

    fn bitor(mut self, rhs: Attribute) -> Self::Output {
        self.insert(rhs);
        self
    }
}

impl BitOr for Attribute {
    type Output = Attributes;

    fn bitor(self, rhs: Attribute) -> Self::Output {
        Attributes::from(self) | rhs
    }
}

impl BitOrAssign<Attribute> for Attributes {
    fn bitor_assign(&mut self, rhs: Attribute) {
        self.insert(rhs);
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut iter = self.iter();
        if let Some(attribute) = iter.next() {
            write!(f, "{}", attribute)?;
            for attribute in iter {
                write!(f, ", {}", attribute)?;
            }
        }
        write!(f, "}}")
    }
}
