//! Token/ID interning layer.
//!
//! Three tables live on [`crate::context::CompilerContext`]: identifiers,
//! integer literals and string literals. Each interns a text key to a stable
//! [`Symbol`] and remembers the order in which keys were first seen, which
//! the code generator later relies on for stable constant label numbering.

use std::collections::HashMap;
use std::fmt::{self, Display};
use std::rc::Rc;

/// An interned string. Two symbols compare equal iff their underlying text
/// does; equality and ordering are therefore lexicographic, not pointer-based.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol(Rc::from(value))
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Symbol(Rc::from(value.as_str()))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A single interner table. `add` is idempotent: interning the same text
/// twice returns the same symbol and does not disturb insertion order.
/// `index_of` numbers entries starting at 1, in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    order: Vec<String>,
    indices: HashMap<String, usize>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning a [`Symbol`] for it. Safe to call repeatedly
    /// with the same text.
    pub fn add(&mut self, text: impl Into<String>) -> Symbol {
        let text = text.into();
        if !self.indices.contains_key(&text) {
            self.indices.insert(text.clone(), self.order.len() + 1);
            self.order.push(text.clone());
        }
        Symbol::from(text)
    }

    /// 1-based insertion order of `text`, or `None` if it was never interned.
    pub fn index_of(&self, text: &str) -> Option<usize> {
        self.indices.get(text).copied()
    }

    /// Entries in the order they were first inserted.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
