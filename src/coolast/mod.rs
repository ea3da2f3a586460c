//! The Cool abstract syntax tree.
//!
//! A tagged tree of program / class / attribute / method / formal /
//! case-branch / expression variants. Every node carries the line number and
//! source filename it was parsed from; every expression additionally carries
//! a mutable type slot, written exactly once by the type checker
//! (`src/typecheck`) and read thereafter by the code generator
//! (`src/codegen`) and pretty printer (`src/pretty.rs`).

mod expr;
mod program;

pub use expr::*;
pub use program::*;

use std::rc::Rc;

pub use crate::interner::Symbol;

/// A source position: the file a node came from and its line number.
/// Filenames are `Rc<str>` so every node in a multi-file program can share
/// the same allocation for its origin file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: Rc<str>,
    pub line: usize,
}

impl Position {
    pub fn new(file: impl Into<Rc<str>>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// A type assigned to an expression by the type checker.
///
/// `SelfType` and `NoType` are kept distinct from ordinary class types:
/// `SelfType` denotes "the dynamic type of the enclosing class's self" and
/// is resolved against the enclosing class by the subtyping/`lub` rules in
/// `src/typecheck`; `NoType` is the sentinel type of `NoExpr`, the missing
/// initializer placeholder, and is a subtype of everything so missing
/// initializers never trip a subtype check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Class(Symbol),
    SelfType,
    NoType,
}

impl Type {
    pub fn class(name: impl Into<Symbol>) -> Self {
        Type::Class(name.into())
    }

    pub fn is_no_type(&self) -> bool {
        matches!(self, Type::NoType)
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Class(name) => write!(f, "{name}"),
            Type::SelfType => write!(f, "SELF_TYPE"),
            Type::NoType => write!(f, "_no_type"),
        }
    }
}
