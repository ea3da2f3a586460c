use std::fmt::{self, Display};

use crate::coolast::Symbol;

/// The semantic-analysis error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    BasicRedefined(Symbol),
    IllegalInheritance(Symbol, Symbol),
    DuplicateClass(Symbol),
    UnknownParent(Symbol, Symbol),
    MainMissing,
    InheritanceCycle(Symbol),
}

impl Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::BasicRedefined(name) => {
                write!(f, "redefinition of basic class {name} is not allowed")
            }
            SemanticError::IllegalInheritance(name, parent) => {
                write!(f, "class {name} cannot inherit from {parent}")
            }
            SemanticError::DuplicateClass(name) => {
                write!(f, "class {name} has multiple definitions")
            }
            SemanticError::UnknownParent(name, parent) => {
                write!(f, "class {name} inherits from undefined class {parent}")
            }
            SemanticError::MainMissing => write!(f, "class Main is not defined"),
            SemanticError::InheritanceCycle(name) => {
                write!(f, "cyclic inheritance detected involving class {name}")
            }
        }
    }
}
