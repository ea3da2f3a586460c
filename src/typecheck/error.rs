use std::fmt::{self, Display};

use crate::coolast::{Symbol, Type};

/// The type-checking error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    UnboundIdentifier(Symbol),
    SubtypeViolation {
        found: Type,
        expected: Type,
        context: &'static str,
    },
    PredicateNotBool {
        found: Type,
        context: &'static str,
    },
    ArithOperandNotInt(Type),
    CompareOperandNotInt(Type),
    EqualityTypeMismatch(Type, Type),
    NotOperandNotBool(Type),
    /// `IsVoid` never fails to type-check; this variant is reserved for
    /// diagnostics tooling that wants to flag a provably-always-false
    /// `isvoid` on a non-nullable receiver, which this checker does not
    /// attempt to prove and therefore never constructs.
    IsVoidResult,
    DispatchArgMismatch {
        method: Symbol,
        index: usize,
        found: Type,
        expected: Type,
    },
    DispatchArgCount {
        method: Symbol,
        found: usize,
        expected: usize,
    },
    UnknownMethod {
        class: Type,
        method: Symbol,
    },
    StaticDispatchNotAncestor {
        receiver: Type,
        ancestor: Symbol,
    },
    OverrideMismatch {
        class: Symbol,
        ancestor: Symbol,
        method: Symbol,
    },
    AttributeRedefined(Symbol),
}

impl Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::UnboundIdentifier(name) => write!(f, "undeclared identifier {name}"),
            TypeError::SubtypeViolation {
                found,
                expected,
                context,
            } => write!(
                f,
                "{context}: {found} is not a subtype of the declared type {expected}"
            ),
            TypeError::PredicateNotBool { found, context } => {
                write!(f, "{context} predicate has type {found} instead of Bool")
            }
            TypeError::ArithOperandNotInt(ty) => {
                write!(f, "arithmetic operand has type {ty} instead of Int")
            }
            TypeError::CompareOperandNotInt(ty) => {
                write!(f, "comparison operand has type {ty} instead of Int")
            }
            TypeError::EqualityTypeMismatch(lhs, rhs) => write!(
                f,
                "illegal comparison of a primitive with a non-identical type ({lhs} vs {rhs})"
            ),
            TypeError::NotOperandNotBool(ty) => {
                write!(f, "operand of 'not' has type {ty} instead of Bool")
            }
            TypeError::IsVoidResult => write!(f, "isvoid result is unreachable"),
            TypeError::DispatchArgMismatch {
                method,
                index,
                found,
                expected,
            } => write!(
                f,
                "argument {index} to {method} has type {found}, expected {expected}"
            ),
            TypeError::DispatchArgCount {
                method,
                found,
                expected,
            } => write!(
                f,
                "method {method} called with {found} arguments, expected {expected}"
            ),
            TypeError::UnknownMethod { class, method } => {
                write!(f, "{class} has no method named {method}")
            }
            TypeError::StaticDispatchNotAncestor { receiver, ancestor } => write!(
                f,
                "{receiver} is not a subtype of the static dispatch class {ancestor}"
            ),
            TypeError::OverrideMismatch {
                class,
                ancestor,
                method,
            } => write!(
                f,
                "{class}.{method} does not match the signature of {ancestor}.{method}"
            ),
            TypeError::AttributeRedefined(name) => {
                write!(f, "attribute {name} is redefined in a subclass")
            }
        }
    }
}
