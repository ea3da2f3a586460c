use std::cell::RefCell;

use super::{CaseBranch, Position, Symbol, Type};

/// An expression node. Carries its source position and a type slot that
/// starts empty and is written exactly once by the type checker.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: Box<ExprKind>,
    pub position: Position,
    type_id: RefCell<Option<Type>>,
}

impl Expr {
    pub fn new(kind: ExprKind, position: Position) -> Self {
        Self {
            kind: Box::new(kind),
            position,
            type_id: RefCell::new(None),
        }
    }

    /// The type assigned by the checker, if any.
    pub fn get_type(&self) -> Option<Type> {
        self.type_id.borrow().clone()
    }

    /// Assign this expression's type. Called exactly once per node by the
    /// type checker; calling it twice is a checker bug, not a recoverable
    /// condition, so it panics rather than silently overwriting.
    pub fn set_type(&self, ty: Type) {
        let mut slot = self.type_id.borrow_mut();
        assert!(
            slot.is_none(),
            "expression type written twice at {:?}",
            self.position
        );
        *slot = Some(ty);
    }

    pub fn line(&self) -> usize {
        self.position.line
    }
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    /// The sentinel standing in for a missing initializer (e.g. an
    /// attribute declared without `<- expr`, or a formal parameter).
    NoExpr,

    IntConst(Symbol),
    StringConst(Symbol),
    BoolConst(bool),

    New {
        declared_type: Symbol,
    },
    IsVoid {
        expr: Expr,
    },
    Not {
        expr: Expr,
    },
    Complement {
        expr: Expr,
    },

    Plus { lhs: Expr, rhs: Expr },
    Sub { lhs: Expr, rhs: Expr },
    Mul { lhs: Expr, rhs: Expr },
    Div { lhs: Expr, rhs: Expr },

    LessThan { lhs: Expr, rhs: Expr },
    LessThanEqualTo { lhs: Expr, rhs: Expr },
    EqualTo { lhs: Expr, rhs: Expr },

    If {
        predicate: Expr,
        then_branch: Expr,
        else_branch: Expr,
    },
    While {
        predicate: Expr,
        body: Expr,
    },
    Block {
        body: Vec<Expr>,
    },
    Let {
        name: Symbol,
        declared_type: Symbol,
        init: Expr,
        body: Expr,
    },
    Case {
        scrutinee: Expr,
        branches: Vec<CaseBranch>,
    },
    Assign {
        name: Symbol,
        rhs: Expr,
    },

    Object {
        name: Symbol,
    },

    StaticDispatch {
        receiver: Expr,
        ancestor_type: Symbol,
        method: Symbol,
        args: Vec<Expr>,
    },
    DynamicDispatch {
        receiver: Expr,
        method: Symbol,
        args: Vec<Expr>,
    },
    /// `m(args)` with no explicit receiver: sugar for a dynamic dispatch on
    /// `self`, split out so the parser and pretty printer can recognize the
    /// self-dispatch call syntax without forcing the checker/codegen to
    /// special-case it (see [`Expr::desugar_self_dispatch`]).
    SelfDispatch {
        method: Symbol,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Rewrite a bare `m(args)` call into an explicit dynamic dispatch on
    /// `self`, so only one dispatch form reaches the checker and generator.
    /// Applied by the parser immediately after construction.
    pub fn desugar_self_dispatch(self) -> Expr {
        if let ExprKind::SelfDispatch { method, args } = *self.kind {
            let receiver = Expr::new(
                ExprKind::Object {
                    name: Symbol::from("self"),
                },
                self.position.clone(),
            );
            Expr::new(
                ExprKind::DynamicDispatch {
                    receiver,
                    method,
                    args,
                },
                self.position,
            )
        } else {
            self
        }
    }
}
