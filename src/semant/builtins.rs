//! Installs the synthetic definitions of the five built-in classes.
//!
//! Their features are the canonical Cool signatures:
//! `Object.abort/type_name/copy`; `IO.out_string/out_int/in_string/in_int`;
//! `Int`/`Bool` each carry one primitive-slot attribute `val`; `String`
//! carries `val:Int`/`str_field:prim_slot` and `length`/`concat`/`substr`.
//! None of these method bodies are ever code-generated — they are provided
//! by the linked runtime library — so their bodies are all
//! [`ExprKind::NoExpr`] placeholders.

use crate::context::CompilerContext;
use crate::coolast::{Class, Expr, ExprKind, Feature, Formal, Position, Program, Symbol};

use super::{BOOL, INT, IO, NO_CLASS, OBJECT, PRIM_SLOT, SELF_TYPE, STRING};

pub const BUILTIN_FILENAME: &str = "<builtin>";

fn pos() -> Position {
    Position::new(BUILTIN_FILENAME, 0)
}

fn no_expr() -> Expr {
    Expr::new(ExprKind::NoExpr, pos())
}

fn formal(name: &str, declared_type: &str) -> Formal {
    Formal {
        name: Symbol::from(name),
        declared_type: Symbol::from(declared_type),
        position: pos(),
    }
}

fn method(name: &str, formals: Vec<Formal>, return_type: &str) -> Feature {
    Feature::Method {
        name: Symbol::from(name),
        formals,
        return_type: Symbol::from(return_type),
        body: no_expr(),
        position: pos(),
    }
}

fn attribute(name: &str, declared_type: &str) -> Feature {
    Feature::Attribute {
        name: Symbol::from(name),
        declared_type: Symbol::from(declared_type),
        init: no_expr(),
        position: pos(),
    }
}

fn class(name: &str, parent: &str, features: Vec<Feature>) -> Class {
    Class {
        name: Symbol::from(name),
        parent: Symbol::from(parent),
        filename: Symbol::from(BUILTIN_FILENAME),
        features,
        position: pos(),
    }
}

pub fn install_builtins(program: &mut Program, ctx: &mut CompilerContext) {
    let object = class(
        OBJECT,
        NO_CLASS,
        vec![
            method("abort", vec![], OBJECT),
            method("type_name", vec![], STRING),
            method("copy", vec![], SELF_TYPE),
        ],
    );

    let io = class(
        IO,
        OBJECT,
        vec![
            method("out_string", vec![formal("arg", STRING)], SELF_TYPE),
            method("out_int", vec![formal("arg", INT)], SELF_TYPE),
            method("in_string", vec![], STRING),
            method("in_int", vec![], INT),
        ],
    );

    let int = class(INT, OBJECT, vec![attribute("val", PRIM_SLOT)]);
    let boolean = class(BOOL, OBJECT, vec![attribute("val", PRIM_SLOT)]);

    let string = class(
        STRING,
        OBJECT,
        vec![
            attribute("val", INT),
            attribute("str_field", PRIM_SLOT),
            method("length", vec![], INT),
            method("concat", vec![formal("arg", STRING)], STRING),
            method(
                "substr",
                vec![formal("arg", INT), formal("arg2", INT)],
                STRING,
            ),
        ],
    );

    for name in [OBJECT, IO, INT, BOOL, STRING] {
        ctx.strings.add(name);
    }

    program.classes.extend([object, io, int, boolean, string]);
}
