//! Type checker.
//!
//! Walks program → class → feature → expression, maintaining a scoped
//! identifier environment and the method-signature table built in
//! [`sig::build`]. Runs only if the semantic-analysis phase reported no
//! errors; on return, the driver checks `ctx.diagnostics.has_errors()`
//! again before entering code generation.

mod error;
mod expr;
mod sig;
mod types;

pub use error::TypeError;
pub use sig::{build as build_method_table, MethodSignature, MethodTable};
pub use types::{is_subtype, lub};

use crate::context::CompilerContext;
use crate::coolast::{Feature, Program, Symbol, Type};
use crate::semant::InheritanceMap;
use crate::symtab::ScopedTable;

/// Per-class-entry checking state: the identifier environment and the
/// shared, read-only tables built once for the whole program.
pub struct Env<'a> {
    pub map: &'a InheritanceMap,
    pub methods: &'a MethodTable,
    pub current_class: Symbol,
    pub scopes: ScopedTable<Symbol, Type>,
}

/// Type-check every class in `program` against `map`. Returns the method
/// table built along the way, which the code generator reuses for dispatch
/// table construction.
pub fn check(program: &Program, map: &InheritanceMap, ctx: &mut CompilerContext) -> MethodTable {
    let methods = sig::build(map, ctx);

    for class_name in &map.order {
        let Some(class) = map.class(class_name) else { continue };
        check_class(class_name, &class.features, map, &methods, ctx);
    }

    let _ = program;
    methods
}

fn check_class(
    class_name: &Symbol,
    features: &[Feature],
    map: &InheritanceMap,
    methods: &MethodTable,
    ctx: &mut CompilerContext,
) {
    let mut scopes: ScopedTable<Symbol, Type> = ScopedTable::new();
    scopes.add(Symbol::from(crate::semant::SELF), Type::SelfType);

    for ancestor in map.chain_from(class_name).skip(1) {
        let Some(ancestor_class) = map.class(&ancestor) else { continue };
        bind_attributes(ancestor_class.features.iter(), &mut scopes, ctx, false);
    }

    bind_attributes(features.iter(), &mut scopes, ctx, true);

    let mut env = Env {
        map,
        methods,
        current_class: class_name.clone(),
        scopes,
    };

    for feature in features {
        match feature {
            Feature::Attribute { init, .. } => {
                if !matches!(&*init.kind, crate::coolast::ExprKind::NoExpr) {
                    expr::check_expr(init, &mut env, ctx);
                }
            }
            Feature::Method { body, .. } => {
                check_method(feature, body, &mut env, ctx);
            }
        }
    }
}

fn bind_attributes<'a>(
    features: impl Iterator<Item = &'a Feature>,
    scopes: &mut ScopedTable<Symbol, Type>,
    ctx: &mut CompilerContext,
    is_own: bool,
) {
    for feature in features {
        let Feature::Attribute {
            name,
            declared_type,
            position,
            ..
        } = feature
        else {
            continue;
        };

        if is_own && scopes.probe(name).is_some() {
            ctx.diagnostics.report(
                position.file.to_string(),
                position.line,
                TypeError::AttributeRedefined(name.clone()).to_string(),
            );
            continue;
        }

        let ty = if declared_type.as_str() == crate::semant::SELF_TYPE {
            Type::SelfType
        } else {
            Type::Class(declared_type.clone())
        };
        scopes.add(name.clone(), ty);
    }
}

fn check_method(feature: &Feature, body: &crate::coolast::Expr, env: &mut Env, ctx: &mut CompilerContext) {
    let Feature::Method {
        formals, return_type, ..
    } = feature
    else {
        return;
    };

    env.scopes.enter_scope();
    for formal in formals {
        let ty = if formal.declared_type.as_str() == crate::semant::SELF_TYPE {
            Type::SelfType
        } else {
            Type::Class(formal.declared_type.clone())
        };
        env.scopes.add(formal.name.clone(), ty);
    }
    let body_ty = expr::check_expr(body, env, ctx);
    env.scopes.exit_scope();

    let declared = if return_type.as_str() == crate::semant::SELF_TYPE {
        Type::SelfType
    } else {
        Type::Class(return_type.clone())
    };
    if !is_subtype(env.map, &env.current_class, &body_ty, &declared) {
        ctx.diagnostics.report(
            body.position.file.to_string(),
            body.line(),
            TypeError::SubtypeViolation {
                found: body_ty,
                expected: declared,
                context: "method body",
            }
            .to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coolast::{Class, Expr, ExprKind, Formal, Position};
    use crate::semant::OBJECT;

    fn pos() -> Position {
        Position::new("t.cl", 1)
    }

    fn lit_int(n: &str) -> Expr {
        Expr::new(ExprKind::IntConst(Symbol::from(n)), pos())
    }

    fn main_class_with_body(body: Expr) -> Class {
        Class {
            name: Symbol::from("Main"),
            parent: Symbol::from(OBJECT),
            filename: Symbol::from("t.cl"),
            features: vec![Feature::Method {
                name: Symbol::from("main"),
                formals: vec![],
                return_type: Symbol::from("Int"),
                body,
                position: pos(),
            }],
            position: pos(),
        }
    }

    #[test]
    fn well_typed_method_body_produces_no_diagnostics() {
        let mut program = crate::coolast::Program {
            classes: vec![main_class_with_body(lit_int("5"))],
        };
        let mut ctx = CompilerContext::new();
        let map = crate::semant::analyze(&mut program, &mut ctx);
        assert!(!ctx.diagnostics.has_errors());
        check(&program, &map, &mut ctx);
        assert!(!ctx.diagnostics.has_errors());
    }

    #[test]
    fn if_with_non_bool_predicate_is_reported() {
        let body = Expr::new(
            ExprKind::If {
                predicate: lit_int("1"),
                then_branch: lit_int("1"),
                else_branch: lit_int("2"),
            },
            pos(),
        );
        let mut program = crate::coolast::Program {
            classes: vec![main_class_with_body(body)],
        };
        let mut ctx = CompilerContext::new();
        let map = crate::semant::analyze(&mut program, &mut ctx);
        check(&program, &map, &mut ctx);
        assert!(ctx.diagnostics.has_errors());
    }

    #[test]
    fn unbound_identifier_is_reported_and_recovers_to_object() {
        let body = Expr::new(ExprKind::Object { name: Symbol::from("nope") }, pos());
        let mut program = crate::coolast::Program {
            classes: vec![main_class_with_body(body)],
        };
        let mut ctx = CompilerContext::new();
        let map = crate::semant::analyze(&mut program, &mut ctx);
        check(&program, &map, &mut ctx);
        assert!(ctx.diagnostics.has_errors());
    }

    #[test]
    fn let_binds_name_for_its_body() {
        let formal_init = lit_int("0");
        let use_x = Expr::new(ExprKind::Object { name: Symbol::from("x") }, pos());
        let body = Expr::new(
            ExprKind::Let {
                name: Symbol::from("x"),
                declared_type: Symbol::from("Int"),
                init: formal_init,
                body: use_x,
            },
            pos(),
        );
        let mut program = crate::coolast::Program {
            classes: vec![main_class_with_body(body)],
        };
        let mut ctx = CompilerContext::new();
        let map = crate::semant::analyze(&mut program, &mut ctx);
        check(&program, &map, &mut ctx);
        assert!(!ctx.diagnostics.has_errors());
    }

    #[test]
    fn method_body_not_a_subtype_of_return_type_is_reported() {
        let class = Class {
            name: Symbol::from("Main"),
            parent: Symbol::from(OBJECT),
            filename: Symbol::from("t.cl"),
            features: vec![Feature::Method {
                name: Symbol::from("main"),
                formals: vec![],
                return_type: Symbol::from("Bool"),
                body: lit_int("5"),
                position: pos(),
            }],
            position: pos(),
        };
        let mut program = crate::coolast::Program { classes: vec![class] };
        let mut ctx = CompilerContext::new();
        let map = crate::semant::analyze(&mut program, &mut ctx);
        check(&program, &map, &mut ctx);
        assert!(ctx.diagnostics.has_errors());
        assert!(ctx
            .diagnostics
            .iter()
            .any(|d| d.message.contains("method body")));
    }

    #[test]
    fn formal_types_are_visible_in_method_body() {
        let use_arg = Expr::new(ExprKind::Object { name: Symbol::from("n") }, pos());
        let class = Class {
            name: Symbol::from("Main"),
            parent: Symbol::from(OBJECT),
            filename: Symbol::from("t.cl"),
            features: vec![Feature::Method {
                name: Symbol::from("main"),
                formals: vec![Formal {
                    name: Symbol::from("n"),
                    declared_type: Symbol::from("Int"),
                    position: pos(),
                }],
                return_type: Symbol::from("Int"),
                body: use_arg,
                position: pos(),
            }],
            position: pos(),
        };
        let mut program = crate::coolast::Program { classes: vec![class] };
        let mut ctx = CompilerContext::new();
        let map = crate::semant::analyze(&mut program, &mut ctx);
        check(&program, &map, &mut ctx);
        assert!(!ctx.diagnostics.has_errors());
    }
}
