//! Per-expression-kind typing rules.
//!
//! Every rule follows the same error-recovery discipline: on a local type
//! failure, report a diagnostic, assign the offending node `Object`, and
//! keep checking so one run surfaces as many errors as possible.

use crate::context::CompilerContext;
use crate::coolast::{Expr, ExprKind, Symbol, Type};
use crate::semant::{BOOL, INT, OBJECT, SELF, SELF_TYPE, STRING};

use super::error::TypeError;
use super::types::{is_subtype, lub};
use super::Env;

fn object_type() -> Type {
    Type::class(OBJECT)
}

fn report(ctx: &mut CompilerContext, expr: &Expr, error: TypeError) {
    ctx.diagnostics
        .report(expr.position.file.to_string(), expr.line(), error.to_string());
}

/// Check `expr`, writing its resolved type into its type slot, and return
/// that type.
pub fn check_expr(expr: &Expr, env: &mut Env, ctx: &mut CompilerContext) -> Type {
    let ty = check_expr_kind(expr, env, ctx);
    expr.set_type(ty.clone());
    ty
}

fn check_expr_kind(expr: &Expr, env: &mut Env, ctx: &mut CompilerContext) -> Type {
    match &*expr.kind {
        ExprKind::NoExpr => Type::NoType,

        ExprKind::IntConst(_) => Type::class(INT),
        ExprKind::StringConst(_) => Type::class(STRING),
        ExprKind::BoolConst(_) => Type::class(BOOL),

        ExprKind::New { declared_type } => {
            if declared_type.as_str() == SELF_TYPE {
                Type::SelfType
            } else {
                Type::Class(declared_type.clone())
            }
        }

        ExprKind::IsVoid { expr: inner } => {
            check_expr(inner, env, ctx);
            Type::class(BOOL)
        }

        ExprKind::Not { expr: inner } => {
            let inner_ty = check_expr(inner, env, ctx);
            if inner_ty != Type::class(BOOL) {
                report(ctx, expr, TypeError::NotOperandNotBool(inner_ty));
                return object_type();
            }
            Type::class(BOOL)
        }

        ExprKind::Complement { expr: inner } => {
            let inner_ty = check_expr(inner, env, ctx);
            if inner_ty != Type::class(INT) {
                report(ctx, expr, TypeError::ArithOperandNotInt(inner_ty));
                return object_type();
            }
            Type::class(INT)
        }

        ExprKind::Plus { lhs, rhs }
        | ExprKind::Sub { lhs, rhs }
        | ExprKind::Mul { lhs, rhs }
        | ExprKind::Div { lhs, rhs } => {
            let lhs_ty = check_expr(lhs, env, ctx);
            let rhs_ty = check_expr(rhs, env, ctx);
            let mut ok = true;
            if lhs_ty != Type::class(INT) {
                report(ctx, lhs, TypeError::ArithOperandNotInt(lhs_ty));
                ok = false;
            }
            if rhs_ty != Type::class(INT) {
                report(ctx, rhs, TypeError::ArithOperandNotInt(rhs_ty));
                ok = false;
            }
            if ok {
                Type::class(INT)
            } else {
                object_type()
            }
        }

        ExprKind::LessThan { lhs, rhs } | ExprKind::LessThanEqualTo { lhs, rhs } => {
            let lhs_ty = check_expr(lhs, env, ctx);
            let rhs_ty = check_expr(rhs, env, ctx);
            let mut ok = true;
            if lhs_ty != Type::class(INT) {
                report(ctx, lhs, TypeError::CompareOperandNotInt(lhs_ty));
                ok = false;
            }
            if rhs_ty != Type::class(INT) {
                report(ctx, rhs, TypeError::CompareOperandNotInt(rhs_ty));
                ok = false;
            }
            if !ok {
                return object_type();
            }
            Type::class(BOOL)
        }

        ExprKind::EqualTo { lhs, rhs } => {
            let lhs_ty = check_expr(lhs, env, ctx);
            let rhs_ty = check_expr(rhs, env, ctx);
            let primitive = |t: &Type| matches!(t.as_str(), Some(INT) | Some(BOOL) | Some(STRING));
            if (primitive(&lhs_ty) || primitive(&rhs_ty)) && lhs_ty != rhs_ty {
                report(ctx, expr, TypeError::EqualityTypeMismatch(lhs_ty, rhs_ty));
                return object_type();
            }
            Type::class(BOOL)
        }

        ExprKind::If {
            predicate,
            then_branch,
            else_branch,
        } => {
            let predicate_ty = check_expr(predicate, env, ctx);
            if predicate_ty != Type::class(BOOL) {
                report(
                    ctx,
                    predicate,
                    TypeError::PredicateNotBool {
                        found: predicate_ty,
                        context: "if",
                    },
                );
            }
            let then_ty = check_expr(then_branch, env, ctx);
            let else_ty = check_expr(else_branch, env, ctx);
            lub(env.map, &env.current_class, &[then_ty, else_ty])
        }

        ExprKind::While { predicate, body } => {
            let predicate_ty = check_expr(predicate, env, ctx);
            if predicate_ty != Type::class(BOOL) {
                report(
                    ctx,
                    predicate,
                    TypeError::PredicateNotBool {
                        found: predicate_ty,
                        context: "while",
                    },
                );
            }
            check_expr(body, env, ctx);
            object_type()
        }

        ExprKind::Block { body } => {
            let mut last = Type::NoType;
            for item in body {
                last = check_expr(item, env, ctx);
            }
            last
        }

        ExprKind::Let {
            name,
            declared_type,
            init,
            body,
        } => {
            let declared = resolve_declared(declared_type);
            if !matches!(&*init.kind, ExprKind::NoExpr) {
                let init_ty = check_expr(init, env, ctx);
                if !is_subtype(env.map, &env.current_class, &init_ty, &declared) {
                    report(
                        ctx,
                        init,
                        TypeError::SubtypeViolation {
                            found: init_ty,
                            expected: declared.clone(),
                            context: "let initializer",
                        },
                    );
                }
            }
            env.scopes.enter_scope();
            env.scopes.add(name.clone(), declared);
            let result = check_expr(body, env, ctx);
            env.scopes.exit_scope();
            result
        }

        ExprKind::Case { scrutinee, branches } => {
            check_expr(scrutinee, env, ctx);
            let mut branch_types = Vec::with_capacity(branches.len());
            for branch in branches {
                env.scopes.enter_scope();
                env.scopes
                    .add(branch.name.clone(), resolve_declared(&branch.declared_type));
                branch_types.push(check_expr(&branch.body, env, ctx));
                env.scopes.exit_scope();
            }
            lub(env.map, &env.current_class, &branch_types)
        }

        ExprKind::Assign { name, rhs } => {
            let rhs_ty = check_expr(rhs, env, ctx);
            let Some(declared) = lookup_identifier(env, name) else {
                report(ctx, expr, TypeError::UnboundIdentifier(name.clone()));
                return object_type();
            };
            if !is_subtype(env.map, &env.current_class, &rhs_ty, &declared) {
                report(
                    ctx,
                    expr,
                    TypeError::SubtypeViolation {
                        found: rhs_ty.clone(),
                        expected: declared,
                        context: "assignment",
                    },
                );
                return object_type();
            }
            rhs_ty
        }

        ExprKind::Object { name } => {
            if name.as_str() == SELF {
                return Type::SelfType;
            }
            match lookup_identifier(env, name) {
                Some(ty) => ty,
                None => {
                    report(ctx, expr, TypeError::UnboundIdentifier(name.clone()));
                    object_type()
                }
            }
        }

        ExprKind::StaticDispatch {
            receiver,
            ancestor_type,
            method,
            args,
        } => {
            let receiver_ty = check_expr(receiver, env, ctx);
            let ancestor = Type::Class(ancestor_type.clone());
            if !is_subtype(env.map, &env.current_class, &receiver_ty, &ancestor) {
                report(
                    ctx,
                    receiver,
                    TypeError::StaticDispatchNotAncestor {
                        receiver: receiver_ty.clone(),
                        ancestor: ancestor_type.clone(),
                    },
                );
                return object_type();
            }
            check_dispatch(env, ctx, expr, ancestor_type, &receiver_ty, method, args)
        }

        ExprKind::DynamicDispatch { receiver, method, args } => {
            let receiver_ty = check_expr(receiver, env, ctx);
            let lookup_class = match &receiver_ty {
                Type::SelfType => env.current_class.clone(),
                Type::Class(name) => name.clone(),
                Type::NoType => {
                    report(
                        ctx,
                        receiver,
                        TypeError::UnknownMethod {
                            class: receiver_ty.clone(),
                            method: method.clone(),
                        },
                    );
                    return object_type();
                }
            };
            check_dispatch(env, ctx, expr, &lookup_class, &receiver_ty, method, args)
        }

        ExprKind::SelfDispatch { .. } => {
            unreachable!("SelfDispatch must be desugared by the parser before type checking")
        }
    }
}

fn resolve_declared(declared_type: &Symbol) -> Type {
    if declared_type.as_str() == SELF_TYPE {
        Type::SelfType
    } else {
        Type::Class(declared_type.clone())
    }
}

fn lookup_identifier(env: &Env, name: &Symbol) -> Option<Type> {
    env.scopes.lookup(name)
}

#[allow(clippy::too_many_arguments)]
fn check_dispatch(
    env: &mut Env,
    ctx: &mut CompilerContext,
    expr: &Expr,
    lookup_class: &Symbol,
    receiver_ty: &Type,
    method: &Symbol,
    args: &[Expr],
) -> Type {
    let arg_types: Vec<Type> = args.iter().map(|a| check_expr(a, env, ctx)).collect();

    let Some(signature) = env.methods.lookup(env.map, lookup_class, method).cloned() else {
        report(
            ctx,
            expr,
            TypeError::UnknownMethod {
                class: receiver_ty.clone(),
                method: method.clone(),
            },
        );
        return object_type();
    };

    if signature.formals.len() != arg_types.len() {
        report(
            ctx,
            expr,
            TypeError::DispatchArgCount {
                method: method.clone(),
                found: arg_types.len(),
                expected: signature.formals.len(),
            },
        );
        return object_type();
    }

    let mut ok = true;
    for (index, (arg_ty, formal_ty)) in arg_types.iter().zip(signature.formals.iter()).enumerate() {
        let formal_ty = resolve_declared(formal_ty);
        if !is_subtype(env.map, &env.current_class, arg_ty, &formal_ty) {
            report(
                ctx,
                &args[index],
                TypeError::DispatchArgMismatch {
                    method: method.clone(),
                    index,
                    found: arg_ty.clone(),
                    expected: formal_ty,
                },
            );
            ok = false;
        }
    }
    if !ok {
        return object_type();
    }

    if signature.return_type.as_str() == SELF_TYPE {
        receiver_ty.clone()
    } else {
        Type::Class(signature.return_type.clone())
    }
}

trait TypeExt {
    fn as_str(&self) -> Option<&str>;
}

impl TypeExt for Type {
    fn as_str(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name.as_str()),
            _ => None,
        }
    }
}
