//! Pretty printer.
//!
//! A depth-first, indented dump of a [`Program`], used by the CLI's
//! `--dump-ast` flag and by tests that want a readable view of what the
//! parser actually produced. Output is not meant to be re-parseable; it is
//! a debugging aid, not a formatter.

use std::fmt::Write as _;

use crate::coolast::{CaseBranch, Class, Expr, ExprKind, Feature, Formal, Program};

const INDENT: &str = "  ";

pub fn print_program(program: &Program) -> String {
    let mut out = String::new();
    for class in &program.classes {
        print_class(class, 0, &mut out);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn print_class(class: &Class, depth: usize, out: &mut String) {
    indent(out, depth);
    writeln!(out, "class {} inherits {} {{", class.name, class.parent).unwrap();
    for feature in &class.features {
        print_feature(feature, depth + 1, out);
    }
    indent(out, depth);
    writeln!(out, "}}").unwrap();
}

fn print_feature(feature: &Feature, depth: usize, out: &mut String) {
    match feature {
        Feature::Attribute {
            name,
            declared_type,
            init,
            ..
        } => {
            indent(out, depth);
            writeln!(out, "attribute {name} : {declared_type}").unwrap();
            if !matches!(&*init.kind, ExprKind::NoExpr) {
                print_expr(init, depth + 1, out);
            }
        }
        Feature::Method {
            name,
            formals,
            return_type,
            body,
            ..
        } => {
            indent(out, depth);
            write!(out, "method {name}(").unwrap();
            for (i, formal) in formals.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                print_formal(formal, out);
            }
            writeln!(out, ") : {return_type}").unwrap();
            print_expr(body, depth + 1, out);
        }
    }
}

fn print_formal(formal: &Formal, out: &mut String) {
    write!(out, "{} : {}", formal.name, formal.declared_type).unwrap();
}

fn print_expr(expr: &Expr, depth: usize, out: &mut String) {
    indent(out, depth);
    match &*expr.kind {
        ExprKind::NoExpr => {
            writeln!(out, "no_expr").unwrap();
        }
        ExprKind::IntConst(value) => {
            writeln!(out, "int_const {value}").unwrap();
        }
        ExprKind::StringConst(value) => {
            writeln!(out, "string_const {value:?}").unwrap();
        }
        ExprKind::BoolConst(value) => {
            writeln!(out, "bool_const {value}").unwrap();
        }
        ExprKind::New { declared_type } => {
            writeln!(out, "new {declared_type}").unwrap();
        }
        ExprKind::IsVoid { expr: inner } => {
            writeln!(out, "isvoid").unwrap();
            print_expr(inner, depth + 1, out);
        }
        ExprKind::Not { expr: inner } => {
            writeln!(out, "not").unwrap();
            print_expr(inner, depth + 1, out);
        }
        ExprKind::Complement { expr: inner } => {
            writeln!(out, "complement").unwrap();
            print_expr(inner, depth + 1, out);
        }
        ExprKind::Plus { lhs, rhs } => print_binary(out, "plus", lhs, rhs, depth),
        ExprKind::Sub { lhs, rhs } => print_binary(out, "sub", lhs, rhs, depth),
        ExprKind::Mul { lhs, rhs } => print_binary(out, "mul", lhs, rhs, depth),
        ExprKind::Div { lhs, rhs } => print_binary(out, "div", lhs, rhs, depth),
        ExprKind::LessThan { lhs, rhs } => print_binary(out, "lt", lhs, rhs, depth),
        ExprKind::LessThanEqualTo { lhs, rhs } => print_binary(out, "leq", lhs, rhs, depth),
        ExprKind::EqualTo { lhs, rhs } => print_binary(out, "eq", lhs, rhs, depth),
        ExprKind::If {
            predicate,
            then_branch,
            else_branch,
        } => {
            writeln!(out, "if").unwrap();
            print_expr(predicate, depth + 1, out);
            print_expr(then_branch, depth + 1, out);
            print_expr(else_branch, depth + 1, out);
        }
        ExprKind::While { predicate, body } => {
            writeln!(out, "while").unwrap();
            print_expr(predicate, depth + 1, out);
            print_expr(body, depth + 1, out);
        }
        ExprKind::Block { body } => {
            writeln!(out, "block").unwrap();
            for item in body {
                print_expr(item, depth + 1, out);
            }
        }
        ExprKind::Let {
            name,
            declared_type,
            init,
            body,
        } => {
            writeln!(out, "let {name} : {declared_type}").unwrap();
            print_expr(init, depth + 1, out);
            print_expr(body, depth + 1, out);
        }
        ExprKind::Case { scrutinee, branches } => {
            writeln!(out, "case").unwrap();
            print_expr(scrutinee, depth + 1, out);
            for branch in branches {
                print_case_branch(branch, depth + 1, out);
            }
        }
        ExprKind::Assign { name, rhs } => {
            writeln!(out, "assign {name}").unwrap();
            print_expr(rhs, depth + 1, out);
        }
        ExprKind::Object { name } => {
            writeln!(out, "object {name}").unwrap();
        }
        ExprKind::StaticDispatch {
            receiver,
            ancestor_type,
            method,
            args,
        } => {
            writeln!(out, "static_dispatch @{ancestor_type}.{method}").unwrap();
            print_expr(receiver, depth + 1, out);
            for arg in args {
                print_expr(arg, depth + 1, out);
            }
        }
        ExprKind::DynamicDispatch { receiver, method, args } => {
            writeln!(out, "dispatch .{method}").unwrap();
            print_expr(receiver, depth + 1, out);
            for arg in args {
                print_expr(arg, depth + 1, out);
            }
        }
        ExprKind::SelfDispatch { method, args } => {
            writeln!(out, "self_dispatch {method}").unwrap();
            for arg in args {
                print_expr(arg, depth + 1, out);
            }
        }
    }
}

fn print_binary(out: &mut String, op: &str, lhs: &Expr, rhs: &Expr, depth: usize) {
    writeln!(out, "{op}").unwrap();
    print_expr(lhs, depth + 1, out);
    print_expr(rhs, depth + 1, out);
}

fn print_case_branch(branch: &CaseBranch, depth: usize, out: &mut String) {
    indent(out, depth);
    writeln!(out, "branch {} : {}", branch.name, branch.declared_type).unwrap();
    print_expr(&branch.body, depth + 1, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coolast::{Position, Symbol};

    #[test]
    fn prints_a_minimal_class() {
        let pos = Position::new("t.cl", 1);
        let program = Program {
            classes: vec![Class {
                name: Symbol::from("Main"),
                parent: Symbol::from("Object"),
                filename: Symbol::from("t.cl"),
                features: vec![Feature::Method {
                    name: Symbol::from("main"),
                    formals: vec![],
                    return_type: Symbol::from("Int"),
                    body: Expr::new(ExprKind::IntConst(Symbol::from("0")), pos.clone()),
                    position: pos.clone(),
                }],
                position: pos,
            }],
        };

        let dumped = print_program(&program);
        assert!(dumped.contains("class Main inherits Object {"));
        assert!(dumped.contains("method main() : Int"));
        assert!(dumped.contains("int_const 0"));
    }
}
