//! Post-order expression emission.
//!
//! Three rules here are deliberate departures from the textbook scheme:
//! `Let` actually reserves and addresses a stack slot for its bound name,
//! `Case` performs a real runtime-type walk over `class_parentTag` to pick
//! the nearest matching branch rather than trying every branch in sequence,
//! and `StaticDispatch` loads the *named ancestor's* dispatch table rather
//! than the receiver's dynamic one. See DESIGN.md.

use crate::coolast::{CaseBranch, Expr, ExprKind, Formal, Symbol};
use crate::semant::{BOOL, SELF, SELF_TYPE};
use crate::symtab::ScopedTable;

use super::instr::Instruction::{self, *};
use super::reg::Reg::{self, *};
use super::Generator;

/// Per-method codegen state: the current class, the formal/let/case-branch
/// name -> `$fp` word-offset table, and how many words below `$fp` are
/// currently reserved by open `let`/`case` bindings.
pub struct MethodEnv {
    pub current_class: Symbol,
    pub locals: ScopedTable<Symbol, i32>,
    pub locals_depth: i32,
}

impl MethodEnv {
    pub fn for_method(current_class: Symbol, formals: &[Formal]) -> Self {
        let mut locals = ScopedTable::new();
        for (index, formal) in formals.iter().enumerate() {
            locals.add(formal.name.clone(), 4 * (index as i32 + 1));
        }
        Self {
            current_class,
            locals,
            locals_depth: 0,
        }
    }
}

impl Generator<'_> {
    pub fn emit_expr(&mut self, expr: &Expr, env: &mut MethodEnv, out: &mut Vec<Instruction>) {
        match &*expr.kind {
            ExprKind::NoExpr => {}

            ExprKind::IntConst(value) => {
                let idx = self.ctx.integers.index_of(value.as_str()).unwrap_or(1);
                out.push(La(A0, format!("int_const{idx}")));
            }
            ExprKind::StringConst(value) => {
                let idx = self.ctx.strings.index_of(value.as_str()).unwrap_or(1);
                out.push(La(A0, format!("str_const{idx}")));
            }
            ExprKind::BoolConst(value) => {
                out.push(La(A0, format!("bool_const{}", *value as u8)));
            }

            ExprKind::New { declared_type } => self.emit_new(declared_type, out),

            ExprKind::IsVoid { expr: inner } => {
                self.emit_expr(inner, env, out);
                out.push(Jal("isvoid".to_string()));
            }
            ExprKind::Not { expr: inner } => {
                self.emit_expr(inner, env, out);
                out.push(Jal("lnot".to_string()));
            }
            ExprKind::Complement { expr: inner } => {
                self.emit_expr(inner, env, out);
                out.push(Lw(T0, 12, A0));
                out.push(Not(T0, T0));
                out.push(Sw(T0, 12, A0));
            }

            ExprKind::Plus { lhs, rhs } => self.emit_arith(lhs, rhs, env, out, Add),
            ExprKind::Sub { lhs, rhs } => self.emit_arith(lhs, rhs, env, out, Sub),
            ExprKind::Mul { lhs, rhs } => self.emit_arith(lhs, rhs, env, out, Mul),
            ExprKind::Div { lhs, rhs } => self.emit_arith(lhs, rhs, env, out, Div),

            ExprKind::LessThan { lhs, rhs } => self.emit_compare(lhs, rhs, env, out, "less"),
            ExprKind::LessThanEqualTo { lhs, rhs } => self.emit_compare(lhs, rhs, env, out, "less_eq"),
            ExprKind::EqualTo { lhs, rhs } => self.emit_compare(lhs, rhs, env, out, "eq"),

            ExprKind::If {
                predicate,
                then_branch,
                else_branch,
            } => {
                let n = self.next_label();
                self.emit_expr(predicate, env, out);
                out.push(La(T0, "bool_const1".to_string()));
                out.push(Beq(A0, T0, format!("iftrue{n}")));
                self.emit_expr(else_branch, env, out);
                out.push(J(format!("ifend{n}")));
                out.push(Label(format!("iftrue{n}")));
                self.emit_expr(then_branch, env, out);
                out.push(Label(format!("ifend{n}")));
            }

            ExprKind::While { predicate, body } => {
                let n = self.next_label();
                out.push(Label(format!("whileloop{n}")));
                self.emit_expr(predicate, env, out);
                out.push(La(T0, "bool_const1".to_string()));
                out.push(Bne(A0, T0, format!("whileend{n}")));
                self.emit_expr(body, env, out);
                out.push(J(format!("whileloop{n}")));
                out.push(Label(format!("whileend{n}")));
                out.push(La(A0, "bool_const0".to_string()));
            }

            ExprKind::Block { body } => {
                for item in body {
                    self.emit_expr(item, env, out);
                }
            }

            ExprKind::Let {
                name,
                declared_type,
                init,
                body,
            } => self.emit_let(name, declared_type, init, body, env, out),

            ExprKind::Case { scrutinee, branches } => self.emit_case(scrutinee, branches, env, out),

            ExprKind::Assign { name, rhs } => {
                self.emit_expr(rhs, env, out);
                self.store_name(name, env, out);
            }

            ExprKind::Object { name } => self.load_name(name, env, out),

            ExprKind::StaticDispatch {
                receiver,
                ancestor_type,
                method,
                args,
            } => self.emit_dispatch(receiver, Some(ancestor_type), method, args, env, out),

            ExprKind::DynamicDispatch { receiver, method, args } => {
                self.emit_dispatch(receiver, None, method, args, env, out)
            }

            ExprKind::SelfDispatch { .. } => {
                unreachable!("SelfDispatch must be desugared by the parser before codegen")
            }
        }
    }

    /// The value an uninitialized `let` binding (or attribute) of
    /// `declared_type` starts with: the empty string for `String`, `0` for
    /// `Int`, `false` for `Bool`, and the null object pointer otherwise.
    fn emit_default_value(&mut self, declared_type: &Symbol, out: &mut Vec<Instruction>) {
        match declared_type.as_str() {
            crate::semant::STRING => out.push(La(A0, "str_const0".to_string())),
            crate::semant::INT => out.push(La(A0, "int_const0".to_string())),
            crate::semant::BOOL => out.push(La(A0, "bool_const0".to_string())),
            _ => out.push(Li(A0, 0)),
        }
    }

    fn emit_new(&mut self, declared_type: &Symbol, out: &mut Vec<Instruction>) {
        if declared_type.as_str() == SELF_TYPE {
            out.push(Lw(T0, 0, S0));
            out.push(Comment("index into class_objTab by self's runtime tag".into()));
            out.push(Instruction::Raw(format!("\tsll\t{T1}, {T0}, 3")));
            out.push(La(T2, "class_objTab".to_string()));
            out.push(Add(T2, T2, T1));
            out.push(Lw(A0, 0, T2));
            out.push(Jal("Object.copy".to_string()));
            out.push(Lw(T0, 4, T2));
            out.push(Jalr(T0));
        } else {
            out.push(La(A0, format!("{declared_type}_prototype")));
            out.push(Jal("Object.copy".to_string()));
            out.push(Jal(format!("{declared_type}_init")));
        }
    }

    fn emit_arith(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        env: &mut MethodEnv,
        out: &mut Vec<Instruction>,
        op: fn(Reg, Reg, Reg) -> Instruction,
    ) {
        self.emit_expr(lhs, env, out);
        push_word(out, A0);
        self.emit_expr(rhs, env, out);
        out.push(Move(T1, A0));
        pop_word(out, T0);
        out.push(La(A0, "Int_prototype".to_string()));
        out.push(Jal("Object.copy".to_string()));
        out.push(Lw(T0, 12, T0));
        out.push(Lw(T1, 12, T1));
        out.push(op(T0, T0, T1));
        out.push(Sw(T0, 12, A0));
    }

    fn emit_compare(
        &mut self,
        lhs: &Expr,
        rhs: &Expr,
        env: &mut MethodEnv,
        out: &mut Vec<Instruction>,
        helper: &str,
    ) {
        self.emit_expr(lhs, env, out);
        out.push(Move(A1, A0));
        push_word(out, A1);
        self.emit_expr(rhs, env, out);
        pop_word(out, A1);
        out.push(Jal(helper.to_string()));
    }

    fn emit_let(
        &mut self,
        name: &Symbol,
        declared_type: &Symbol,
        init: &Expr,
        body: &Expr,
        env: &mut MethodEnv,
        out: &mut Vec<Instruction>,
    ) {
        if matches!(&*init.kind, ExprKind::NoExpr) {
            self.emit_default_value(declared_type, out);
        } else {
            self.emit_expr(init, env, out);
        }

        env.locals_depth += 1;
        let offset = -4 * env.locals_depth;
        out.push(Addiu(Sp, Sp, -4));
        out.push(Sw(A0, offset, Fp));
        env.locals.enter_scope();
        env.locals.add(name.clone(), offset);

        self.emit_expr(body, env, out);

        env.locals.exit_scope();
        out.push(Addiu(Sp, Sp, 4));
        env.locals_depth -= 1;
    }

    fn emit_case(&mut self, scrutinee: &Expr, branches: &[CaseBranch], env: &mut MethodEnv, out: &mut Vec<Instruction>) {
        self.emit_expr(scrutinee, env, out);
        push_word(out, A0);

        let n = self.next_label();
        let mut ordered: Vec<&CaseBranch> = branches.iter().collect();
        ordered.sort_by_key(|b| std::cmp::Reverse(self.map.chain_from(&b.declared_type).count()));

        out.push(Lw(T1, 0, A0));
        for (i, branch) in ordered.iter().enumerate() {
            let target_tag = self.layout.tag_of(&branch.declared_type);
            let check_label = format!("case{n}_check{i}");
            let next_label = format!("case{n}_next{i}");
            let match_label = format!("case{n}_match{i}");
            out.push(Move(T2, T1));
            out.push(Label(check_label));
            out.push(Li(T0, target_tag));
            out.push(Beq(T2, T0, match_label.clone()));
            out.push(Li(T0, -1));
            out.push(Beq(T2, T0, next_label.clone()));
            out.push(Instruction::Raw(format!("\tsll\t{T3}, {T2}, 2")));
            out.push(La(T4, "class_parentTag".to_string()));
            out.push(Add(T4, T4, T3));
            out.push(Lw(T2, 0, T4));
            out.push(J(format!("case{n}_check{i}")));
            out.push(Label(match_label));
            pop_word(out, A0);
            env.locals_depth += 1;
            let offset = -4 * env.locals_depth;
            out.push(Sw(A0, offset, Fp));
            env.locals.enter_scope();
            env.locals.add(branch.name.clone(), offset);
            self.emit_expr(&branch.body, env, out);
            env.locals.exit_scope();
            env.locals_depth -= 1;
            out.push(J(format!("caseend{n}")));
            out.push(Label(next_label));
        }
        out.push(Jal("_case_no_match_abort".to_string()));
        out.push(Label(format!("caseend{n}")));
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_dispatch(
        &mut self,
        receiver: &Expr,
        ancestor_type: Option<&Symbol>,
        method: &Symbol,
        args: &[Expr],
        env: &mut MethodEnv,
        out: &mut Vec<Instruction>,
    ) {
        let n = args.len() as i32;
        let frame_words = n + 3;
        out.push(Addiu(Sp, Sp, -4 * frame_words));
        out.push(Sw(Fp, 0, Sp));
        out.push(Sw(S0, 4, Sp));
        for (i, arg) in args.iter().enumerate() {
            self.emit_expr(arg, env, out);
            out.push(Sw(A0, 4 + 4 * (i as i32 + 1), Sp));
        }
        out.push(Addiu(Fp, Sp, 4));

        self.emit_expr(receiver, env, out);
        out.push(Move(S0, A0));

        let lookup_class = match ancestor_type {
            Some(ancestor) => ancestor.clone(),
            None => match receiver.get_type() {
                Some(crate::coolast::Type::SelfType) => env.current_class.clone(),
                Some(crate::coolast::Type::Class(name)) => name,
                _ => env.current_class.clone(),
            },
        };

        if ancestor_type.is_some() {
            out.push(La(T0, format!("{lookup_class}_disptable")));
        } else {
            out.push(Lw(T0, 8, A0));
        }
        let slot = self.layout.method_slot(&lookup_class, method).unwrap_or(0);
        out.push(Lw(T0, 4 * slot as i32, T0));
        out.push(Jalr(T0));
    }

    fn load_name(&mut self, name: &Symbol, env: &MethodEnv, out: &mut Vec<Instruction>) {
        if name.as_str() == SELF {
            out.push(Move(A0, S0));
        } else if let Some(offset) = env.locals.lookup(name) {
            out.push(Lw(A0, offset, Fp));
        } else if let Some(offset) = self.layout.attribute_word_offset(&env.current_class, name) {
            out.push(Lw(A0, 4 * offset, S0));
        } else {
            out.push(Comment(format!("unresolved identifier {name}")));
        }
    }

    fn store_name(&mut self, name: &Symbol, env: &MethodEnv, out: &mut Vec<Instruction>) {
        if let Some(offset) = env.locals.lookup(name) {
            out.push(Sw(A0, offset, Fp));
        } else if let Some(offset) = self.layout.attribute_word_offset(&env.current_class, name) {
            out.push(Sw(A0, 4 * offset, S0));
        } else {
            out.push(Comment(format!("unresolved assignment target {name}")));
        }
    }
}

fn push_word(out: &mut Vec<Instruction>, reg: Reg) {
    out.push(Addiu(Sp, Sp, -4));
    out.push(Sw(reg, 0, Sp));
}

fn pop_word(out: &mut Vec<Instruction>, reg: Reg) {
    out.push(Lw(reg, 0, Sp));
    out.push(Addiu(Sp, Sp, 4));
}
