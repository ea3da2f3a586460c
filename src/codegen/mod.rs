//! MIPS/SPIM code generator.
//!
//! Five emission passes produce one assembly stream: the `.data` header and
//! tag globals, the constants pool, dispatch tables, prototype objects, and
//! finally `.text` with every class initializer and user method. Basic
//! classes' methods are provided by the linked runtime and are never
//! emitted; their initializers are (attribute storage for `prim_slot`
//! attributes is runtime-controlled, so those stores are skipped).

mod expr;
mod instr;
mod layout;
mod reg;

pub use instr::Instruction;
pub use layout::{Layout, BOOL_TAG, INT_TAG, STRING_TAG};
pub use reg::Reg;

use std::fmt::Write as _;

use Instruction::*;
use Reg::*;

use crate::context::CompilerContext;
use crate::coolast::{Feature, Program, Symbol};
use crate::semant::{InheritanceMap, BOOL, INT, IO, NO_CLASS, OBJECT, STRING};

use self::expr::MethodEnv;

const AR_BASE_SIZE: i32 = 3;

pub struct Generator<'a> {
    map: &'a InheritanceMap,
    layout: &'a Layout,
    ctx: &'a mut CompilerContext,
    label_counter: usize,
}

fn is_basic_class(name: &Symbol) -> bool {
    matches!(name.as_str(), OBJECT | IO | INT | BOOL | STRING)
}

impl<'a> Generator<'a> {
    fn next_label(&mut self) -> usize {
        self.label_counter += 1;
        self.label_counter
    }

    fn data_header(&self, out: &mut String) {
        writeln!(out, "\t.data").unwrap();
        writeln!(out, "\t.globl Main_prototype").unwrap();
        writeln!(out, "\t.globl Main_init").unwrap();
        writeln!(out, "\t.globl Main.main").unwrap();
        writeln!(out, "\t.globl bool_const0").unwrap();
        writeln!(out, "\t.globl bool_const1").unwrap();
        writeln!(out, "__int_tag:\t.word {INT_TAG}").unwrap();
        writeln!(out, "__bool_tag:\t.word {BOOL_TAG}").unwrap();
        writeln!(out, "__string_tag:\t.word {STRING_TAG}").unwrap();
    }

    fn constants_pool(&mut self, out: &mut String) {
        let class_names: Vec<Symbol> = self.map.order.clone();
        for name in &class_names {
            self.ctx.strings.add(name.as_str());
        }

        writeln!(out, "str_const0:\t.word {STRING_TAG} 5 String_disptable 0 0").unwrap();
        for (idx, text) in self.ctx.strings.elements().enumerate() {
            let words = 4 + text.len().div_ceil(4);
            writeln!(
                out,
                "str_const{}:\t.word {STRING_TAG} {} String_disptable {} \"{}\"",
                idx + 1,
                words,
                text.len(),
                text
            )
            .unwrap();
        }

        writeln!(out, "int_const0:\t.word {INT_TAG} 4 Int_disptable 0").unwrap();
        for (idx, text) in self.ctx.integers.elements().enumerate() {
            writeln!(out, "int_const{}:\t.word {INT_TAG} 4 Int_disptable {}", idx + 1, text).unwrap();
        }

        writeln!(out, "bool_const0:\t.word {BOOL_TAG} 4 Bool_disptable 0").unwrap();
        writeln!(out, "bool_const1:\t.word {BOOL_TAG} 4 Bool_disptable 1").unwrap();
    }

    fn dispatch_tables(&self, out: &mut String) {
        for name in &self.map.order {
            if name.as_str() == NO_CLASS {
                continue;
            }
            let table = self.layout.dispatch.get(name).cloned().unwrap_or_default();
            write!(out, "{name}_disptable:\t.word").unwrap();
            for (method, defining_class) in &table {
                write!(out, " {defining_class}.{method}").unwrap();
            }
            writeln!(out).unwrap();
        }
    }

    fn prototype_objects(&self, out: &mut String) {
        for name in &self.map.order {
            if name.as_str() == NO_CLASS {
                continue;
            }
            let tag = self.layout.tag_of(name);
            let attr_count = self.layout.attr_count(name);
            let size = AR_BASE_SIZE + attr_count as i32;
            write!(out, "{name}_prototype:\t.word {tag} {size} {name}_disptable").unwrap();
            for _ in 0..attr_count {
                write!(out, " 0").unwrap();
            }
            writeln!(out).unwrap();
        }

        let max_tag = self.map.order.iter().map(|n| self.layout.tag_of(n)).max().unwrap_or(0);
        writeln!(out, "class_objTab:").unwrap();
        for tag in 0..=max_tag {
            let class = self.map.order.iter().find(|n| self.layout.tag_of(n) == tag);
            match class {
                Some(name) => writeln!(out, "\t.word {name}_prototype {name}_init").unwrap(),
                None => writeln!(out, "\t.word 0 0").unwrap(),
            }
        }

        writeln!(out, "class_parentTag:").unwrap();
        for tag in 0..=max_tag {
            let parent_tag = self
                .map
                .order
                .iter()
                .find(|n| self.layout.tag_of(n) == tag)
                .and_then(|n| self.map.parent_of(n))
                .map(|p| self.layout.tag_of(p))
                .unwrap_or(-1);
            writeln!(out, "\t.word {parent_tag}").unwrap();
        }
    }

    fn class_init(&mut self, name: &Symbol, program: &Program, out: &mut String) {
        let Some(class) = find_class(program, name) else { return };

        writeln!(out, "\n{name}_init:").unwrap();
        let mut body = vec![
            Addiu(Sp, Sp, -12),
            Sw(Fp, 12, Sp),
            Sw(S0, 8, Sp),
            Sw(Ra, 4, Sp),
            Addiu(Fp, Sp, 4),
            Move(S0, A0),
        ];

        if name.as_str() != OBJECT {
            if let Some(parent) = self.map.parent_of(name) {
                if parent.as_str() != NO_CLASS {
                    body.push(Jal(format!("{parent}_init")));
                }
            }
        }

        let mut env = MethodEnv::for_method(name.clone(), &[]);
        for feature in &class.features {
            if let Feature::Attribute {
                name: attr_name,
                declared_type,
                init,
                ..
            } = feature
            {
                if matches!(&*init.kind, crate::coolast::ExprKind::NoExpr) {
                    continue;
                }
                self.emit_expr(init, &mut env, &mut body);
                if declared_type.as_str() != crate::semant::PRIM_SLOT {
                    let offset = self
                        .layout
                        .attribute_word_offset(name, attr_name)
                        .expect("attribute must be in its own class's layout");
                    body.push(Sw(A0, 4 * offset, S0));
                }
            }
        }

        body.push(Move(A0, S0));
        body.push(Lw(Fp, 12, Sp));
        body.push(Lw(S0, 8, Sp));
        body.push(Lw(Ra, 4, Sp));
        body.push(Addiu(Sp, Sp, 12));
        body.push(Jr(Ra));

        for instr in &body {
            writeln!(out, "{instr}").unwrap();
        }
    }

    fn method(&mut self, class_name: &Symbol, feature: &Feature, out: &mut String) {
        let Feature::Method { name, formals, body, .. } = feature else { return };

        let n = formals.len() as i32;
        writeln!(out, "\n{class_name}.{name}:").unwrap();

        let mut instrs = vec![Sw(Ra, 4 * (n + 1), Fp)];
        let mut env = MethodEnv::for_method(class_name.clone(), formals);
        self.emit_expr(body, &mut env, &mut instrs);
        instrs.push(Lw(Ra, 4 * (n + 1), Fp));
        instrs.push(Lw(S0, 0, Fp));
        instrs.push(Lw(T0, -4, Fp));
        instrs.push(Addiu(Sp, Fp, 4 * (n + 2)));
        instrs.push(Move(Fp, T0));
        instrs.push(Jr(Ra));

        for instr in &instrs {
            writeln!(out, "{instr}").unwrap();
        }
    }

    fn text_section(&mut self, program: &Program, out: &mut String) {
        writeln!(out, "\n\t.text").unwrap();

        let order = self.map.order.clone();
        for name in &order {
            if name.as_str() == NO_CLASS {
                continue;
            }
            self.class_init(name, program, out);
        }

        for name in &order {
            if is_basic_class(name) {
                continue;
            }
            let Some(class) = find_class(program, name) else { continue };
            for feature in &class.features {
                if feature.is_method() {
                    self.method(name, feature, out);
                }
            }
        }
    }
}

fn find_class<'p>(program: &'p Program, name: &Symbol) -> Option<&'p crate::coolast::Class> {
    program.classes.iter().find(|c| &c.name == name)
}

/// Generate the full assembly text for `program`. `map` is the result of
/// semantic analysis; the driver must not call this if semantic analysis or
/// type checking reported any errors.
pub fn generate(program: &Program, map: &InheritanceMap, ctx: &mut CompilerContext) -> String {
    let layout = layout::build(map);
    let mut generator = Generator {
        map,
        layout: &layout,
        ctx,
        label_counter: 0,
    };

    let mut out = String::new();
    generator.data_header(&mut out);
    generator.constants_pool(&mut out);
    generator.dispatch_tables(&mut out);
    generator.prototype_objects(&mut out);
    generator.text_section(program, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coolast::{Expr, ExprKind, Position};
    use crate::semant::{analyze, OBJECT};

    fn pos() -> crate::coolast::Position {
        Position::new("t.cl", 1)
    }

    fn main_program() -> Program {
        Program {
            classes: vec![crate::coolast::Class {
                name: Symbol::from("Main"),
                parent: Symbol::from(OBJECT),
                filename: Symbol::from("t.cl"),
                features: vec![Feature::Method {
                    name: Symbol::from("main"),
                    formals: vec![],
                    return_type: Symbol::from("Int"),
                    body: Expr::new(ExprKind::IntConst(Symbol::from("0")), pos()),
                    position: pos(),
                }],
                position: pos(),
            }],
        }
    }

    #[test]
    fn generated_assembly_declares_main_labels() {
        let mut program = main_program();
        let mut ctx = CompilerContext::new();
        ctx.integers.add("0");
        let map = analyze(&mut program, &mut ctx);
        crate::typecheck::check(&program, &map, &mut ctx);
        let asm = generate(&program, &map, &mut ctx);
        assert!(asm.contains("Main_prototype"));
        assert!(asm.contains("Main_init:"));
        assert!(asm.contains("Main.main:"));
        assert!(asm.contains("Object_disptable"));
    }

    #[test]
    fn dispatch_table_records_override_in_defining_class() {
        let mut program = Program {
            classes: vec![
                crate::coolast::Class {
                    name: Symbol::from("A"),
                    parent: Symbol::from(OBJECT),
                    filename: Symbol::from("t.cl"),
                    features: vec![Feature::Method {
                        name: Symbol::from("foo"),
                        formals: vec![],
                        return_type: Symbol::from("Int"),
                        body: Expr::new(ExprKind::IntConst(Symbol::from("1")), pos()),
                        position: pos(),
                    }],
                    position: pos(),
                },
                crate::coolast::Class {
                    name: Symbol::from("Main"),
                    parent: Symbol::from("A"),
                    filename: Symbol::from("t.cl"),
                    features: vec![
                        Feature::Method {
                            name: Symbol::from("foo"),
                            formals: vec![],
                            return_type: Symbol::from("Int"),
                            body: Expr::new(ExprKind::IntConst(Symbol::from("2")), pos()),
                            position: pos(),
                        },
                        Feature::Method {
                            name: Symbol::from("main"),
                            formals: vec![],
                            return_type: Symbol::from("Int"),
                            body: Expr::new(ExprKind::IntConst(Symbol::from("0")), pos()),
                            position: pos(),
                        },
                    ],
                    position: pos(),
                },
            ],
        };
        let mut ctx = CompilerContext::new();
        ctx.integers.add("0");
        ctx.integers.add("1");
        ctx.integers.add("2");
        let map = analyze(&mut program, &mut ctx);
        crate::typecheck::check(&program, &map, &mut ctx);
        let asm = generate(&program, &map, &mut ctx);
        assert!(asm.contains("Main_disptable:\t.word Main.foo"));
    }
}
