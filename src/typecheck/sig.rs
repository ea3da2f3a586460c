//! Method signature table.
//!
//! Built once from each class's *own* feature list (`direct`), then looked
//! up by walking the inheritance chain so a subclass automatically sees
//! every method it doesn't itself redeclare. Overriding a method with an
//! incompatible signature is reported once, at the overriding declaration,
//! against its nearest ancestor's declaration — not once per descendant
//! that inherits the mismatch.

use std::collections::HashMap;

use crate::context::CompilerContext;
use crate::coolast::{Feature, Position, Symbol};
use crate::semant::InheritanceMap;

use super::error::TypeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub formals: Vec<Symbol>,
    pub return_type: Symbol,
    pub defined_in: Symbol,
    pub position: Position,
}

#[derive(Debug, Default)]
pub struct MethodTable {
    direct: HashMap<(Symbol, Symbol), MethodSignature>,
}

impl MethodTable {
    /// The signature a call to `method` on `class` resolves to: the nearest
    /// declaration found walking from `class` up to `Object`.
    pub fn lookup(&self, map: &InheritanceMap, class: &Symbol, method: &Symbol) -> Option<&MethodSignature> {
        map.chain_from(class)
            .find_map(|ancestor| self.direct.get(&(ancestor, method.clone())))
    }

    /// The signature declared directly on `class`, ignoring inheritance.
    pub fn declared_on(&self, class: &Symbol, method: &Symbol) -> Option<&MethodSignature> {
        self.direct.get(&(class.clone(), method.clone()))
    }
}

pub fn build(map: &InheritanceMap, ctx: &mut CompilerContext) -> MethodTable {
    let mut table = MethodTable::default();

    for class_name in &map.order {
        let Some(class) = map.class(class_name) else { continue };
        for feature in &class.features {
            let Feature::Method {
                name,
                formals,
                return_type,
                position,
                ..
            } = feature
            else {
                continue;
            };

            let signature = MethodSignature {
                formals: formals.iter().map(|f| f.declared_type.clone()).collect(),
                return_type: return_type.clone(),
                defined_in: class_name.clone(),
                position: position.clone(),
            };
            table.direct.insert((class_name.clone(), name.clone()), signature);
        }
    }

    for class_name in &map.order {
        let Some(class) = map.class(class_name) else { continue };
        for feature in &class.features {
            let Feature::Method { name, position, .. } = feature else {
                continue;
            };

            let Some(ancestor_sig) = map
                .chain_from(class_name)
                .skip(1)
                .find_map(|ancestor| table.direct.get(&(ancestor, name.clone())))
            else {
                continue;
            };

            let own_sig = table
                .direct
                .get(&(class_name.clone(), name.clone()))
                .expect("just inserted above");

            if own_sig.formals != ancestor_sig.formals || own_sig.return_type != ancestor_sig.return_type {
                ctx.diagnostics.report(
                    position.file.to_string(),
                    position.line,
                    TypeError::OverrideMismatch {
                        class: class_name.clone(),
                        ancestor: ancestor_sig.defined_in.clone(),
                        method: name.clone(),
                    }
                    .to_string(),
                );
            }
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coolast::{Class, Expr, ExprKind, Formal};
    use crate::semant::OBJECT;

    fn method(name: &str, formals: Vec<(&str, &str)>, return_type: &str) -> Feature {
        Feature::Method {
            name: Symbol::from(name),
            formals: formals
                .into_iter()
                .map(|(n, t)| Formal {
                    name: Symbol::from(n),
                    declared_type: Symbol::from(t),
                    position: Position::new("t.cl", 1),
                })
                .collect(),
            return_type: Symbol::from(return_type),
            body: Expr::new(ExprKind::NoExpr, Position::new("t.cl", 1)),
            position: Position::new("t.cl", 1),
        }
    }

    fn class(name: &str, parent: &str, features: Vec<Feature>) -> Class {
        Class {
            name: Symbol::from(name),
            parent: Symbol::from(parent),
            filename: Symbol::from("t.cl"),
            features,
            position: Position::new("t.cl", 1),
        }
    }

    fn build_map(classes: Vec<Class>) -> InheritanceMap {
        let mut program = crate::coolast::Program { classes };
        let mut ctx = CompilerContext::new();
        crate::semant::analyze(&mut program, &mut ctx)
    }

    #[test]
    fn inherited_method_is_found_through_the_chain() {
        let map = build_map(vec![
            class("A", OBJECT, vec![method("foo", vec![], "Int")]),
            class("Main", "A", vec![]),
        ]);
        let mut ctx = CompilerContext::new();
        let table = build(&map, &mut ctx);
        let sig = table
            .lookup(&map, &Symbol::from("Main"), &Symbol::from("foo"))
            .expect("foo should be visible through inheritance");
        assert_eq!(sig.defined_in, Symbol::from("A"));
    }

    #[test]
    fn incompatible_override_is_reported() {
        let map = build_map(vec![
            class("A", OBJECT, vec![method("foo", vec![("x", "Int")], "Int")]),
            class("Main", "A", vec![method("foo", vec![("x", "String")], "Int")]),
        ]);
        let mut ctx = CompilerContext::new();
        build(&map, &mut ctx);
        assert!(ctx.diagnostics.has_errors());
    }

    #[test]
    fn compatible_override_is_accepted() {
        let map = build_map(vec![
            class("A", OBJECT, vec![method("foo", vec![("x", "Int")], "Int")]),
            class("Main", "A", vec![method("foo", vec![("x", "Int")], "Int")]),
        ]);
        let mut ctx = CompilerContext::new();
        build(&map, &mut ctx);
        assert!(!ctx.diagnostics.has_errors());
    }
}
