//! Object layout: class tags, attribute offsets, and dispatch tables.
//!
//! Built once from the inheritance map before any code is emitted, so both
//! the prototype-object pass and every dispatch-emitting expression can
//! look offsets up rather than recomputing them.

use std::collections::HashMap;

use crate::coolast::{Feature, Symbol};
use crate::semant::{InheritanceMap, BOOL, INT, NO_CLASS, STRING};

pub const HEADER_WORDS: i32 = 3;
pub const STRING_TAG: i32 = 5;
pub const INT_TAG: i32 = 6;
pub const BOOL_TAG: i32 = 7;

#[derive(Debug, Default)]
pub struct Layout {
    pub tags: HashMap<Symbol, i32>,
    /// Per class, its dispatch table as `(method, defining_class)` pairs in
    /// slot order.
    pub dispatch: HashMap<Symbol, Vec<(Symbol, Symbol)>>,
    /// `(class, method) -> slot index` in that class's own dispatch table.
    pub method_offset: HashMap<(Symbol, Symbol), usize>,
    /// Per class, its attributes as `(name, declared_type)` in ancestor-first
    /// order.
    pub attrs: HashMap<Symbol, Vec<(Symbol, Symbol)>>,
    /// `(class, attribute) -> word offset from the object base` (includes
    /// the 3-word header).
    pub attr_offset: HashMap<(Symbol, Symbol), i32>,
}

impl Layout {
    pub fn tag_of(&self, class: &Symbol) -> i32 {
        self.tags.get(class).copied().unwrap_or(0)
    }

    pub fn attr_count(&self, class: &Symbol) -> usize {
        self.attrs.get(class).map(Vec::len).unwrap_or(0)
    }

    pub fn dispatch_table_len(&self, class: &Symbol) -> usize {
        self.dispatch.get(class).map(Vec::len).unwrap_or(0)
    }

    pub fn method_slot(&self, class: &Symbol, method: &Symbol) -> Option<usize> {
        self.method_offset.get(&(class.clone(), method.clone())).copied()
    }

    pub fn attribute_word_offset(&self, class: &Symbol, attribute: &Symbol) -> Option<i32> {
        self.attr_offset.get(&(class.clone(), attribute.clone())).copied()
    }
}

fn root_to_leaf(map: &InheritanceMap, class: &Symbol) -> Vec<Symbol> {
    let mut chain: Vec<Symbol> = map.chain_from(class).collect();
    chain.reverse();
    chain
}

pub fn build(map: &InheritanceMap) -> Layout {
    let mut layout = Layout::default();

    let mut next_tag = 1;
    for name in &map.order {
        let tag = match name.as_str() {
            STRING => STRING_TAG,
            INT => INT_TAG,
            BOOL => BOOL_TAG,
            _ => {
                while next_tag == STRING_TAG || next_tag == INT_TAG || next_tag == BOOL_TAG {
                    next_tag += 1;
                }
                let tag = next_tag;
                next_tag += 1;
                tag
            }
        };
        layout.tags.insert(name.clone(), tag);
    }

    for class_name in &map.order {
        if class_name.as_str() == NO_CLASS {
            continue;
        }

        let mut slots: Vec<(Symbol, Symbol)> = Vec::new();
        let mut slot_of: HashMap<Symbol, usize> = HashMap::new();
        let mut attrs: Vec<(Symbol, Symbol)> = Vec::new();

        for ancestor in root_to_leaf(map, class_name) {
            let Some(ancestor_class) = map.class(&ancestor) else { continue };
            for feature in &ancestor_class.features {
                match feature {
                    Feature::Method { name, .. } => {
                        if let Some(&idx) = slot_of.get(name) {
                            slots[idx].1 = ancestor.clone();
                        } else {
                            slot_of.insert(name.clone(), slots.len());
                            slots.push((name.clone(), ancestor.clone()));
                        }
                    }
                    Feature::Attribute {
                        name, declared_type, ..
                    } => {
                        attrs.push((name.clone(), declared_type.clone()));
                    }
                }
            }
        }

        for (idx, (method, _)) in slots.iter().enumerate() {
            layout
                .method_offset
                .insert((class_name.clone(), method.clone()), idx);
        }
        for (idx, (attr, _)) in attrs.iter().enumerate() {
            layout
                .attr_offset
                .insert((class_name.clone(), attr.clone()), HEADER_WORDS + idx as i32);
        }

        layout.dispatch.insert(class_name.clone(), slots);
        layout.attrs.insert(class_name.clone(), attrs);
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilerContext;
    use crate::coolast::{Class, Expr, ExprKind, Position};
    use crate::semant::OBJECT;

    fn method(name: &str) -> Feature {
        Feature::Method {
            name: Symbol::from(name),
            formals: vec![],
            return_type: Symbol::from(OBJECT),
            body: Expr::new(ExprKind::NoExpr, Position::new("t.cl", 1)),
            position: Position::new("t.cl", 1),
        }
    }

    fn attribute(name: &str, ty: &str) -> Feature {
        Feature::Attribute {
            name: Symbol::from(name),
            declared_type: Symbol::from(ty),
            init: Expr::new(ExprKind::NoExpr, Position::new("t.cl", 1)),
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

    #[test]
    fn basic_tags_are_fixed() {
        let mut program = crate::coolast::Program {
            classes: vec![class("Main", OBJECT, vec![method("main")])],
        };
        let mut ctx = CompilerContext::new();
        let map = crate::semant::analyze(&mut program, &mut ctx);
        let layout = build(&map);
        assert_eq!(layout.tag_of(&Symbol::from(STRING)), STRING_TAG);
        assert_eq!(layout.tag_of(&Symbol::from(INT)), INT_TAG);
        assert_eq!(layout.tag_of(&Symbol::from(BOOL)), BOOL_TAG);
    }

    #[test]
    fn override_keeps_the_slot_but_updates_the_defining_class() {
        let mut program = crate::coolast::Program {
            classes: vec![
                class("A", OBJECT, vec![method("foo")]),
                class("Main", "A", vec![method("foo"), method("main")]),
            ],
        };
        let mut ctx = CompilerContext::new();
        let map = crate::semant::analyze(&mut program, &mut ctx);
        let layout = build(&map);
        let main = Symbol::from("Main");
        let foo_slot = layout.method_slot(&main, &Symbol::from("foo")).unwrap();
        assert_eq!(foo_slot, 0);
        let table = &layout.dispatch[&main];
        assert_eq!(table[0].1, main);
    }

    #[test]
    fn attributes_are_ancestor_first() {
        let mut program = crate::coolast::Program {
            classes: vec![
                class("A", OBJECT, vec![attribute("x", "Int")]),
                class("Main", "A", vec![attribute("y", "Int"), method("main")]),
            ],
        };
        let mut ctx = CompilerContext::new();
        let map = crate::semant::analyze(&mut program, &mut ctx);
        let layout = build(&map);
        let main = Symbol::from("Main");
        assert_eq!(
            layout.attribute_word_offset(&main, &Symbol::from("x")),
            Some(HEADER_WORDS)
        );
        assert_eq!(
            layout.attribute_word_offset(&main, &Symbol::from("y")),
            Some(HEADER_WORDS + 1)
        );
    }
}
