//! Subtyping and least-upper-bound over the class hierarchy.
//!
//! `SELF_TYPE` is treated as equal to the enclosing class for subtyping in
//! both directions, a deliberately permissive simplification of the
//! stricter published Cool semantics; see DESIGN.md for the resolved Open
//! Question. Code generation resolves `new SELF_TYPE` to the true runtime
//! class regardless, so this permissiveness only affects static checking.

use crate::coolast::{Symbol, Type};
use crate::semant::{InheritanceMap, OBJECT};

fn resolve_self(current_class: &Symbol, ty: &Type) -> Type {
    match ty {
        Type::SelfType => Type::Class(current_class.clone()),
        other => other.clone(),
    }
}

/// `child ⊑ parent` under the current class's binding of `SELF_TYPE`.
pub fn is_subtype(map: &InheritanceMap, current_class: &Symbol, child: &Type, parent: &Type) -> bool {
    if matches!(child, Type::NoType) {
        return true;
    }

    let child = resolve_self(current_class, child);
    let parent = resolve_self(current_class, parent);

    if child == parent {
        return true;
    }

    let (Type::Class(child_name), Type::Class(parent_name)) = (&child, &parent) else {
        return false;
    };

    map.chain_from(child_name).any(|ancestor| &ancestor == parent_name)
}

/// The least upper bound of a non-empty list of types: walk up the
/// inheritance chain of the first type until an ancestor dominates every
/// other type in the list; falls back to `Object` (the universal top) if no
/// closer ancestor does.
pub fn lub(map: &InheritanceMap, current_class: &Symbol, types: &[Type]) -> Type {
    assert!(!types.is_empty(), "lub of an empty type list");

    let resolved: Vec<Type> = types.iter().map(|t| resolve_self(current_class, t)).collect();

    if resolved.iter().all(|t| *t == resolved[0]) {
        return types[0].clone();
    }

    let Type::Class(first_name) = &resolved[0] else {
        return Type::class(OBJECT);
    };

    for ancestor in map.chain_from(first_name) {
        let ancestor_ty = Type::Class(ancestor.clone());
        if resolved[1..]
            .iter()
            .all(|t| is_subtype(map, current_class, t, &ancestor_ty))
        {
            return ancestor_ty;
        }
    }

    Type::class(OBJECT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coolast::{Class, Position};
    use crate::context::CompilerContext;

    fn build_map() -> InheritanceMap {
        let mut program = crate::coolast::Program {
            classes: vec![
                Class {
                    name: Symbol::from("A"),
                    parent: Symbol::from(OBJECT),
                    filename: Symbol::from("t.cl"),
                    features: vec![],
                    position: Position::new("t.cl", 1),
                },
                Class {
                    name: Symbol::from("B"),
                    parent: Symbol::from("A"),
                    filename: Symbol::from("t.cl"),
                    features: vec![],
                    position: Position::new("t.cl", 1),
                },
                Class {
                    name: Symbol::from("C"),
                    parent: Symbol::from("A"),
                    filename: Symbol::from("t.cl"),
                    features: vec![],
                    position: Position::new("t.cl", 1),
                },
                Class {
                    name: Symbol::from("Main"),
                    parent: Symbol::from(OBJECT),
                    filename: Symbol::from("t.cl"),
                    features: vec![],
                    position: Position::new("t.cl", 1),
                },
            ],
        };
        let mut ctx = CompilerContext::new();
        crate::semant::analyze(&mut program, &mut ctx)
    }

    #[test]
    fn is_subtype_reflexive_and_transitive() {
        let map = build_map();
        let main = Symbol::from("Main");
        assert!(is_subtype(&map, &main, &Type::class("B"), &Type::class("B")));
        assert!(is_subtype(&map, &main, &Type::class("B"), &Type::class(OBJECT)));
        assert!(!is_subtype(&map, &main, &Type::class("B"), &Type::class("C")));
    }

    #[test]
    fn lub_of_siblings_is_their_common_parent() {
        let map = build_map();
        let main = Symbol::from("Main");
        let result = lub(&map, &main, &[Type::class("B"), Type::class("C")]);
        assert_eq!(result, Type::class("A"));
    }

    #[test]
    fn lub_of_equal_types_is_that_type() {
        let map = build_map();
        let main = Symbol::from("Main");
        let result = lub(&map, &main, &[Type::class("B"), Type::class("B")]);
        assert_eq!(result, Type::class("B"));
    }
}
