//! Semantic analyzer.
//!
//! Installs the built-in classes, builds the parent map and validates the
//! class hierarchy: no redefinition or illegal inheritance of basic classes,
//! no duplicate class names, every parent resolves, the hierarchy is
//! acyclic, and a `Main` class exists. Errors accumulate in
//! `ctx.diagnostics`; the driver halts before type checking if this phase
//! reported any.

mod builtins;
mod error;

pub use builtins::install_builtins;
pub use error::SemanticError;

use std::collections::{HashMap, HashSet};

use crate::context::CompilerContext;
use crate::coolast::{Class, Position, Program, Symbol};

pub const OBJECT: &str = "Object";
pub const IO: &str = "IO";
pub const INT: &str = "Int";
pub const BOOL: &str = "Bool";
pub const STRING: &str = "String";
pub const SELF_TYPE: &str = "SELF_TYPE";
pub const SELF: &str = "self";
/// Sentinel parent of `Object`, never a real class.
pub const NO_CLASS: &str = "_NoClass";
/// Sentinel declared-type marking an attribute whose storage is controlled
/// by the runtime rather than the initializer's codegen.
pub const PRIM_SLOT: &str = "prim_slot";

fn is_basic_class_name(name: &str) -> bool {
    matches!(name, OBJECT | IO | INT | BOOL | STRING)
}

fn is_illegal_parent(name: &str) -> bool {
    matches!(name, INT | BOOL | STRING | SELF_TYPE)
}

/// The class hierarchy, built once during semantic analysis and read by
/// both the type checker and the code generator.
#[derive(Debug, Clone, Default)]
pub struct InheritanceMap {
    parent_of: HashMap<Symbol, Symbol>,
    classes: HashMap<Symbol, Class>,
    /// Classes in the order they were declared (built-ins first), used by
    /// the code generator for stable class-tag assignment.
    pub order: Vec<Symbol>,
}

impl InheritanceMap {
    pub fn parent_of(&self, class: &Symbol) -> Option<&Symbol> {
        self.parent_of.get(class)
    }

    pub fn class(&self, name: &Symbol) -> Option<&Class> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &Symbol) -> bool {
        self.classes.contains_key(name)
    }

    /// Walk from `class` up to (and including) `Object`, inclusive of the
    /// starting class, in child-to-ancestor order.
    pub fn chain_from<'a>(&'a self, class: &'a Symbol) -> Chain<'a> {
        Chain {
            map: self,
            next: Some(class.clone()),
        }
    }
}

pub struct Chain<'a> {
    map: &'a InheritanceMap,
    next: Option<Symbol>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        let current = self.next.take()?;
        if current.as_str() == NO_CLASS {
            return None;
        }
        self.next = self.map.parent_of(&current).cloned();
        Some(current)
    }
}

/// Install built-ins, build the parent map, and validate the hierarchy.
/// Returns the inheritance map unconditionally (so downstream tooling such
/// as the pretty printer can still inspect a partially-valid program); the
/// driver must check `ctx.diagnostics.has_errors()` before proceeding to
/// type checking.
pub fn analyze(program: &mut Program, ctx: &mut CompilerContext) -> InheritanceMap {
    install_builtins(program, ctx);

    let mut map = InheritanceMap::default();
    let mut seen_names: HashSet<Symbol> = HashSet::new();
    let mut has_main = false;

    for class in &program.classes {
        let name = class.name.clone();
        let position = class.position.clone();

        if name.as_str() == "Main" {
            has_main = true;
        }

        if is_basic_class_name(name.as_str()) && !is_builtin_definition(class) {
            report(ctx, &position, SemanticError::BasicRedefined(name.clone()));
            continue;
        }

        if is_illegal_parent(class.parent.as_str()) {
            report(
                ctx,
                &position,
                SemanticError::IllegalInheritance(name.clone(), class.parent.clone()),
            );
            continue;
        }

        if seen_names.contains(&name) {
            report(ctx, &position, SemanticError::DuplicateClass(name.clone()));
            continue;
        }

        seen_names.insert(name.clone());
        map.parent_of.insert(name.clone(), class.parent.clone());
        map.classes.insert(name.clone(), class.clone());
        map.order.push(name);
    }

    for class in &program.classes {
        let name = &class.name;
        if !map.classes.contains_key(name) {
            continue;
        }
        let parent = &class.parent;
        if parent.as_str() != NO_CLASS && !map.classes.contains_key(parent) {
            report(
                ctx,
                &class.position,
                SemanticError::UnknownParent(name.clone(), parent.clone()),
            );
        }
    }

    if !has_main {
        report(
            ctx,
            &Position::new(program_filename(program), 0),
            SemanticError::MainMissing,
        );
    }

    check_cycles(&map, ctx);

    map
}

fn is_builtin_definition(class: &Class) -> bool {
    class.filename.as_str() == builtins::BUILTIN_FILENAME
}

fn program_filename(program: &Program) -> String {
    program
        .classes
        .iter()
        .find(|c| !is_builtin_definition(c))
        .map(|c| c.filename.to_string())
        .unwrap_or_else(|| "<program>".to_string())
}

fn check_cycles(map: &InheritanceMap, ctx: &mut CompilerContext) {
    let mut visited: HashSet<Symbol> = HashSet::new();
    let mut processed: HashSet<Symbol> = HashSet::new();

    for name in &map.order {
        if processed.contains(name) {
            continue;
        }
        visit_for_cycle(map, name, &mut visited, &mut processed, ctx);
    }
}

fn visit_for_cycle(
    map: &InheritanceMap,
    node: &Symbol,
    visited: &mut HashSet<Symbol>,
    processed: &mut HashSet<Symbol>,
    ctx: &mut CompilerContext,
) -> bool {
    if node.as_str() == OBJECT || node.as_str() == NO_CLASS {
        return true;
    }

    if visited.contains(node) && !processed.contains(node) {
        let position = map
            .class(node)
            .map(|c| c.position.clone())
            .unwrap_or_else(|| Position::new("<program>", 0));
        report(ctx, &position, SemanticError::InheritanceCycle(node.clone()));
        return false;
    }

    if processed.contains(node) {
        return true;
    }

    visited.insert(node.clone());

    let parent = match map.parent_of(node) {
        Some(parent) => parent.clone(),
        None => return true,
    };

    let ok = visit_for_cycle(map, &parent, visited, processed, ctx);
    processed.insert(node.clone());
    ok
}

fn report(ctx: &mut CompilerContext, position: &Position, error: SemanticError) {
    ctx.diagnostics
        .report(position.file.to_string(), position.line, error.to_string());
}
