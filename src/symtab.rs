//! Generic scoped symbol table.
//!
//! A stack of mappings used for scoped lookup during type checking and code
//! generation: `probe` searches only the innermost scope, `lookup` searches
//! outward to the root.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct ScopedTable<K, V> {
    frames: Vec<HashMap<K, V>>,
}

impl<K, V> Default for ScopedTable<K, V> {
    fn default() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }
}

impl<K, V> ScopedTable<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Pop the innermost scope. Calling this on an empty stack is a
    /// programming error: every `enter_scope` must be paired with exactly
    /// one `exit_scope`.
    pub fn exit_scope(&mut self) {
        self.frames
            .pop()
            .expect("exit_scope called with no open scope");
        assert!(
            !self.frames.is_empty(),
            "exit_scope popped the root scope"
        );
    }

    pub fn add(&mut self, key: K, value: V) {
        self.frames
            .last_mut()
            .expect("scope stack is never empty")
            .insert(key, value);
    }

    /// Look up `key` in the innermost scope only.
    pub fn probe(&self, key: &K) -> Option<V> {
        self.frames.last().and_then(|frame| frame.get(key).cloned())
    }

    /// Look up `key` from the innermost scope outward to the root.
    pub fn lookup(&self, key: &K) -> Option<V> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(key).cloned())
    }

    pub fn size_of_top_frame(&self) -> usize {
        self.frames.last().map(HashMap::len).unwrap_or(0)
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_sees_only_current_frame() {
        let mut table: ScopedTable<String, i32> = ScopedTable::new();
        table.add("x".to_string(), 1);
        table.enter_scope();
        assert_eq!(table.probe(&"x".to_string()), None);
        assert_eq!(table.lookup(&"x".to_string()), Some(1));
    }

    #[test]
    fn lookup_prefers_innermost_binding() {
        let mut table: ScopedTable<String, i32> = ScopedTable::new();
        table.add("x".to_string(), 1);
        table.enter_scope();
        table.add("x".to_string(), 2);
        assert_eq!(table.lookup(&"x".to_string()), Some(2));
        table.exit_scope();
        assert_eq!(table.lookup(&"x".to_string()), Some(1));
    }

    #[test]
    #[should_panic]
    fn exit_scope_on_root_panics() {
        let mut table: ScopedTable<String, i32> = ScopedTable::new();
        table.exit_scope();
    }

    #[test]
    fn size_of_top_frame_counts_current_scope() {
        let mut table: ScopedTable<String, i32> = ScopedTable::new();
        table.add("a".to_string(), 1);
        table.add("b".to_string(), 2);
        assert_eq!(table.size_of_top_frame(), 2);
    }
}
