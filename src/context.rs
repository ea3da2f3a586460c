//! Explicit, process-lifetime compiler state.
//!
//! Rather than exposing the interner tables as free functions backed by
//! process-global singletons, this crate threads one `CompilerContext`
//! value explicitly through the pipeline, constructed fresh in `main()`.
//! Nothing here is global mutable state.

use crate::diagnostics::Diagnostics;
use crate::interner::Interner;

#[derive(Debug, Default)]
pub struct CompilerContext {
    pub identifiers: Interner,
    pub integers: Interner,
    pub strings: Interner,
    pub diagnostics: Diagnostics,
}

impl CompilerContext {
    pub fn new() -> Self {
        Self::default()
    }
}
