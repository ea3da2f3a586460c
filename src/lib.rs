pub mod codegen;
pub mod context;
pub mod coolast;
pub mod diagnostics;
pub mod interner;
pub mod parser;
pub mod pretty;
pub mod semant;
pub mod symtab;
pub mod typecheck;
