//! Quill - Bytecode compiler and stack VM for a small integer scripting DSL
//!
//! This crate re-exports all layers of the Quill system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: quill_stdlib     - Standard native functions (echo, min, max, abs)
//! Layer 2: quill_language   - Compiler, diagnostics, bytecode VM
//! Layer 1: quill_syntax     - Syntax tree consumed by the compiler
//! Layer 0: quill_foundation - Core types (Error, Interner, VarId, ProcId)
//! ```

pub use quill_foundation as foundation;
pub use quill_language as language;
pub use quill_stdlib as stdlib;
pub use quill_syntax as syntax;
