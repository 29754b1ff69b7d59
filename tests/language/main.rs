//! Integration tests for Layer 2: Language
//!
//! Tests for the compiler, its diagnostics, and the bytecode VM.

mod compiler;
mod vm;
