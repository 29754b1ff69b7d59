//! Bytecode compiler and stack VM for the Quill DSL.
//!
//! This crate provides:
//! - [`Compiler`] - Lowering syntax trees into per-procedure [`Bytecode`]
//! - [`Diagnostic`] - Compile errors, aggregated rather than fatal
//! - [`Vm`] - Stack-based bytecode interpreter with host [`Native`]s
//! - [`VmConfig`] - Resource limits for a VM instance

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod compiler;
pub mod config;
pub mod diagnostic;
pub mod opcode;
pub mod vm;

pub use compiler::{CompiledUnit, Compiler, MAX_NESTING, Procedure};
pub use config::VmConfig;
pub use diagnostic::{CompileReport, Diagnostic, DiagnosticKind};
pub use opcode::{Bytecode, Instruction, Opcode, pack_call, unpack_call};
pub use vm::{ENTRY_POINT, Native, UNRESOLVED, Vm};
