//! Core error types and symbol interning for Quill.
//!
//! This crate provides:
//! - [`Error`] - Runtime faults raised by the VM, with optional context
//! - [`Interner`] - Dense id assignment for variable and procedure names
//! - [`VarId`] / [`ProcId`] - The two independent id namespaces

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod intern;

pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use intern::{Interner, ProcId, VarId};
