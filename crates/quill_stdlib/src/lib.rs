//! Standard native functions for the Quill DSL.
//!
//! This crate provides ready-made [`Native`](quill_language::Native)
//! callbacks organized by category:
//! - Output (`echo`), captured in an [`EchoLog`]
//! - Integer math (`min`, `max`, `abs`)
//!
//! [`register_stdlib`] binds all of them on a VM.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod echo;
mod math;

pub use echo::{EchoLog, echo};
pub use math::{abs, max, min};

use quill_language::Vm;
use tracing::debug;

/// Registers every standard native on `vm`.
///
/// Call before [`Vm::compile`] so declarations with the same name replace
/// the standard versions. Returns the log that `echo` writes into.
pub fn register_stdlib(vm: &mut Vm) -> EchoLog {
    let log = EchoLog::new();
    vm.register("echo", echo(log.clone()));
    vm.register("min", min);
    vm.register("max", max);
    vm.register("abs", abs);
    debug!("registered standard natives");
    log
}
