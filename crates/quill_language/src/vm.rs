//! Stack-based virtual machine for Quill bytecode.
//!
//! The VM owns the name interner, a table of call targets indexed by
//! [`ProcId`], one evaluation stack, and one flat variable store.
//!
//! # Shared state
//!
//! There are no call frames. Every procedure reads and writes the same
//! variable store, so a `$a = 1` inside a callee is visible to its caller
//! once the call returns. Arguments are the only per-call state and are
//! read with `arg(N)`.
//!
//! # Faults
//!
//! Stack underflow, division by zero and exceeding the call depth limit
//! abort the whole run with an [`Error`]. Calling a name that has neither a
//! native nor a compiled procedure is not a fault: the call yields 0.
//! Variable writes made before a fault are kept.
//!
//! A VM is single-threaded; use one instance per thread.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

mod native;

pub use native::Native;

use std::rc::Rc;

use quill_foundation::{Error, ErrorContext, Interner, ProcId, Result, VarId};
use quill_syntax::Syntax;
use tracing::{debug, trace, warn};

use crate::compiler::{Compiler, Procedure};
use crate::config::VmConfig;
use crate::diagnostic::CompileReport;
use crate::opcode::{Instruction, Opcode};
use native::{div_values, mod_values, shl_values, shr_values, truth};

/// Value returned by [`Vm::execute`] and [`Vm::call`] when the requested
/// procedure does not exist.
pub const UNRESOLVED: i64 = -1;

/// Name of the entry procedure run by [`Vm::execute`].
pub const ENTRY_POINT: &str = "main";

/// A call target.
enum Entry {
    Native(Box<dyn Native>),
    Compiled(Rc<Procedure>),
}

/// Stack-based virtual machine.
pub struct Vm {
    /// Resource limits.
    config: VmConfig,
    /// Variable and procedure names.
    interner: Interner,
    /// Call targets indexed by procedure id.
    entries: Vec<Option<Entry>>,
    /// Evaluation stack.
    stack: Vec<i64>,
    /// Variable store indexed by variable id; unset slots read 0.
    variables: Vec<i64>,
    /// Current compiled-call nesting.
    depth: usize,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    /// Creates a new VM with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    /// Creates a new VM with the given configuration.
    #[must_use]
    pub fn with_config(config: VmConfig) -> Self {
        Self {
            stack: Vec::with_capacity(config.stack_capacity),
            config,
            interner: Interner::new(),
            entries: Vec::new(),
            variables: Vec::new(),
            depth: 0,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Returns the name interner.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Binds a native callback under `name`.
    ///
    /// Register natives before compiling so call sites see them. A later
    /// registration or procedure declaration with the same name replaces
    /// this one.
    pub fn register(&mut self, name: &str, native: impl Native + 'static) -> ProcId {
        let id = self.interner.intern_proc(name);
        debug!(native = name, id = id.index(), "registered native");
        self.install(id, Entry::Native(Box::new(native)));
        id
    }

    /// Compiles `unit` and installs every procedure that compiled cleanly.
    ///
    /// The report is ok iff no diagnostics were produced.
    pub fn compile(&mut self, unit: &[Syntax]) -> CompileReport {
        let compiled = Compiler::new(&mut self.interner).compile(unit);

        let mut report = CompileReport {
            diagnostics: compiled.diagnostics,
            procedures: Vec::with_capacity(compiled.procedures.len()),
        };
        for proc in compiled.procedures {
            report.procedures.push(proc.name.clone());
            self.install(proc.id, Entry::Compiled(Rc::new(proc)));
        }
        report
    }

    /// Returns the compiled procedure named `name`.
    #[must_use]
    pub fn procedure(&self, name: &str) -> Option<&Procedure> {
        let id = self.interner.lookup_proc(name)?;
        match self.entry(id)? {
            Entry::Compiled(proc) => Some(proc.as_ref()),
            Entry::Native(_) => None,
        }
    }

    /// Returns true if `name` has a native or compiled entry.
    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.interner
            .lookup_proc(name)
            .is_some_and(|id| self.entry(id).is_some())
    }

    /// Reads a variable after (or during) a run.
    ///
    /// Returns `None` for names never seen by the compiler; interned but
    /// unset variables read 0.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<i64> {
        let id = self.interner.lookup_var(name)?;
        Some(self.read_var(id))
    }

    /// Runs `main` with no arguments.
    ///
    /// Returns [`UNRESOLVED`] without executing anything if `main` is not
    /// defined.
    pub fn execute(&mut self) -> Result<i64> {
        self.execute_named(ENTRY_POINT, &[])
    }

    /// Runs the procedure named `name` with fresh stack and variables.
    pub fn execute_named(&mut self, name: &str, args: &[i64]) -> Result<i64> {
        self.stack.clear();
        self.variables.clear();
        self.variables.resize(self.interner.var_count(), 0);
        self.depth = 0;

        let Some(id) = self.interner.lookup_proc(name) else {
            warn!(procedure = name, "entry point not defined");
            return Ok(UNRESOLVED);
        };
        self.call(id, args)
    }

    /// Calls the target named `name` without resetting variables.
    ///
    /// Returns [`UNRESOLVED`] if the name was never registered or declared.
    pub fn call_by_name(&mut self, name: &str, args: &[i64]) -> Result<i64> {
        match self.interner.lookup_proc(name) {
            Some(id) => self.call(id, args),
            None => Ok(UNRESOLVED),
        }
    }

    /// Calls target `id` with `args`, sharing the current stack and
    /// variables.
    ///
    /// Returns [`UNRESOLVED`] if `id` has no entry.
    pub fn call(&mut self, id: ProcId, args: &[i64]) -> Result<i64> {
        let proc = match self.entries.get_mut(id.index() as usize) {
            Some(Some(Entry::Native(native))) => return Ok(native.call(args)),
            Some(Some(Entry::Compiled(proc))) => Rc::clone(proc),
            _ => return Ok(UNRESOLVED),
        };
        self.run(&proc, args)
    }

    /// Executes a compiled procedure, leaving the stack as it found it.
    fn run(&mut self, proc: &Procedure, args: &[i64]) -> Result<i64> {
        if self.depth >= self.config.max_call_depth {
            return Err(Error::call_depth_exceeded(self.config.max_call_depth));
        }
        trace!(procedure = %proc.name, ?args, "call");

        self.depth += 1;
        let base = self.stack.len();
        let result = self.run_body(proc, args, base);
        self.stack.truncate(base);
        self.depth -= 1;
        result
    }

    fn run_body(&mut self, proc: &Procedure, args: &[i64], base: usize) -> Result<i64> {
        for (ix, ins) in proc.code.iter().enumerate() {
            self.step(*ins, args)
                .map_err(|err| locate(err, &proc.name, ix))?;
        }

        // Each statement leaves a value; the last one is the result.
        if self.stack.len() <= base {
            return Err(locate(Error::stack_underflow(), &proc.name, proc.code.len()));
        }
        self.pop()
    }

    /// Executes one instruction.
    fn step(&mut self, ins: Instruction, args: &[i64]) -> Result<()> {
        match ins.op {
            Opcode::Push => self.push(ins.operand),
            Opcode::Arg => {
                let value = usize::try_from(ins.operand)
                    .ok()
                    .and_then(|ix| args.get(ix).copied())
                    .unwrap_or(0);
                self.push(value);
            }

            // Variables
            Opcode::Var => {
                let value = self.read_var(ins.var_id());
                self.push(value);
            }
            Opcode::VarSet => {
                let value = self.pop()?;
                self.write_var(ins.var_id(), value);
                self.push(value);
            }

            // Arithmetic
            Opcode::Add => self.binary_op(|a, b| Ok(a.wrapping_add(b)))?,
            Opcode::Sub => self.binary_op(|a, b| Ok(a.wrapping_sub(b)))?,
            Opcode::Mul => self.binary_op(|a, b| Ok(a.wrapping_mul(b)))?,
            Opcode::Div => self.binary_op(div_values)?,
            Opcode::Mod => self.binary_op(mod_values)?,
            Opcode::Neg => self.unary_op(i64::wrapping_neg)?,

            // Bitwise
            Opcode::LShift => self.binary_op(|a, b| Ok(shl_values(a, b)))?,
            Opcode::RShift => self.binary_op(|a, b| Ok(shr_values(a, b)))?,
            Opcode::BitAnd => self.binary_op(|a, b| Ok(a & b))?,
            Opcode::BitOr => self.binary_op(|a, b| Ok(a | b))?,
            Opcode::BitXor => self.binary_op(|a, b| Ok(a ^ b))?,
            Opcode::BitNot => self.unary_op(|a| !a)?,

            // Logic
            Opcode::And => self.binary_op(|a, b| Ok(truth(a != 0 && b != 0)))?,
            Opcode::Or => self.binary_op(|a, b| Ok(truth(a != 0 || b != 0)))?,
            Opcode::Not => self.unary_op(|a| truth(a == 0))?,

            // Comparison
            Opcode::Gt => self.binary_op(|a, b| Ok(truth(a > b)))?,
            Opcode::Ge => self.binary_op(|a, b| Ok(truth(a >= b)))?,
            Opcode::Eq => self.binary_op(|a, b| Ok(truth(a == b)))?,
            Opcode::Ne => self.binary_op(|a, b| Ok(truth(a != b)))?,
            Opcode::Le => self.binary_op(|a, b| Ok(truth(a <= b)))?,
            Opcode::Lt => self.binary_op(|a, b| Ok(truth(a < b)))?,

            Opcode::Call => {
                let arity = ins.call_arity() as usize;
                if self.stack.len() < arity {
                    return Err(Error::stack_underflow());
                }
                // Split keeps the arguments in push (source) order.
                let call_args = self.stack.split_off(self.stack.len() - arity);

                let target = ins.call_target();
                let result = if self.entry(target).is_some() {
                    self.call(target, &call_args)?
                } else {
                    warn!(
                        callee = self.interner.proc_name(target).unwrap_or("?"),
                        "call to undefined procedure yields 0"
                    );
                    0
                };
                self.push(result);
            }
        }
        Ok(())
    }

    fn install(&mut self, id: ProcId, entry: Entry) {
        let ix = id.index() as usize;
        if self.entries.len() <= ix {
            self.entries.resize_with(ix + 1, || None);
        }
        self.entries[ix] = Some(entry);
    }

    fn entry(&self, id: ProcId) -> Option<&Entry> {
        self.entries.get(id.index() as usize)?.as_ref()
    }

    fn read_var(&self, id: VarId) -> i64 {
        self.variables.get(id.index() as usize).copied().unwrap_or(0)
    }

    fn write_var(&mut self, id: VarId, value: i64) {
        let ix = id.index() as usize;
        if self.variables.len() <= ix {
            self.variables.resize(ix + 1, 0);
        }
        self.variables[ix] = value;
    }

    // Stack operations

    fn push(&mut self, value: i64) {
        self.stack.push(value);
    }

    fn pop(&mut self) -> Result<i64> {
        self.stack.pop().ok_or_else(Error::stack_underflow)
    }

    fn binary_op<F>(&mut self, op: F) -> Result<()>
    where
        F: FnOnce(i64, i64) -> Result<i64>,
    {
        let b = self.pop()?;
        let a = self.pop()?;
        let result = op(a, b)?;
        self.push(result);
        Ok(())
    }

    fn unary_op<F>(&mut self, op: F) -> Result<()>
    where
        F: FnOnce(i64) -> i64,
    {
        let a = self.pop()?;
        self.push(op(a));
        Ok(())
    }
}

/// Attaches the faulting location, or records a caller frame if an inner
/// procedure already did.
fn locate(mut err: Error, procedure: &str, instruction: usize) -> Error {
    let context = match err.context.take() {
        Some(ctx) => ctx.with_frame(procedure),
        None => ErrorContext::new()
            .with_procedure(procedure)
            .with_instruction(instruction),
    };
    err.with_context(context)
}
