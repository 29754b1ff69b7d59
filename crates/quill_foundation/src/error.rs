//! Error types for the Quill system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Only run-time faults live here; compile problems are reported as
//! diagnostics by the compiler and never raised as an [`Error`].

use std::fmt;

use thiserror::Error;

/// The main error type for Quill operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a stack underflow error.
    #[must_use]
    pub fn stack_underflow() -> Self {
        Self::new(ErrorKind::StackUnderflow)
    }

    /// Creates a division by zero error.
    #[must_use]
    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero)
    }

    /// Creates a call depth exceeded error.
    #[must_use]
    pub fn call_depth_exceeded(limit: usize) -> Self {
        Self::new(ErrorKind::CallDepthExceeded { limit })
    }

    /// Returns true if this error already carries a context.
    #[must_use]
    pub const fn has_context(&self) -> bool {
        self.context.is_some()
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An instruction popped from an empty evaluation stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// Integer division or modulo by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Re-entrant calls nested deeper than the configured limit.
    #[error("call depth exceeded (limit {limit})")]
    CallDepthExceeded {
        /// The configured limit.
        limit: usize,
    },
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Name of the procedure that was executing.
    pub procedure: Option<String>,
    /// Index of the faulting instruction within that procedure.
    pub instruction: Option<usize>,
    /// Enclosing procedures, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the faulting procedure.
    #[must_use]
    pub fn with_procedure(mut self, procedure: impl Into<String>) -> Self {
        self.procedure = Some(procedure.into());
        self
    }

    /// Sets the faulting instruction index.
    #[must_use]
    pub fn with_instruction(mut self, instruction: usize) -> Self {
        self.instruction = Some(instruction);
        self
    }

    /// Adds a stack frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(procedure) = &self.procedure {
            write!(f, "in {procedure}")?;
            if let Some(ix) = self.instruction {
                write!(f, " at instruction {ix}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  called from {frame}")?;
            }
        }
        Ok(())
    }
}

/// Result type alias using Quill's Error.
pub type Result<T> = std::result::Result<T, Error>;
