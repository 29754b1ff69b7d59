//! Compile diagnostics.
//!
//! The compiler never stops at the first problem. Each one becomes a
//! [`Diagnostic`] tied to the offending construct and its source line, and
//! the whole batch is returned in a [`CompileReport`].

use std::fmt;

use thiserror::Error;

/// What went wrong while lowering a node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// `=` whose left operand is not a bare identifier.
    #[error("operator = illegal, left operand must be a var")]
    BadAssignTarget,

    /// An operator applied to the wrong number of operands.
    #[error("operator '{op}' arg num {count} illegal")]
    OperatorArity {
        /// The operator token.
        op: String,
        /// The number of operands found.
        count: usize,
    },

    /// An operator token with no instruction.
    #[error("operator '{0}' illegal")]
    UnknownOperator(String),

    /// A numeric literal that is not an `i64` integer.
    #[error("const must be integer")]
    NonIntegerConst,

    /// `arg(N)` whose index is not an integer literal.
    #[error("arg index must be an integer literal")]
    BadArgIndex,

    /// A call with more arguments than a call operand can encode.
    #[error("too many arguments")]
    TooManyArguments,

    /// Expressions nested deeper than the compiler will recurse.
    #[error("expression nested too deeply (limit {0})")]
    NestingTooDeep(usize),

    /// A construct with no bytecode form, such as `if(c){...}`.
    #[error("construct is not supported by the bytecode compiler")]
    Unsupported,
}

/// One compile error with the construct that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: DiagnosticKind,
    /// The offending construct rendered as script text.
    pub code: String,
    /// 1-based source line (0 when unknown).
    pub line: u32,
}

impl Diagnostic {
    /// Creates a diagnostic.
    #[must_use]
    pub fn new(kind: DiagnosticKind, code: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            code: code.into(),
            line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, code:{}, line:{}", self.kind, self.code, self.line)
    }
}

/// The outcome of one compile call.
///
/// Compilation succeeded iff there are no diagnostics. Procedures that
/// compiled cleanly are installed either way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileReport {
    /// Every problem found, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
    /// Names of the procedures that were installed.
    pub procedures: Vec<String>,
}

impl CompileReport {
    /// Returns true if compilation produced no diagnostics.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Renders every diagnostic as one line of text.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }
}
