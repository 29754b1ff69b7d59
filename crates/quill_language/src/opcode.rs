//! Bytecode instruction set for the Quill VM.
//!
//! The VM is stack-based. Most operations consume operands from the stack
//! and push results back. Every instruction is an opcode plus one signed
//! 64-bit operand; `CALL` packs its target id into the upper 32 bits and
//! its argument count into the lower 32 bits.

#![allow(clippy::doc_markdown)]

use std::fmt;

use quill_foundation::{ProcId, VarId};

/// Operation tag of an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    // === Stack Operations ===
    /// Push the operand: `[] -> [imm]`
    Push,
    /// Push the `operand`-th call argument, 0 if out of range: `[] -> [arg]`
    Arg,

    // === Variables ===
    /// Push variable `operand`, 0 if unset: `[] -> [v]`
    Var,
    /// Store into variable `operand` and keep the value: `[v] -> [v]`
    VarSet,

    // === Arithmetic ===
    /// Add: `[a, b] -> [a + b]`
    Add,
    /// Subtract: `[a, b] -> [a - b]`
    Sub,
    /// Multiply: `[a, b] -> [a * b]`
    Mul,
    /// Divide, truncating toward zero: `[a, b] -> [a / b]`
    Div,
    /// Remainder: `[a, b] -> [a % b]`
    Mod,
    /// Negate: `[a] -> [-a]`
    Neg,

    // === Bitwise ===
    /// Shift left: `[a, b] -> [a << b]`
    LShift,
    /// Arithmetic shift right: `[a, b] -> [a >> b]`
    RShift,
    /// Bitwise and: `[a, b] -> [a & b]`
    BitAnd,
    /// Bitwise or: `[a, b] -> [a | b]`
    BitOr,
    /// Bitwise xor: `[a, b] -> [a ^ b]`
    BitXor,
    /// Bitwise complement: `[a] -> [!a]`
    BitNot,

    // === Logic ===
    /// Logical and, both operands already evaluated: `[a, b] -> [0|1]`
    And,
    /// Logical or, both operands already evaluated: `[a, b] -> [0|1]`
    Or,
    /// Logical not: `[a] -> [0|1]`
    Not,

    // === Comparison ===
    /// Greater than: `[a, b] -> [a > b]`
    Gt,
    /// Greater than or equal: `[a, b] -> [a >= b]`
    Ge,
    /// Equal: `[a, b] -> [a == b]`
    Eq,
    /// Not equal: `[a, b] -> [a != b]`
    Ne,
    /// Less than or equal: `[a, b] -> [a <= b]`
    Le,
    /// Less than: `[a, b] -> [a < b]`
    Lt,

    // === Calls ===
    /// Call target `high32` with `low32` arguments: `[a1..an] -> [result]`
    Call,
}

impl Opcode {
    /// The mnemonic used in listings.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Push => "PUSH",
            Self::Arg => "ARG",
            Self::Var => "VAR",
            Self::VarSet => "VARSET",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Neg => "NEG",
            Self::LShift => "LSHIFT",
            Self::RShift => "RSHIFT",
            Self::BitAnd => "BITAND",
            Self::BitOr => "BITOR",
            Self::BitXor => "BITXOR",
            Self::BitNot => "BITNOT",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Le => "LE",
            Self::Lt => "LT",
            Self::Call => "CALL",
        }
    }

    /// Returns true if the operand carries meaning for this opcode.
    #[must_use]
    pub const fn has_operand(self) -> bool {
        matches!(
            self,
            Self::Push | Self::Arg | Self::Var | Self::VarSet | Self::Call
        )
    }
}

/// Packs a call target and argument count into one operand.
#[must_use]
pub const fn pack_call(target: u32, arity: u32) -> i64 {
    (((target as u64) << 32) | arity as u64) as i64
}

/// Splits a call operand into `(target, arity)`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn unpack_call(operand: i64) -> (u32, u32) {
    let bits = operand as u64;
    ((bits >> 32) as u32, bits as u32)
}

/// A single bytecode instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// The operation.
    pub op: Opcode,
    /// The operand; unused opcodes carry 0.
    pub operand: i64,
}

impl Instruction {
    /// Creates an instruction without an operand.
    #[must_use]
    pub const fn new(op: Opcode) -> Self {
        Self { op, operand: 0 }
    }

    /// Creates an instruction with an operand.
    #[must_use]
    pub const fn with_operand(op: Opcode, operand: i64) -> Self {
        Self { op, operand }
    }

    /// `PUSH value`
    #[must_use]
    pub const fn push(value: i64) -> Self {
        Self::with_operand(Opcode::Push, value)
    }

    /// `ARG index`
    #[must_use]
    pub const fn arg(index: i64) -> Self {
        Self::with_operand(Opcode::Arg, index)
    }

    /// `VAR id`
    #[must_use]
    pub const fn var(id: VarId) -> Self {
        Self::with_operand(Opcode::Var, id.index() as i64)
    }

    /// `VARSET id`
    #[must_use]
    pub const fn var_set(id: VarId) -> Self {
        Self::with_operand(Opcode::VarSet, id.index() as i64)
    }

    /// `CALL target:arity`
    #[must_use]
    pub const fn call(target: ProcId, arity: u32) -> Self {
        Self::with_operand(Opcode::Call, pack_call(target.index(), arity))
    }

    /// The variable id of a `VAR`/`VARSET` operand.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn var_id(&self) -> VarId {
        VarId::from_index(self.operand as u32)
    }

    /// The target of a `CALL` operand (upper 32 bits).
    #[must_use]
    pub const fn call_target(&self) -> ProcId {
        ProcId::from_index(unpack_call(self.operand).0)
    }

    /// The argument count of a `CALL` operand (lower 32 bits).
    #[must_use]
    pub const fn call_arity(&self) -> u32 {
        unpack_call(self.operand).1
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.op.mnemonic();
        match self.op {
            Opcode::Call => write!(
                f,
                "{name} {}:{}",
                self.call_target().index(),
                self.call_arity()
            ),
            op if op.has_operand() => write!(f, "{name} {}", self.operand),
            _ => f.write_str(name),
        }
    }
}

/// A sequence of bytecode instructions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bytecode {
    /// The instructions.
    pub ops: Vec<Instruction>,
}

impl Bytecode {
    /// Creates an empty bytecode sequence.
    #[must_use]
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Adds an instruction and returns its index.
    pub fn emit(&mut self, ins: Instruction) -> usize {
        let idx = self.ops.len();
        self.ops.push(ins);
        idx
    }

    /// Adds an operand-free instruction and returns its index.
    pub fn emit_op(&mut self, op: Opcode) -> usize {
        self.emit(Instruction::new(op))
    }

    /// Returns the current instruction count (next instruction index).
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if there are no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Iterates over the instructions.
    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.ops.iter()
    }
}

impl<'a> IntoIterator for &'a Bytecode {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}
