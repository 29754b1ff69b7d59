//! Compiler for lowering syntax trees into bytecode.
//!
//! Each top-level `name(params){ body }` declaration becomes one
//! [`Procedure`]: a flat instruction list with every body statement lowered
//! in order. Names are interned as they are first seen, variables and
//! procedures in separate namespaces, so the VM only ever indexes tables.
//!
//! Errors never abort compilation. A bad node is reported, emits nothing,
//! and its siblings are still compiled so one pass surfaces every problem.

#![allow(clippy::module_name_repetitions)]

use quill_foundation::{Interner, ProcId};
use quill_syntax::{CallNode, IdKind, Syntax, ValueNode};
use tracing::{debug, warn};

use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::opcode::{Bytecode, Instruction, Opcode};

/// Deepest expression nesting the compiler will recurse into.
pub const MAX_NESTING: usize = 512;

/// Levels of a construct quoted in a diagnostic before it is elided.
const DIAGNOSTIC_DEPTH: usize = 8;

/// Head identifier of the `function(name){ ... }` declaration form.
const FUNCTION_KEYWORD: &str = "function";

/// A compiled procedure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Procedure {
    /// Declared name.
    pub name: String,
    /// Interned id in the procedure namespace.
    pub id: ProcId,
    /// Formal parameter names from the declaration (arguments are read
    /// with `arg(N)`).
    pub params: Vec<String>,
    /// Procedure bytecode.
    pub code: Bytecode,
}

impl Procedure {
    /// Renders a listing with variable and call targets resolved to names.
    #[must_use]
    pub fn disassemble(&self, interner: &Interner) -> String {
        let mut out = format!("{}({}):\n", self.name, self.params.join(", "));
        for (ix, ins) in self.code.iter().enumerate() {
            out.push_str(&format!("  {ix:04} {ins}"));
            let name = match ins.op {
                Opcode::Var | Opcode::VarSet => interner.var_name(ins.var_id()),
                Opcode::Call => interner.proc_name(ins.call_target()),
                _ => None,
            };
            if let Some(name) = name {
                out.push_str(" ; ");
                out.push_str(name);
            }
            out.push('\n');
        }
        out
    }
}

/// Output of compiling a syntax unit.
#[derive(Clone, Debug, Default)]
pub struct CompiledUnit {
    /// Procedures that compiled without diagnostics, in source order.
    pub procedures: Vec<Procedure>,
    /// Every problem found, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compiler state for lowering syntax trees.
pub struct Compiler<'a> {
    /// Name interner shared with the VM.
    interner: &'a mut Interner,
    /// Diagnostics collected so far.
    diagnostics: Vec<Diagnostic>,
    /// Current expression nesting.
    depth: usize,
}

impl<'a> Compiler<'a> {
    /// Creates a compiler that interns into `interner`.
    #[must_use]
    pub fn new(interner: &'a mut Interner) -> Self {
        Self {
            interner,
            diagnostics: Vec::new(),
            depth: 0,
        }
    }

    /// Compiles every procedure declaration in `unit`.
    ///
    /// Top-level blocks are searched for declarations too; any other
    /// top-level node is ignored.
    pub fn compile(mut self, unit: &[Syntax]) -> CompiledUnit {
        let mut procedures = Vec::new();
        self.compile_top_level(unit, &mut procedures);
        CompiledUnit {
            procedures,
            diagnostics: self.diagnostics,
        }
    }

    /// Walks top-level nodes in source order, descending into blocks with
    /// an explicit stack.
    fn compile_top_level(&mut self, unit: &[Syntax], procedures: &mut Vec<Procedure>) {
        let mut pending = vec![unit.iter()];
        while let Some(level) = pending.last_mut() {
            let Some(node) = level.next() else {
                pending.pop();
                continue;
            };
            match node {
                Syntax::Call(call) if call.is_high_order() => {
                    if let Some(proc) = self.compile_procedure(call) {
                        procedures.push(proc);
                    }
                }
                Syntax::Block(block) => pending.push(block.statements.iter()),
                other => {
                    warn!(
                        line = other.line(),
                        code = %other.elided(DIAGNOSTIC_DEPTH),
                        "ignoring top-level node that is not a declaration"
                    );
                }
            }
        }
    }

    /// Compiles one `name(params){ body }` declaration.
    ///
    /// Returns `None` if the declaration produced any diagnostic.
    pub fn compile_procedure(&mut self, decl: &CallNode) -> Option<Procedure> {
        let errors_before = self.diagnostics.len();

        let Some((name, params)) = decl.lower_order().and_then(declared_name) else {
            self.report(DiagnosticKind::Unsupported, &quote(decl), decl.line);
            return None;
        };
        let id = self.interner.intern_proc(&name);

        let mut code = Bytecode::new();
        for statement in &decl.params {
            self.compile_node(statement, &mut code);
        }

        if self.diagnostics.len() > errors_before {
            debug!(procedure = %name, "procedure not installed due to errors");
            return None;
        }

        debug!(procedure = %name, id = id.index(), instructions = code.len(), "compiled procedure");
        Some(Procedure {
            name,
            id,
            params,
            code,
        })
    }

    /// Compiles a single node.
    fn compile_node(&mut self, node: &Syntax, code: &mut Bytecode) {
        if self.depth >= MAX_NESTING {
            self.report(
                DiagnosticKind::NestingTooDeep(MAX_NESTING),
                &node.elided(DIAGNOSTIC_DEPTH).to_string(),
                node.line(),
            );
            return;
        }
        self.depth += 1;
        match node {
            Syntax::Value(value) => self.compile_value(value, code),
            Syntax::Call(call) => self.compile_call(call, code),
            Syntax::Block(block) => {
                for statement in &block.statements {
                    self.compile_node(statement, code);
                }
            }
        }
        self.depth -= 1;
    }

    /// Compiles a leaf: integer literal or variable read.
    fn compile_value(&mut self, value: &ValueNode, code: &mut Bytecode) {
        if value.kind == IdKind::Number {
            match parse_integer(&value.id) {
                Some(n) => {
                    code.emit(Instruction::push(n));
                }
                None => self.report(DiagnosticKind::NonIntegerConst, &value.to_string(), value.line),
            }
            return;
        }

        let id = self.interner.intern_var(&value.id);
        code.emit(Instruction::var(id));
    }

    /// Compiles a call node (special form, operator, or invocation).
    fn compile_call(&mut self, call: &CallNode, code: &mut Bytecode) {
        // No branch instructions exist, so `if(c){...}` and friends have
        // no lowering.
        if call.is_high_order() {
            self.report(DiagnosticKind::Unsupported, &quote(call), call.line);
            return;
        }

        if call.has_statements() {
            for statement in &call.params {
                self.compile_node(statement, code);
            }
            return;
        }

        let Some(name) = call.id() else {
            // Parenthesized group
            match call.param(0) {
                Some(inner) => self.compile_node(inner, code),
                None => self.report(DiagnosticKind::Unsupported, &quote(call), call.line),
            }
            return;
        };

        match name {
            "=" => self.compile_assign(call, code),
            "arg" => self.compile_arg(call, code),
            _ if call.is_operator() => self.compile_operator(name, call, code),
            _ => self.compile_invoke(name, call, code),
        }
    }

    /// Compiles `target = value`: value first, then `VARSET`.
    fn compile_assign(&mut self, call: &CallNode, code: &mut Bytecode) {
        if call.param_count() != 2 {
            self.report(
                DiagnosticKind::OperatorArity {
                    op: "=".to_string(),
                    count: call.param_count(),
                },
                &quote(call),
                call.line,
            );
            return;
        }

        let target = call
            .param(0)
            .and_then(Syntax::as_value)
            .filter(|v| v.is_identifier());

        let Some(target) = target else {
            // Still lower the right side so its own errors surface.
            let mut scratch = Bytecode::new();
            self.compile_node(&call.params[1], &mut scratch);
            self.report(DiagnosticKind::BadAssignTarget, &quote(call), call.line);
            return;
        };

        self.compile_node(&call.params[1], code);
        let id = self.interner.intern_var(&target.id);
        code.emit(Instruction::var_set(id));
    }

    /// Compiles `arg(N)` with `N` taken literally.
    fn compile_arg(&mut self, call: &CallNode, code: &mut Bytecode) {
        let index = call
            .param(0)
            .and_then(Syntax::as_value)
            .filter(|v| v.is_number())
            .and_then(|v| parse_integer(&v.id));

        match index {
            Some(index) => {
                code.emit(Instruction::arg(index));
            }
            None => self.report(DiagnosticKind::BadArgIndex, &quote(call), call.line),
        }
    }

    /// Compiles an operator: operands left to right, then the opcode.
    fn compile_operator(&mut self, op: &str, call: &CallNode, code: &mut Bytecode) {
        let resolved = operator_opcode(op, call.param_count());

        let mut scratch = Bytecode::new();
        let target = if resolved.is_ok() {
            &mut *code
        } else {
            &mut scratch
        };
        for operand in &call.params {
            self.compile_node(operand, target);
        }

        match resolved {
            Ok(Some(opcode)) => {
                code.emit_op(opcode);
            }
            // Unary plus
            Ok(None) => {}
            Err(kind) => self.report(kind, &quote(call), call.line),
        }
    }

    /// Compiles an invocation: arguments left to right, then `CALL`.
    fn compile_invoke(&mut self, name: &str, call: &CallNode, code: &mut Bytecode) {
        for arg in &call.params {
            self.compile_node(arg, code);
        }

        let Ok(arity) = u32::try_from(call.param_count()) else {
            self.report(DiagnosticKind::TooManyArguments, &quote(call), call.line);
            return;
        };
        let target = self.interner.intern_proc(name);
        code.emit(Instruction::call(target, arity));
    }

    fn report(&mut self, kind: DiagnosticKind, code: &str, line: u32) {
        let diagnostic = Diagnostic::new(kind, code, line);
        warn!(%diagnostic, "compile error");
        self.diagnostics.push(diagnostic);
    }
}

/// Renders a construct for a diagnostic, eliding deep subtrees.
fn quote(call: &CallNode) -> String {
    call.elided(DIAGNOSTIC_DEPTH).to_string()
}

/// Recovers the declared name and formal parameters from a declaration head.
fn declared_name(head: &CallNode) -> Option<(String, Vec<String>)> {
    let id = head.id()?;
    let mut params = head.params.iter().map(|p| p.id().to_string());
    if id == FUNCTION_KEYWORD {
        let name = params.next().filter(|n| !n.is_empty())?;
        Some((name, params.collect()))
    } else {
        Some((id.to_string(), params.collect()))
    }
}

/// Maps an operator token and operand count to its opcode.
///
/// `Ok(None)` is unary plus, which lowers to its operand alone.
fn operator_opcode(op: &str, count: usize) -> Result<Option<Opcode>, DiagnosticKind> {
    let legal = match count {
        1 => matches!(op, "+" | "-" | "!" | "~"),
        2 => !matches!(op, "!" | "~"),
        _ => false,
    };
    if !legal {
        return Err(DiagnosticKind::OperatorArity {
            op: op.to_string(),
            count,
        });
    }

    let opcode = match (op, count) {
        ("+", 1) => return Ok(None),
        ("-", 1) => Opcode::Neg,
        ("!", _) => Opcode::Not,
        ("~", _) => Opcode::BitNot,
        ("+", _) => Opcode::Add,
        ("-", _) => Opcode::Sub,
        ("*", _) => Opcode::Mul,
        ("/", _) => Opcode::Div,
        ("%", _) => Opcode::Mod,
        ("&&", _) => Opcode::And,
        ("||", _) => Opcode::Or,
        (">", _) => Opcode::Gt,
        (">=", _) => Opcode::Ge,
        ("==", _) => Opcode::Eq,
        ("!=", _) => Opcode::Ne,
        ("<=", _) => Opcode::Le,
        ("<", _) => Opcode::Lt,
        ("<<", _) => Opcode::LShift,
        (">>", _) => Opcode::RShift,
        ("&", _) => Opcode::BitAnd,
        ("|", _) => Opcode::BitOr,
        ("^", _) => Opcode::BitXor,
        _ => return Err(DiagnosticKind::UnknownOperator(op.to_string())),
    };
    Ok(Some(opcode))
}

/// Parses a decimal or `0x` hexadecimal integer literal with optional sign.
fn parse_integer(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => i128::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<i128>().ok()?,
    };
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}
