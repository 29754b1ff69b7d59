//! Integration tests for the compiler
//!
//! Tests lowering to bytecode and diagnostic aggregation.

use quill_foundation::Interner;
use quill_language::{CompiledUnit, Compiler, DiagnosticKind, Instruction, Opcode};
use quill_syntax::Syntax;

fn compile_unit(unit: &[Syntax]) -> (CompiledUnit, Interner) {
    let mut interner = Interner::new();
    let compiled = Compiler::new(&mut interner).compile(unit);
    (compiled, interner)
}

fn main_proc(body: Vec<Syntax>) -> Vec<Syntax> {
    vec![Syntax::procedure("main", &[], body)]
}

fn kinds(unit: &[Syntax]) -> Vec<DiagnosticKind> {
    compile_unit(unit)
        .0
        .diagnostics
        .into_iter()
        .map(|d| d.kind)
        .collect()
}

// =============================================================================
// Lowering
// =============================================================================

#[test]
fn assignment_lowers_value_then_varset() {
    let (compiled, interner) = compile_unit(&main_proc(vec![Syntax::assign(
        Syntax::ident("$a"),
        Syntax::binary("+", Syntax::int(1), Syntax::int(2)),
    )]));
    assert!(compiled.diagnostics.is_empty());

    let a = interner.lookup_var("$a").unwrap();
    assert_eq!(
        compiled.procedures[0].code.ops,
        vec![
            Instruction::push(1),
            Instruction::push(2),
            Instruction::new(Opcode::Add),
            Instruction::var_set(a),
        ]
    );
}

#[test]
fn calls_push_arguments_in_order() {
    let (compiled, interner) = compile_unit(&main_proc(vec![Syntax::call(
        "f",
        vec![Syntax::int(1), Syntax::ident("$x"), Syntax::int(3)],
    )]));
    let ops = &compiled.procedures[0].code.ops;
    let call = ops.last().unwrap();

    assert_eq!(ops.len(), 4);
    assert_eq!(call.op, Opcode::Call);
    assert_eq!(call.call_arity(), 3);
    assert_eq!(interner.proc_name(call.call_target()), Some("f"));
}

#[test]
fn listing_resolves_names() {
    let (compiled, interner) = compile_unit(&main_proc(vec![
        Syntax::assign(Syntax::ident("$a"), Syntax::int(5)),
        Syntax::call("echo", vec![Syntax::ident("$a")]),
    ]));
    let listing = compiled.procedures[0].disassemble(&interner);
    assert_eq!(
        listing,
        "main():\n  0000 PUSH 5\n  0001 VARSET 0 ; $a\n  0002 VAR 0 ; $a\n  0003 CALL 1:1 ; echo\n"
    );
}

#[test]
fn hex_and_signed_literals() {
    let (compiled, _) = compile_unit(&main_proc(vec![
        Syntax::number("0x1F"),
        Syntax::number("-12"),
    ]));
    assert_eq!(
        compiled.procedures[0].code.ops,
        vec![Instruction::push(31), Instruction::push(-12)]
    );
}

#[test]
fn function_keyword_declares_its_first_parameter() {
    let decl = Syntax::high_order(
        Syntax::call("function", vec![Syntax::ident("main"), Syntax::ident("x")]),
        vec![Syntax::int(1)],
    );
    let (compiled, _) = compile_unit(&[decl]);
    assert_eq!(compiled.procedures[0].name, "main");
    assert_eq!(compiled.procedures[0].params, vec!["x".to_string()]);
}

#[test]
fn non_declarations_are_ignored() {
    let (compiled, _) = compile_unit(&[
        Syntax::int(1),
        Syntax::block(vec![Syntax::procedure("inner", &[], vec![Syntax::int(2)])]),
    ]);
    assert!(compiled.diagnostics.is_empty());
    assert_eq!(compiled.procedures.len(), 1);
    assert_eq!(compiled.procedures[0].name, "inner");
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn every_error_is_reported() {
    let found = kinds(&main_proc(vec![
        Syntax::number("1.5"),
        Syntax::assign(Syntax::int(3), Syntax::int(4)),
        Syntax::high_order(
            Syntax::call("if", vec![Syntax::ident("$a")]),
            vec![Syntax::int(1)],
        ),
        Syntax::binary("@", Syntax::int(1), Syntax::int(2)),
    ]));
    assert_eq!(
        found,
        vec![
            DiagnosticKind::NonIntegerConst,
            DiagnosticKind::BadAssignTarget,
            DiagnosticKind::Unsupported,
            DiagnosticKind::UnknownOperator("@".to_string()),
        ]
    );
}

#[test]
fn errors_inside_bad_operators_still_surface() {
    let found = kinds(&main_proc(vec![Syntax::op(
        "!",
        vec![Syntax::number("2.5"), Syntax::int(1)],
    )]));
    assert_eq!(
        found,
        vec![
            DiagnosticKind::NonIntegerConst,
            DiagnosticKind::OperatorArity {
                op: "!".to_string(),
                count: 2,
            },
        ]
    );
}

#[test]
fn diagnostic_message_format() {
    let (compiled, _) = compile_unit(&main_proc(vec![Syntax::number("1.5").at_line(3)]));
    assert_eq!(
        compiled.diagnostics[0].to_string(),
        "const must be integer, code:1.5, line:3"
    );

    let (compiled, _) = compile_unit(&main_proc(vec![
        Syntax::assign(Syntax::int(3), Syntax::int(4)).at_line(7),
    ]));
    assert_eq!(
        compiled.diagnostics[0].to_string(),
        "operator = illegal, left operand must be a var, code:3 = 4, line:7"
    );
}

#[test]
fn bad_procedures_are_dropped_but_others_compile() {
    let (compiled, _) = compile_unit(&[
        Syntax::procedure("bad", &[], vec![Syntax::call("arg", vec![Syntax::ident("$i")])]),
        Syntax::procedure("good", &[], vec![Syntax::int(1)]),
    ]);
    assert_eq!(compiled.diagnostics.len(), 1);
    assert_eq!(compiled.diagnostics[0].kind, DiagnosticKind::BadArgIndex);
    assert_eq!(compiled.procedures.len(), 1);
    assert_eq!(compiled.procedures[0].name, "good");
}
