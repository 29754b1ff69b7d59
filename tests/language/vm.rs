//! Integration tests for the VM
//!
//! Tests evaluation of compiled Quill procedures through the public API.

use std::cell::Cell;
use std::rc::Rc;

use quill_foundation::ErrorKind;
use quill_language::{ENTRY_POINT, UNRESOLVED, Vm, VmConfig};
use quill_syntax::Syntax;

fn eval(body: Vec<Syntax>) -> i64 {
    let mut vm = Vm::new();
    let report = vm.compile(&[Syntax::procedure(ENTRY_POINT, &[], body)]);
    assert!(report.is_ok(), "{:?}", report.messages());
    vm.execute().unwrap()
}

fn arg(n: i64) -> Syntax {
    Syntax::call("arg", vec![Syntax::int(n)])
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn eval_nested_arithmetic() {
    // (10 - 4) * 3 + 8 / 2 % 3
    let expr = Syntax::binary(
        "+",
        Syntax::binary(
            "*",
            Syntax::binary("-", Syntax::int(10), Syntax::int(4)),
            Syntax::int(3),
        ),
        Syntax::binary(
            "%",
            Syntax::binary("/", Syntax::int(8), Syntax::int(2)),
            Syntax::int(3),
        ),
    );
    assert_eq!(eval(vec![expr]), 19);
}

#[test]
fn eval_chained_assignment() {
    let expr = Syntax::assign(
        Syntax::ident("$a"),
        Syntax::assign(Syntax::ident("$b"), Syntax::int(3)),
    );
    assert_eq!(
        eval(vec![
            expr,
            Syntax::binary("+", Syntax::ident("$a"), Syntax::ident("$b")),
        ]),
        6
    );
}

#[test]
fn eval_string_leaf_reads_variable() {
    // Non-numeric leaves are variable names.
    assert_eq!(eval(vec![Syntax::string("unset")]), 0);
}

#[test]
fn eval_comparison_chain() {
    let expr = Syntax::binary(
        "&&",
        Syntax::binary("<", Syntax::int(1), Syntax::int(2)),
        Syntax::binary("!=", Syntax::int(3), Syntax::int(3)),
    );
    assert_eq!(eval(vec![expr]), 0);
}

// =============================================================================
// Procedures and Natives
// =============================================================================

#[test]
fn call_native_by_id() {
    let mut vm = Vm::new();
    let id = vm.register("sum", |args: &[i64]| args.iter().sum::<i64>());
    assert_eq!(vm.call(id, &[1, 2, 3]).unwrap(), 6);
}

#[test]
fn natives_keep_state_between_calls() {
    let count = Rc::new(Cell::new(0));
    let seen = Rc::clone(&count);

    let mut vm = Vm::new();
    vm.register("tick", move |_: &[i64]| {
        seen.set(seen.get() + 1);
        seen.get()
    });
    let report = vm.compile(&[Syntax::procedure(
        "main",
        &[],
        vec![
            Syntax::call("tick", vec![]),
            Syntax::call("tick", vec![]),
            Syntax::call("tick", vec![]),
        ],
    )]);
    assert!(report.is_ok());

    assert_eq!(vm.execute().unwrap(), 3);
    assert_eq!(count.get(), 3);
}

#[test]
fn execute_named_runs_any_procedure() {
    let mut vm = Vm::new();
    let report = vm.compile(&[Syntax::procedure(
        "mix",
        &["a", "b", "c"],
        vec![Syntax::binary(
            "-",
            Syntax::binary("*", arg(0), arg(1)),
            arg(2),
        )],
    )]);
    assert_eq!(report.procedures, vec!["mix".to_string()]);
    assert_eq!(vm.execute_named("mix", &[6, 7, 2]).unwrap(), 40);
    assert_eq!(vm.execute().unwrap(), UNRESOLVED);
}

#[test]
fn later_compiles_extend_and_replace() {
    let mut vm = Vm::new();
    assert!(
        vm.compile(&[Syntax::procedure(
            "main",
            &[],
            vec![Syntax::call("value", vec![])]
        )])
        .is_ok()
    );
    assert_eq!(vm.execute().unwrap(), 0);

    assert!(
        vm.compile(&[Syntax::procedure("value", &[], vec![Syntax::int(1)])])
            .is_ok()
    );
    assert_eq!(vm.execute().unwrap(), 1);

    assert!(
        vm.compile(&[Syntax::procedure("value", &[], vec![Syntax::int(2)])])
            .is_ok()
    );
    assert_eq!(vm.execute().unwrap(), 2);
}

#[test]
fn procedure_is_inspectable() {
    let mut vm = Vm::new();
    vm.register("native", |_: &[i64]| 0);
    vm.compile(&[Syntax::procedure("main", &[], vec![Syntax::int(1)])]);

    assert!(vm.is_defined("native"));
    assert!(vm.procedure("native").is_none());

    let main = vm.procedure("main").unwrap();
    assert_eq!(main.code.len(), 1);
    assert_eq!(main.disassemble(vm.interner()), "main():\n  0000 PUSH 1\n");
    assert!(!vm.is_defined("missing"));
}

// =============================================================================
// Faults
// =============================================================================

#[test]
fn mutual_recursion_hits_depth_limit() {
    let mut vm = Vm::with_config(VmConfig::constrained());
    vm.compile(&[
        Syntax::procedure("ping", &[], vec![Syntax::call("pong", vec![])]),
        Syntax::procedure("pong", &[], vec![Syntax::call("ping", vec![])]),
        Syntax::procedure("main", &[], vec![Syntax::call("ping", vec![])]),
    ]);

    let err = vm.execute().unwrap_err();
    assert_eq!(err.kind, ErrorKind::CallDepthExceeded { limit: 64 });
    assert_eq!(vm.config().max_call_depth, 64);
}

#[test]
fn fault_aborts_remaining_statements() {
    let mut vm = Vm::new();
    vm.compile(&[Syntax::procedure(
        "main",
        &[],
        vec![
            Syntax::assign(Syntax::ident("$before"), Syntax::int(1)),
            Syntax::binary("%", Syntax::int(5), Syntax::ident("$zero")),
            Syntax::assign(Syntax::ident("$after"), Syntax::int(1)),
        ],
    )]);

    let err = vm.execute().unwrap_err();
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
    assert_eq!(vm.variable("$before"), Some(1));
    assert_eq!(vm.variable("$after"), Some(0));
}

#[test]
fn vm_is_reusable_after_fault() {
    let mut vm = Vm::new();
    vm.compile(&[
        Syntax::procedure("main", &[], vec![Syntax::binary("/", arg(0), arg(1))]),
    ]);
    assert!(vm.execute().is_err());
    assert_eq!(vm.execute_named("main", &[9, 3]).unwrap(), 3);
}
