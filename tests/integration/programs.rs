//! Whole-program tests
//!
//! Runs small scripts against a VM with the standard natives registered.

use quill::language::{CompileReport, Vm};
use quill::stdlib::{EchoLog, register_stdlib};
use quill::syntax::Syntax;

fn arg(n: i64) -> Syntax {
    Syntax::call("arg", vec![Syntax::int(n)])
}

fn var(name: &str) -> Syntax {
    Syntax::ident(name)
}

fn setup(unit: &[Syntax]) -> (Vm, EchoLog, CompileReport) {
    let mut vm = Vm::new();
    let log = register_stdlib(&mut vm);
    let report = vm.compile(unit);
    (vm, log, report)
}

/// main(){ $a = 10; $b = add($a, 5); echo($a, $b, $a * $b); sub(); $c; }
/// add(x, y){ arg(0) + arg(1); }
/// sub(){ $c = $a - $b; }
fn demo_program() -> Vec<Syntax> {
    vec![
        Syntax::procedure(
            "main",
            &[],
            vec![
                Syntax::assign(var("$a"), Syntax::int(10)),
                Syntax::assign(
                    var("$b"),
                    Syntax::call("add", vec![var("$a"), Syntax::int(5)]),
                ),
                Syntax::call(
                    "echo",
                    vec![var("$a"), var("$b"), Syntax::binary("*", var("$a"), var("$b"))],
                ),
                Syntax::call("sub", vec![]),
                var("$c"),
            ],
        ),
        Syntax::procedure("add", &["x", "y"], vec![Syntax::binary("+", arg(0), arg(1))]),
        Syntax::procedure(
            "sub",
            &[],
            vec![Syntax::assign(var("$c"), Syntax::binary("-", var("$a"), var("$b")))],
        ),
    ]
}

#[test]
fn demo_program_runs() {
    let (mut vm, log, report) = setup(&demo_program());
    assert!(report.is_ok(), "{:?}", report.messages());
    assert_eq!(report.procedures.len(), 3);

    assert_eq!(vm.execute().unwrap(), -5);
    assert_eq!(log.lines(), vec!["10, 15, 150".to_string()]);
    assert_eq!(vm.variable("$a"), Some(10));
    assert_eq!(vm.variable("$b"), Some(15));
    assert_eq!(vm.variable("$c"), Some(-5));
}

#[test]
fn echo_returns_its_last_argument() {
    let (mut vm, log, report) = setup(&[Syntax::procedure(
        "main",
        &[],
        vec![Syntax::binary(
            "+",
            Syntax::call("echo", vec![Syntax::int(1), Syntax::int(2)]),
            Syntax::call("echo", vec![]),
        )],
    )]);
    assert!(report.is_ok());
    assert_eq!(vm.execute().unwrap(), 2);
    assert_eq!(log.take(), vec!["1, 2".to_string(), String::new()]);
}

#[test]
fn stdlib_math_composes() {
    // max(abs(-7), min(3, 9), 4) == 7
    let (mut vm, _, report) = setup(&[Syntax::procedure(
        "main",
        &[],
        vec![Syntax::call(
            "max",
            vec![
                Syntax::call("abs", vec![Syntax::int(-7)]),
                Syntax::call("min", vec![Syntax::int(3), Syntax::int(9)]),
                Syntax::int(4),
            ],
        )],
    )]);
    assert!(report.is_ok());
    assert_eq!(vm.execute().unwrap(), 7);
}

#[test]
fn broken_main_leaves_helpers_usable() {
    let (mut vm, log, report) = setup(&[
        Syntax::procedure(
            "main",
            &[],
            vec![Syntax::high_order(
                Syntax::call("while", vec![Syntax::int(1)]),
                vec![Syntax::call("echo", vec![Syntax::int(1)])],
            )],
        ),
        Syntax::procedure("helper", &[], vec![Syntax::call("echo", vec![Syntax::int(8)])]),
    ]);

    assert!(!report.is_ok());
    assert_eq!(report.procedures, vec!["helper".to_string()]);
    assert!(report.messages()[0].starts_with("construct is not supported"));

    assert_eq!(vm.execute().unwrap(), quill::language::UNRESOLVED);
    assert_eq!(vm.execute_named("helper", &[]).unwrap(), 8);
    assert_eq!(log.lines(), vec!["8".to_string()]);
}

#[test]
fn fault_keeps_echo_output() {
    let (mut vm, log, report) = setup(&[Syntax::procedure(
        "main",
        &[],
        vec![
            Syntax::call("echo", vec![Syntax::int(1)]),
            Syntax::binary("/", Syntax::int(1), Syntax::int(0)),
            Syntax::call("echo", vec![Syntax::int(2)]),
        ],
    )]);
    assert!(report.is_ok());
    assert!(vm.execute().is_err());
    assert_eq!(log.lines(), vec!["1".to_string()]);
}
