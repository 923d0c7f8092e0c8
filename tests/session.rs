mod common;

use std::io::{self, Write};

use common::{run, run_recovering, Session};
use pretty_assertions::assert_eq;
use rox::diagnostics::CollectingReporter;
use rox::interpreter::Interpreter;
use rox::lox::{Lox, Options, Status};
use rox::output::SharedBuffer;
use rox::value::Value;

fn twice(_: &mut Interpreter, args: &[Value]) -> Result<Value, String> {
    match args[0] {
        Value::Number(n) => Ok(Value::Number(n * 2.0)),
        _ => Err("twice expects a number.".to_string()),
    }
}

/// A `print` sink whose reader has gone away.
struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn parse_errors_suppress_execution_by_default() {
    let outcome = run("print 1;\nprint ;\nprint 2;");

    assert_eq!(outcome.status, Status::StaticError);
    assert_eq!(outcome.stdout, "");
    assert_eq!(
        outcome.diagnostics,
        vec!["[line 2] Error at ';': Expect expression."]
    );
}

#[test]
fn recovering_runs_the_statements_that_parsed() {
    let outcome = run_recovering("print 1;\nprint ;\nprint 2;");

    assert_eq!(outcome.status, Status::StaticError);
    assert_eq!(outcome.stdout, "1\n2\n");
    assert_eq!(
        outcome.diagnostics,
        vec!["[line 2] Error at ';': Expect expression."]
    );
}

#[test]
fn lex_errors_are_reported_alongside_parse_errors() {
    let outcome = run("print 1 @ 2;");

    assert_eq!(outcome.status, Status::StaticError);
    assert_eq!(
        outcome.diagnostics,
        vec![
            "[line 1] Error: Unexpected character: @",
            "[line 1] Error at '2': Expect ';' after value.",
        ]
    );
}

#[test]
fn resolve_errors_stop_even_when_recovering() {
    let outcome = run_recovering("print 1;\nreturn 2;");

    assert_eq!(outcome.status, Status::StaticError);
    assert_eq!(outcome.stdout, "");
}

#[test]
fn runtime_error_after_recovery_reports_runtime_status() {
    let outcome = run_recovering("print ;\nprint 1 / 0;");

    assert_eq!(outcome.status, Status::RuntimeError);
    assert_eq!(
        outcome.diagnostics,
        vec![
            "[line 1] Error at ';': Expect expression.",
            "Division by zero.\n[line 2]",
        ]
    );
}

#[test]
fn globals_persist_between_runs() {
    let mut session = Session::new(Options::default());

    assert_eq!(session.run("var greeting = \"hello\";").status, Status::Ok);
    assert_eq!(
        session.run("fun shout(s) { return s + \"!\"; }").status,
        Status::Ok
    );
    assert_eq!(
        session.run("class Box { init(v) { this.v = v; } }").status,
        Status::Ok
    );

    let outcome = session.run("print shout(greeting);\nprint Box(1).v;");
    assert_eq!(outcome.status, Status::Ok);
    assert_eq!(outcome.stdout, "hello!\n1\n");
}

#[test]
fn closures_survive_across_runs() {
    let mut session = Session::new(Options::default());

    session.run(
        "fun makeCounter() { var i = 0; fun count() { i = i + 1; return i; } return count; }\n\
         var c = makeCounter();",
    );
    session.run("c();");

    assert_eq!(session.run("print c();").stdout, "2\n");
}

#[test]
fn failed_run_keeps_earlier_globals() {
    let mut session = Session::new(Options::default());

    let failed = session.run("var kept = 1;\nprint missing;\nvar lost = 2;");
    assert_eq!(failed.status, Status::RuntimeError);

    let outcome = session.run("print kept;");
    assert_eq!(outcome.status, Status::Ok);
    assert_eq!(outcome.stdout, "1\n");

    let outcome = session.run("print lost;");
    assert_eq!(outcome.status, Status::RuntimeError);
}

#[test]
fn runtime_error_inside_a_block_restores_global_scope() {
    let mut session = Session::new(Options::default());

    session.run("{ var inner = 1; print nope; }");
    let outcome = session.run("var top = 3;\nprint top;");

    assert_eq!(outcome.stdout, "3\n");

    let outcome = session.run("print inner;");
    assert_eq!(outcome.status, Status::RuntimeError);
}

#[test]
fn only_clean_runs_add_resolved_locals() {
    let mut session = Session::new(Options::default());

    session.run("{ var x = 1; print x; }");
    let before = session.lox.interpreter().local_count();
    assert!(before > 0);

    let failed = session.run("{ var y = 2; print y; }\nreturn 1;");
    assert_eq!(failed.status, Status::StaticError);
    assert_eq!(session.lox.interpreter().local_count(), before);

    let outcome = session.run("{ var z = 3; print z; }");
    assert_eq!(outcome.stdout, "3\n");
    assert!(session.lox.interpreter().local_count() > before);
}

#[test]
fn statuses_map_to_exit_codes() {
    assert_eq!(Status::Ok.exit_code(), 0);
    assert_eq!(Status::StaticError.exit_code(), 65);
    assert_eq!(Status::RuntimeError.exit_code(), 70);
}

#[test]
fn empty_program_is_ok() {
    let outcome = run("// nothing here\n");

    assert_eq!(outcome.status, Status::Ok);
    assert_eq!(outcome.stdout, "");
    assert!(outcome.diagnostics.is_empty());
}

#[test]
fn embedders_can_register_native_functions() {
    let mut session = Session::new(Options::default());
    let interpreter = session.lox.interpreter_mut();
    interpreter.define_native("twice", 1, twice);

    let outcome = session.run("print twice(21);\nprint twice;");
    assert_eq!(outcome.stdout, "42\n<native fn twice>\n");

    let outcome = session.run("twice(\"x\");");
    assert_eq!(outcome.status, Status::RuntimeError);
    assert_eq!(
        outcome.diagnostics,
        vec!["twice expects a number.\n[line 1]"]
    );
}

#[test]
fn print_write_failure_is_reported_as_an_io_error() {
    let interpreter = Interpreter::with_output(Box::new(ClosedPipe));
    let mut lox = Lox::with_interpreter(interpreter, Options::default());
    let mut reporter = CollectingReporter::new();

    assert_eq!(lox.run("print 1;", &mut reporter), Status::RuntimeError);
    assert_eq!(reporter.messages, vec!["[line 0] Error: pipe closed"]);
}

#[test]
fn shared_buffer_clones_share_contents() {
    let buffer = SharedBuffer::new();
    let mut writer = buffer.clone();

    write!(writer, "abc").unwrap();
    assert_eq!(buffer.contents(), "abc");
    assert_eq!(buffer.take(), "abc");
    assert_eq!(buffer.contents(), "");
}
