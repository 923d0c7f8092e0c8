mod common;

use common::{lines, run};
use pretty_assertions::assert_eq;
use rox::lox::Status;

fn resolve_errors(source: &str) -> Vec<String> {
    let outcome = run(source);

    assert_eq!(outcome.status, Status::StaticError);
    assert_eq!(outcome.stdout, "", "nothing may run after a resolve error");

    outcome.diagnostics
}

#[test]
fn reading_a_local_in_its_own_initializer() {
    assert_eq!(
        resolve_errors("var a = 1;\n{\n  var a = a;\n}"),
        vec!["[line 3] Error at 'a': Can't read local variable in its own initializer."]
    );
}

#[test]
fn global_self_reference_is_left_to_runtime() {
    let outcome = run("var g = g;");

    assert_eq!(outcome.status, Status::RuntimeError);
    assert_eq!(
        outcome.diagnostics,
        vec!["Undefined variable 'g'.\n[line 1]"]
    );
}

#[test]
fn return_at_top_level() {
    assert_eq!(
        resolve_errors("print 1;\nreturn 2;"),
        vec!["[line 2] Error at 'return': Can't return from top-level code."]
    );
}

#[test]
fn return_value_from_initializer() {
    assert_eq!(
        resolve_errors("class C {\n  init() { return 1; }\n}"),
        vec!["[line 2] Error at 'return': Can't return a value from an initializer."]
    );
}

#[test]
fn this_outside_a_class() {
    assert_eq!(
        resolve_errors("print this;"),
        vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]
    );
    assert_eq!(
        resolve_errors("fun f() {\n  return this;\n}"),
        vec!["[line 2] Error at 'this': Can't use 'this' outside of a class."]
    );
}

#[test]
fn redeclaring_a_local() {
    assert_eq!(
        resolve_errors("{\n  var a = 1;\n  var a = 2;\n}"),
        vec!["[line 3] Error at 'a': Already a variable with this name in this scope."]
    );
    assert_eq!(
        resolve_errors("fun f(x, x) {}"),
        vec!["[line 1] Error at 'x': Already a variable with this name in this scope."]
    );
}

#[test]
fn redeclaring_a_global_is_allowed() {
    assert_eq!(lines("var a = 1;\nvar a = 2;\nprint a;"), vec!["2"]);
}

#[test]
fn every_resolve_error_is_reported() {
    assert_eq!(
        resolve_errors("return 1;\nprint this;\n{ var b = b; }"),
        vec![
            "[line 1] Error at 'return': Can't return from top-level code.",
            "[line 2] Error at 'this': Can't use 'this' outside of a class.",
            "[line 3] Error at 'b': Can't read local variable in its own initializer.",
        ]
    );
}

#[test]
fn inner_shadowing_does_not_leak_into_earlier_closures() {
    assert_eq!(
        lines(
            "fun outer() {\n\
               var x = \"outer\";\n\
               fun inner() { return x; }\n\
               {\n\
                 var x = \"shadow\";\n\
                 print inner();\n\
                 print x;\n\
               }\n\
             }\n\
             outer();"
        ),
        vec!["outer", "shadow"]
    );
}

#[test]
fn assignment_targets_the_resolved_scope() {
    assert_eq!(
        lines(
            "var a = \"global\";\n\
             {\n\
               fun set() { a = \"assigned\"; }\n\
               var a = \"local\";\n\
               set();\n\
               print a;\n\
             }\n\
             print a;"
        ),
        vec!["local", "assigned"]
    );
}

#[test]
fn return_inside_function_and_method_is_fine() {
    assert_eq!(
        lines(
            "fun f() { return 1; }\n\
             class C { m() { return 2; } init() { return; } }\n\
             print f() + C().m();"
        ),
        vec!["3"]
    );
}
