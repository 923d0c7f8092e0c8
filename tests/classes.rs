mod common;

use common::{lines, run};
use pretty_assertions::assert_eq;
use rox::lox::Status;

fn runtime_error(source: &str) -> String {
    let outcome = run(source);

    assert_eq!(outcome.status, Status::RuntimeError);
    assert_eq!(outcome.diagnostics.len(), 1, "{:?}", outcome.diagnostics);

    outcome.diagnostics[0].clone()
}

#[test]
fn methods_see_this() {
    assert_eq!(
        lines(
            "class Greeter {\n\
               init(name) { this.name = name; }\n\
               greet() { print \"hi \" + this.name; }\n\
             }\n\
             Greeter(\"Ann\").greet();"
        ),
        vec!["hi Ann"]
    );
}

#[test]
fn class_and_instance_labels() {
    assert_eq!(
        lines("class Bagel { eat() {} }\nprint Bagel;\nprint Bagel();\nprint Bagel().eat;"),
        vec!["Bagel", "Bagel instance", "<fn eat>"]
    );
}

#[test]
fn fields_are_per_instance() {
    assert_eq!(
        lines(
            "class Box {}\n\
             var a = Box();\nvar b = Box();\n\
             a.value = 1;\nb.value = 2;\n\
             print a.value;\nprint b.value;\n\
             print a.value = 3;\nprint a.value;"
        ),
        vec!["1", "2", "3", "3"]
    );
}

#[test]
fn fields_shadow_methods() {
    assert_eq!(
        lines(
            "class Thing { name() { return \"method\"; } }\n\
             var t = Thing();\n\
             print t.name();\n\
             t.name = \"field\";\n\
             print t.name;"
        ),
        vec!["method", "field"]
    );
}

#[test]
fn bound_methods_remember_their_instance() {
    assert_eq!(
        lines(
            "class Person {\n\
               init(name) { this.name = name; }\n\
               say() { print this.name; }\n\
             }\n\
             var jane = Person(\"Jane\");\n\
             var bill = Person(\"Bill\");\n\
             bill.say = jane.say;\n\
             bill.say();"
        ),
        vec!["Jane"]
    );
}

#[test]
fn methods_can_call_each_other_through_this() {
    assert_eq!(
        lines(
            "class Counter {\n\
               init() { this.n = 0; }\n\
               bump() { this.n = this.n + 1; return this; }\n\
             }\n\
             print Counter().bump().bump().n;"
        ),
        vec!["2"]
    );
}

#[test]
fn this_is_captured_by_closures_in_methods() {
    assert_eq!(
        lines(
            "class Cake {\n\
               init(flavor) { this.flavor = flavor; }\n\
               taster() { fun taste() { print this.flavor; } return taste; }\n\
             }\n\
             var t = Cake(\"lemon\").taster();\n\
             t();"
        ),
        vec!["lemon"]
    );
}

#[test]
fn calling_init_directly_returns_the_instance() {
    assert_eq!(
        lines(
            "class Foo { init() { this.x = 1; } }\n\
             var foo = Foo();\n\
             print foo.init() == foo;\n\
             print foo.init();"
        ),
        vec!["true", "Foo instance"]
    );
}

#[test]
fn bare_return_in_init_still_yields_the_instance() {
    assert_eq!(
        lines(
            "class Early { init(skip) { if (skip) return; this.set = true; } }\n\
             print Early(true);\n\
             print Early(false).set;"
        ),
        vec!["Early instance", "true"]
    );
}

#[test]
fn class_arity_follows_init() {
    assert_eq!(
        runtime_error("class Point { init(x, y) {} }\nPoint(1);"),
        "Expected 2 arguments but got 1.\n[line 2]"
    );
    assert_eq!(
        runtime_error("class Empty {}\nEmpty(1);"),
        "Expected 0 arguments but got 1.\n[line 2]"
    );
}

#[test]
fn undefined_property_is_a_runtime_error() {
    assert_eq!(
        runtime_error("class Bag {}\nprint Bag().missing;"),
        "Undefined property 'missing'.\n[line 2]"
    );
}

#[test]
fn only_instances_have_properties() {
    assert_eq!(
        runtime_error("var n = 1;\nprint n.field;"),
        "Only instances have properties.\n[line 2]"
    );
    assert_eq!(
        runtime_error("var n = 1;\nn.field = 2;"),
        "Only instances have fields.\n[line 2]"
    );
}

#[test]
fn instances_compare_by_identity() {
    assert_eq!(
        lines("class A {}\nvar a = A();\nprint a == a;\nprint a == A();\nprint A == A;"),
        vec!["true", "false", "true"]
    );
}
