//! Whole-pipeline tests: source in, captured standard output (or a
//! diagnostic) out.

use treelox::interpreter::Interpreter;
use treelox::parser::Parser;
use treelox::reporter::Reporter;
use treelox::resolver::Resolver;
use treelox::scanner::Scanner;
use treelox::token::Token;

struct Run {
    output: String,
    had_static_error: bool,
    runtime_error: Option<String>,
}

fn run(source: &str) -> Run {
    let reporter = Reporter::new();

    let mut tokens: Vec<Token> = Vec::new();
    for result in Scanner::new(source.as_bytes()) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => reporter.error(&e),
        }
    }

    let mut parser = Parser::new(tokens, &reporter, 0);
    let program = parser.parse();

    let mut interpreter = Interpreter::new(Vec::new());
    let mut runtime_error = None;

    if !reporter.had_error() {
        Resolver::new(&reporter, &mut interpreter).resolve(&program);

        if !reporter.had_error() {
            if let Err(e) = interpreter.interpret(&program) {
                runtime_error = Some(e.to_string());
            }
        }
    }

    Run {
        output: String::from_utf8(interpreter.into_output()).expect("output is UTF-8"),
        had_static_error: reporter.had_error(),
        runtime_error,
    }
}

fn expect_output(source: &str, expected: &str) {
    let run = run(source);

    assert!(!run.had_static_error, "static error for: {}", source);
    assert!(
        run.runtime_error.is_none(),
        "runtime error for {}: {:?}",
        source,
        run.runtime_error
    );
    assert_eq!(run.output, expected, "wrong output for: {}", source);
}

fn expect_runtime_error(source: &str, message_prefix: &str) {
    let run = run(source);

    assert!(!run.had_static_error, "static error for: {}", source);

    let err = run
        .runtime_error
        .unwrap_or_else(|| panic!("expected runtime error for: {}", source));
    assert!(
        err.starts_with(message_prefix),
        "expected {:?} to start with {:?}",
        err,
        message_prefix
    );
}

fn expect_static_error(source: &str) {
    let run = run(source);

    assert!(run.had_static_error, "expected static error for: {}", source);
}

// ─────────────────────────────────────────────────────────────────────────────
// Expressions and statements
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn arithmetic() {
    expect_output("print 1 + 2;", "3\n");
    expect_output("print (2 + 3) * 4;", "20\n");
    expect_output("print 10 - 2 - 3;", "5\n");
    expect_output("print 7 / 2;", "3.5\n");
    expect_output("print -(3 + 1);", "-4\n");
}

#[test]
fn number_printing_strips_integral_fraction() {
    expect_output("print 5.0;", "5\n");
    expect_output("print 5.5;", "5.5\n");
}

#[test]
fn string_concatenation_is_left_to_right() {
    expect_output("print \"con\" + \"cat\" + \"!\";", "concat!\n");
}

#[test]
fn comparison_and_equality() {
    expect_output("print 1 < 2;", "true\n");
    expect_output("print 2 <= 2;", "true\n");
    expect_output("print 3 > 4;", "false\n");
    expect_output("print nil == nil;", "true\n");
    expect_output("print nil == false;", "false\n");
    expect_output("print nil == 0;", "false\n");
    expect_output("print nil == \"\";", "false\n");
    expect_output("print 5 == \"5\";", "false\n");
    expect_output("print \"a\" == \"a\";", "true\n");
    expect_output("print 1 != 2;", "true\n");
}

#[test]
fn unary_bang_follows_truthiness() {
    expect_output("print !nil;", "true\n");
    expect_output("print !false;", "true\n");
    expect_output("print !0;", "false\n");
    expect_output("print !\"\";", "false\n");
    expect_output("print !!true;", "true\n");
}

#[test]
fn logical_operators_return_operands() {
    expect_output("print \"hi\" or 2;", "hi\n");
    expect_output("print nil or \"yes\";", "yes\n");
    expect_output("print nil and 2;", "nil\n");
    expect_output("print 1 and 2;", "2\n");
}

#[test]
fn logical_operators_short_circuit() {
    expect_output(
        "var a = 1; false and (a = 2); true or (a = 3); print a;",
        "1\n",
    );
}

#[test]
fn assignment_is_an_expression() {
    expect_output("var a = 1; print a = 2; print a;", "2\n2\n");
}

#[test]
fn block_scoping_and_shadowing() {
    expect_output("var a = 1; { var a = 2; print a; } print a;", "2\n1\n");
    expect_output("var a = 1; { a = a + 1; } print a;", "2\n");
}

#[test]
fn if_else() {
    expect_output("if (2 + 2 == 4) print \"yes\"; else print \"no\";", "yes\n");
    expect_output("if (2 + 2 == 5) print \"yes\"; else print \"no\";", "no\n");
}

#[test]
fn while_loop() {
    expect_output(
        "var i = 0; while (i < 3) { print i; i = i + 1; }",
        "0\n1\n2\n",
    );
}

#[test]
fn for_loop_sum() {
    expect_output("var s = 0; for (var i = 1; i <= 5; i = i + 1) s = s + i; print s;", "15\n");
}

#[test]
fn for_desugars_to_while() {
    let for_version = run("for (var i = 0; i < 4; i = i + 1) print i;");
    let while_version = run("{ var i = 0; while (i < 4) { print i; i = i + 1; } }");

    assert_eq!(for_version.output, while_version.output);
    assert_eq!(for_version.output, "0\n1\n2\n3\n");
}

#[test]
fn for_with_omitted_clauses() {
    expect_output(
        "var i = 0; for (; i < 2;) { print i; i = i + 1; }",
        "0\n1\n",
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Functions and closures
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn function_call_and_return() {
    expect_output(
        "fun add(a, b) { return a + b; } print add(1, 2);",
        "3\n",
    );
}

#[test]
fn function_falls_through_to_nil() {
    expect_output("fun f() {} print f();", "nil\n");
    expect_output("fun f() { return; } print f();", "nil\n");
}

#[test]
fn recursion() {
    expect_output(
        "fun fib(n){ if (n<2) return n; return fib(n-2)+fib(n-1); } print fib(7);",
        "13\n",
    );
}

#[test]
fn closure_binds_the_declaration_scope() {
    expect_output(
        "var a = \"g\"; { fun f(){ print a; } f(); var a = \"l\"; f(); }",
        "g\ng\n",
    );
}

#[test]
fn closures_share_captured_state() {
    expect_output(
        r#"
fun makeCounter() {
  var i = 0;
  fun count() {
    i = i + 1;
    print i;
  }
  return count;
}
var counter = makeCounter();
counter();
counter();
"#,
        "1\n2\n",
    );
}

#[test]
fn function_values_stringify() {
    expect_output("fun f() {} print f;", "<fn f>\n");
    expect_output("print clock;", "<native fn>\n");
}

#[test]
fn clock_returns_a_number() {
    expect_output("print clock() >= 0;", "true\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Classes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn class_and_instance_stringify() {
    expect_output("class Bagel {} print Bagel;", "Bagel\n");
    expect_output("class Bagel {} print Bagel();", "Bagel instance\n");
}

#[test]
fn fields_and_initializer() {
    expect_output(
        "class Bagel { init(){ this.n = 0; } } var b = Bagel(); b.n = b.n + 1; print b.n;",
        "1\n",
    );
}

#[test]
fn initializer_takes_arguments() {
    expect_output(
        "class Point { init(x, y) { this.x = x; this.y = y; } } print Point(3, 4).x;",
        "3\n",
    );
}

#[test]
fn initializer_returns_this_even_on_bare_return() {
    expect_output(
        "class C { init() { this.v = 7; return; this.v = 8; } } print C().v;",
        "7\n",
    );
}

#[test]
fn calling_init_again_returns_the_instance() {
    expect_output(
        "class C { init() { this.v = 1; } } var c = C(); print c.init();",
        "C instance\n",
    );
}

#[test]
fn methods_bind_this() {
    expect_output(
        r#"
class Cake {
  taste() {
    print "The " + this.flavor + " cake is delicious!";
  }
}
var cake = Cake();
cake.flavor = "chocolate";
cake.taste();
"#,
        "The chocolate cake is delicious!\n",
    );
}

#[test]
fn detached_bound_method_remembers_its_receiver() {
    expect_output(
        r#"
class Person {
  sayName() { print this.name; }
}
var jane = Person();
jane.name = "Jane";
var method = jane.sayName;
method();
"#,
        "Jane\n",
    );
}

#[test]
fn methods_inherit_up_the_chain() {
    expect_output(
        "class A { m() { print \"a\"; } } class B < A {} B().m();",
        "a\n",
    );
}

#[test]
fn super_calls_run_with_the_subclass_receiver() {
    expect_output(
        r#"
class A { greet(){ print "hi"; } }
class B < A { greet(){ super.greet(); print "hey"; } }
B().greet();
"#,
        "hi\nhey\n",
    );
}

#[test]
fn super_skips_the_own_override() {
    expect_output(
        r#"
class Doughnut {
  cook() { print "Fry until golden brown."; }
}
class BostonCream < Doughnut {
  cook() {
    super.cook();
    print "Pipe full of custard.";
  }
}
class Cruller < BostonCream {}
Cruller().cook();
"#,
        "Fry until golden brown.\nPipe full of custard.\n",
    );
}

#[test]
fn subclass_inherits_initializer_arity() {
    expect_output(
        "class A { init(x) { this.x = x; } } class B < A {} print B(9).x;",
        "9\n",
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Runtime errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn plus_rejects_mixed_operands() {
    expect_runtime_error(
        "print \"a\" + 1;",
        "Operands must be two numbers or two strings.",
    );
    expect_runtime_error("print 1 + \"a\";", "Operands must be two numbers or two strings.");
}

#[test]
fn numeric_operators_reject_non_numbers() {
    expect_runtime_error("print 1 - \"a\";", "Operands must be numbers.");
    expect_runtime_error("print \"a\" < \"b\";", "Operands must be numbers.");
    expect_runtime_error("print -\"a\";", "Operand must be a number.");
}

#[test]
fn division_by_zero() {
    expect_runtime_error("print 1 / 0;", "Division by zero.");
}

#[test]
fn undefined_variable() {
    expect_runtime_error("print missing;", "Undefined variable 'missing'.");
    expect_runtime_error("missing = 1;", "Undefined variable 'missing'.");
}

#[test]
fn runtime_error_carries_the_operator_line() {
    let run = run("var a = 1;\nprint a + \"x\";");
    let err = run.runtime_error.expect("expected runtime error");
    assert!(err.ends_with("[line 2]"), "got: {}", err);
}

#[test]
fn only_callables_can_be_called() {
    expect_runtime_error("true();", "Can only call functions and classes.");
    expect_runtime_error("\"str\"();", "Can only call functions and classes.");
}

#[test]
fn arity_is_checked_exactly() {
    expect_runtime_error("fun f(a) {} f();", "Expected 1 arguments but got 0.");
    expect_runtime_error("fun f() {} f(1, 2);", "Expected 0 arguments but got 2.");
    expect_runtime_error("clock(1);", "Expected 0 arguments but got 1.");
}

#[test]
fn properties_require_instances() {
    expect_runtime_error("var x = 1; print x.y;", "Only instances have properties.");
    expect_runtime_error("var x = 1; x.y = 2;", "Only instances have fields.");
}

#[test]
fn undefined_property() {
    expect_runtime_error(
        "class C {} print C().missing;",
        "Undefined property 'missing'.",
    );
}

#[test]
fn superclass_must_be_a_class() {
    expect_runtime_error(
        "var NotAClass = 1; class B < NotAClass {}",
        "Superclass must be a class.",
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Static errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn return_outside_a_function() {
    expect_static_error("return 1;");
}

#[test]
fn initializer_cannot_return_a_value() {
    expect_static_error("class C { init() { return 1; } }");
}

#[test]
fn local_cannot_read_itself_in_its_initializer() {
    expect_static_error("{ var a = a; }");
}

#[test]
fn local_redeclaration_is_rejected_but_global_is_not() {
    expect_static_error("{ var a = 1; var a = 2; }");
    expect_output("var a = 1; var a = 2; print a;", "2\n");
}

#[test]
fn class_cannot_inherit_from_itself() {
    expect_static_error("class A < A {}");
}

#[test]
fn this_outside_a_class() {
    expect_static_error("print this;");
    expect_static_error("fun f() { print this; }");
}

#[test]
fn super_placement_rules() {
    expect_static_error("print super.m;");
    expect_static_error("class A { m() { super.m(); } }");
}

#[test]
fn parse_errors_are_static_errors() {
    expect_static_error("print 1");
    expect_static_error("(1 + 2;");
    expect_static_error("var 1 = 2;");
    expect_static_error("1 = 2;");
}

#[test]
fn parser_recovers_and_reports_later_errors_too() {
    // Both statements are bad; synchronization lets the parse reach the
    // second one, and the pipeline still refuses to run.
    let result = run("var 1;\nprint missing_semicolon");
    assert!(result.had_static_error);
    assert_eq!(result.output, "");
}

// ─────────────────────────────────────────────────────────────────────────────
// Session behavior (REPL-style consecutive runs)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn consecutive_runs_share_globals_and_closures() {
    let reporter = Reporter::new();
    let mut interpreter = Interpreter::new(Vec::new());
    let mut next_expr_id = 0;

    for source in [
        "fun makeCounter() { var i = 0; fun count() { i = i + 1; print i; } return count; }",
        "var counter = makeCounter();",
        "counter();",
        "{ var unrelated = 1; print unrelated; }",
        "counter();",
    ] {
        let tokens: Vec<Token> = Scanner::new(source.as_bytes())
            .filter_map(Result::ok)
            .collect();

        let mut parser = Parser::new(tokens, &reporter, next_expr_id);
        let program = parser.parse();
        next_expr_id = parser.next_expr_id();
        assert!(!reporter.had_error(), "parse error in: {}", source);

        Resolver::new(&reporter, &mut interpreter).resolve(&program);
        assert!(!reporter.had_error(), "resolve error in: {}", source);

        interpreter
            .interpret(&program)
            .unwrap_or_else(|e| panic!("runtime error in {}: {}", source, e));
    }

    let output = String::from_utf8(interpreter.into_output()).expect("output is UTF-8");
    assert_eq!(output, "1\n1\n2\n");
}
