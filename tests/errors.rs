#[macro_use]
mod cases;

use pretty_assertions::assert_eq;
use rivet::{Error, ErrorId, EvalOptions, Interpreter, render_error_to_string_no_color};

test_case!(zero_divide, input: "1 / 0", error: "math/zero-divide");
test_case!(overflow, input: "9223372036854775807 * 2", error: "math/overflow");
test_case!(uncaught_throw, input: "throw 1", error: "throw/no-catch");
test_case!(uncaught_named_throw, input: "throw/name 1 'x", error: "throw/no-catch-named");
test_case!(user_failure, input: "fail \"nope\"", error: "user/message");
test_case!(
    failure_from_block,
    input: "fail [type: 'script id: 'invalid-arg arg1: 1]",
    error: "script/invalid-arg",
);
test_case!(invalid_error_spec, input: "make-error [code: 303 message: \"x\"]", error: "script/invalid-error");

test_case!(trap_gives_error, input: "e: trap [1 / 0]  e/id", value: "zero-divide");
test_case!(trap_gives_value, input: "trap [1 + 1]", value: "2");
test_case!(catch_plain_throw, input: "catch [throw 5  6]", value: "5");
test_case!(catch_named_throw, input: "catch/name [throw/name 5 'done] 'done", value: "5");
test_case!(quit_status, input: "quit/with 4", quit: 4);
test_case!(quit_without_value, input: "quit", quit: 0);
test_case!(quit_through_catch, input: "catch [quit/with 2]", quit: 2);

#[test]
fn test_error_location() {
    let mut interpreter = Interpreter::new();
    let Err(Error::Script(error)) = interpreter.run("check: func [x] [x / 0]  check 5") else {
        panic!("expected a script error");
    };
    assert!(error.is(ErrorId::ZeroDivide));
    let labels: Vec<&str> = error
        .backtrace()
        .unwrap_or_default()
        .iter()
        .map(|label| label.as_str())
        .collect();
    assert_eq!(labels, ["/", "check"]);
    assert!(error.to_string().contains("** Where: / check"));
    assert!(error.to_string().contains("??"));
}

#[test]
fn test_halt_is_not_trapped() {
    let mut interpreter = Interpreter::new();
    let result = interpreter.run("trap [halt]");
    assert!(matches!(result, Err(Error::Halted)), "{:?}", result);
}

#[test]
fn test_interrupt_handle_halts() {
    let mut interpreter = Interpreter::with_options(EvalOptions {
        signal_interval: 1,
        ..EvalOptions::default()
    });
    interpreter.interrupt_handle().request_halt();
    assert!(matches!(interpreter.run("1 + 2"), Err(Error::Halted)));
    // The request is consumed.
    assert_eq!(interpreter.run("1 + 2").unwrap(), rivet::Value::integer(3));
}

#[test]
fn test_load_error_renders_with_source() {
    let source = "x: [1 2";
    let mut interpreter = Interpreter::new();
    let error = interpreter.run(source).unwrap_err();
    assert!(matches!(error, Error::Load { .. }));
    let output = render_error_to_string_no_color(&error, source);
    assert!(output.contains(source));
}

#[test]
fn test_exit_status() {
    let mut interpreter = Interpreter::new();
    assert_eq!(interpreter.run("quit/with 9").unwrap_err().exit_status(), 9);
    assert_eq!(interpreter.run("1 / 0").unwrap_err().exit_status(), 400);
}

#[test]
fn test_session_survives_errors() {
    let mut interpreter = Interpreter::new();
    let before = interpreter.session().snapshot();
    assert!(interpreter.run("x: 1  add 1 multiply 2 divide 3 0").is_err());
    assert_eq!(interpreter.session().snapshot(), before);
    assert_eq!(interpreter.run("x + 1").unwrap(), rivet::Value::integer(2));
}
