use pretty_assertions::assert_eq;

use crate::context::ContextKind;
use crate::error::{ErrorId, ErrorObject};
use crate::evaluator::DoFlags;
use crate::session::Session;
use crate::test_utils::init_test_logging;
use crate::trap::Escape;
use crate::values::{Kind, Series, Value};

fn run(session: &mut Session, source: &str) -> Result<Value, Escape> {
    let code = session.load(source).unwrap();
    session
        .do_array(&Series::new(code), DoFlags::TO_END)
        .map(|step| step.value)
}

#[test]
fn test_resume_restores_every_counter() {
    init_test_logging();
    let mut session = Session::default();
    let before = session.snapshot();

    let handle = session.push_trap();
    session.data_stack_mut().push(Value::integer(1));
    session.data_stack_mut().push(Value::integer(2));
    session.heap_mut().guard_value(Value::integer(3));
    session.heap_mut().disable();
    let _manual = session.heap_mut().make_context(ContextKind::Object, None);
    let escape = session.fail(ErrorObject::new(ErrorId::Misc, &[Value::string("test")]));
    assert!(matches!(escape, Escape::Fail));

    let caught = session.resume(handle);
    assert!(caught.error.is(ErrorId::Misc));
    assert!(!caught.halted);
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_fail_unwinds_to_the_trap_depth() {
    let mut session = Session::default();
    let handle = session.push_trap();
    let result = run(&mut session, "f: func [] [1 / 0] (((f)))");
    assert!(matches!(result, Err(Escape::Fail)));
    assert_eq!(session.frame_depth(), 0);
    let caught = session.resume(handle);
    assert!(caught.error.is(ErrorId::ZeroDivide));
}

#[test]
fn test_inner_trap_does_not_disturb_outer() {
    let mut session = Session::default();
    let outer = session.push_trap();
    session.data_stack_mut().push(Value::blank());
    let checkpoint = session.snapshot();

    let inner = session.trap(|s| run(s, "x: 1 + none-such")).unwrap();
    let caught = inner.unwrap_err();
    assert!(caught.error.is(ErrorId::NoValue));
    assert_eq!(session.snapshot(), checkpoint);

    session.data_stack_mut().pop();
    session.drop_trap(outer);
}

#[test]
fn test_trap_passes_throws_through() {
    let mut session = Session::default();
    let before = session.snapshot();
    let result = session.trap(|s| run(s, "throw/name 10 'out"));
    let Err(Escape::Throw(thrown)) = result else {
        panic!("expected a throw");
    };
    assert_eq!(thrown.value, Value::integer(10));
    assert_eq!(thrown.label, Value::plain_word("out"));
    assert_eq!(session.snapshot(), before);
}

#[test]
fn test_halt_is_flagged() {
    let mut session = Session::default();
    let caught = session.trap(|s| run(s, "halt")).unwrap().unwrap_err();
    assert!(caught.halted);
    assert_eq!(caught.value().kind(), Kind::Error);
}

#[test]
fn test_failure_releases_argument_frames() {
    let mut session = Session::default();
    let manuals = session.heap().manuals_len();
    let caught = session
        .trap(|s| run(s, "add 1 multiply 2 divide 3 0"))
        .unwrap()
        .unwrap_err();
    assert!(caught.error.is(ErrorId::ZeroDivide));
    assert_eq!(session.heap().manuals_len(), manuals);
    assert_eq!(session.data_stack().len(), 0);
}

#[test]
#[should_panic(expected = "failure with no trap installed")]
fn test_fail_without_trap_panics() {
    let mut session = Session::default();
    let _ = session.fail(ErrorObject::user("nowhere to go"));
}
