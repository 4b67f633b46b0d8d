//! Tests for argument fulfillment: refinements, pickups, revocation,
//! quoting, infix and variadics.

use pretty_assertions::assert_eq;

use crate::error::ErrorId;
use crate::evaluator::Call;
use crate::session::Session;
use crate::test_utils::{eval, init_test_logging};
use crate::trap::EvalResult;
use crate::values::{
    Function, FunctionValue, Kind, NativeFn, Output, Param, Symbol, TypeSet, Value,
};

/// Returns its own argument frame as an object.
fn probe(_: &mut Session, call: &Call) -> EvalResult<Output> {
    Ok(Output::Value(Value::object(call.args.clone())))
}

fn first(_: &mut Session, call: &Call) -> EvalResult<Output> {
    Ok(Output::Value(call.arg(0)))
}

/// Sums everything its variadic argument yields.
fn sum_all(session: &mut Session, call: &Call) -> EvalResult<Output> {
    let Some(varargs) = call.arg(0).as_varargs().cloned() else {
        return Ok(Output::Blank);
    };
    let mut total = 0;
    while let Some(value) = session.take_vararg(&varargs)? {
        total += value.as_integer().unwrap_or_default();
    }
    Ok(Output::Value(Value::integer(total)))
}

fn define(
    session: &mut Session,
    name: &str,
    params: Vec<Param>,
    dispatcher: NativeFn,
    infix: bool,
) {
    let function = Function::native(params, dispatcher);
    session.set_user(name, Value::function(FunctionValue::new(function)));
    let index = session.user().find(&Symbol::new(name)).unwrap();
    session.user().set_lookback(index, infix);
}

fn session() -> Session {
    init_test_logging();
    let mut session = Session::default();
    define(
        &mut session,
        "p",
        vec![
            Param::refinement("b"),
            Param::normal("c"),
            Param::refinement("d"),
            Param::normal("e"),
        ],
        probe,
        false,
    );
    define(
        &mut session,
        "p2",
        vec![
            Param::refinement("b"),
            Param::normal("c").with_types(TypeSet::ANY),
            Param::normal("d").with_types(TypeSet::ANY),
        ],
        probe,
        false,
    );
    define(
        &mut session,
        "n",
        vec![Param::normal("a").with_types(TypeSet::of(Kind::Integer))],
        first,
        false,
    );
    define(
        &mut session,
        "opt",
        vec![Param::normal("a").endable()],
        first,
        false,
    );
    define(&mut session, "hq", vec![Param::hard_quote("a")], first, false);
    define(&mut session, "sq", vec![Param::soft_quote("a")], first, false);
    define(
        &mut session,
        "qop",
        vec![Param::hard_quote("left"), Param::normal("right")],
        first,
        true,
    );
    define(
        &mut session,
        "sop",
        vec![Param::soft_quote("left"), Param::normal("right")],
        first,
        true,
    );
    define(
        &mut session,
        "sum-all",
        vec![Param::normal("values").variadic()],
        sum_all,
        false,
    );
    define(
        &mut session,
        "capture",
        vec![Param::normal("values").variadic()],
        first,
        false,
    );
    session
}

fn field(object: &Value, name: &str) -> Value {
    object.as_context().unwrap().select(&Symbol::new(name))
}

fn error_id(session: &mut Session, source: &str) -> ErrorId {
    let caught = eval(session, source).unwrap_err();
    crate::error::catalog::by_code(caught.error.code()).unwrap()
}

#[test]
fn test_unused_refinements_leave_args_void() {
    let mut session = session();
    let frame = eval(&mut session, "p").unwrap();
    assert_eq!(field(&frame, "b"), Value::logic(false));
    assert!(field(&frame, "c").is_void());
    assert_eq!(field(&frame, "d"), Value::logic(false));
    assert!(field(&frame, "e").is_void());
}

#[test]
fn test_refinements_in_order() {
    let mut session = session();
    let frame = eval(&mut session, "p/b/d 1 2").unwrap();
    assert_eq!(field(&frame, "b"), Value::logic(true));
    assert_eq!(field(&frame, "c"), Value::integer(1));
    assert_eq!(field(&frame, "e"), Value::integer(2));
}

#[test]
fn test_refinements_out_of_order_follow_the_path() {
    let mut session = session();
    let frame = eval(&mut session, "p/d/b 2 1").unwrap();
    assert_eq!(field(&frame, "b"), Value::logic(true));
    assert_eq!(field(&frame, "d"), Value::logic(true));
    assert_eq!(field(&frame, "c"), Value::integer(1));
    assert_eq!(field(&frame, "e"), Value::integer(2));
}

#[test]
fn test_single_refinement_skips_the_other() {
    let mut session = session();
    let frame = eval(&mut session, "p/d 5").unwrap();
    assert_eq!(field(&frame, "b"), Value::logic(false));
    assert!(field(&frame, "c").is_void());
    assert_eq!(field(&frame, "e"), Value::integer(5));
}

#[test]
fn test_unknown_and_duplicate_refinements() {
    let mut session = session();
    assert_eq!(error_id(&mut session, "p/z 1"), ErrorId::BadRefine);
    assert_eq!(error_id(&mut session, "p/b/b 1 2"), ErrorId::BadRefine);
    assert_eq!(session.data_stack().len(), 0);
}

#[test]
fn test_refinement_from_group_segment() {
    let mut session = session();
    let frame = eval(&mut session, "r: 'd p/(r) 3").unwrap();
    assert_eq!(field(&frame, "e"), Value::integer(3));

    let frame = eval(&mut session, "p/(_) ").unwrap();
    assert_eq!(field(&frame, "b"), Value::logic(false));
}

#[test]
fn test_void_first_argument_revokes() {
    let mut session = session();
    let frame = eval(&mut session, "p2/b () ()").unwrap();
    assert_eq!(field(&frame, "b"), Value::logic(false));
    assert!(field(&frame, "c").is_void());
    assert!(field(&frame, "d").is_void());
}

#[test]
fn test_partial_revocation_fails() {
    let mut session = session();
    assert_eq!(error_id(&mut session, "p2/b 1 ()"), ErrorId::BadRefineRevoke);
    assert_eq!(error_id(&mut session, "p2/b () 1"), ErrorId::ArgumentRevoked);
}

#[test]
fn test_missing_argument() {
    let mut session = session();
    let caught = eval(&mut session, "n").unwrap_err();
    assert!(caught.error.is(ErrorId::NoArg));
    assert_eq!(caught.error.arg("arg1"), Some(&Value::plain_word("n")));
    assert_eq!(caught.error.arg("arg2"), Some(&Value::plain_word("a")));
}

#[test]
fn test_barrier_stops_argument_gathering() {
    let mut session = session();
    assert_eq!(error_id(&mut session, "n | 1"), ErrorId::ExpressionBarrier);
    assert!(eval(&mut session, "opt | 1").is_ok());
    assert!(eval(&mut session, "opt").unwrap().is_void());
}

#[test]
fn test_argument_type_check() {
    let mut session = session();
    let caught = eval(&mut session, "n \"x\"").unwrap_err();
    assert!(caught.error.is(ErrorId::ExpectArg));
    assert_eq!(
        caught.error.arg("arg3"),
        Some(&Value::datatype(Kind::String))
    );
}

#[test]
fn test_hard_and_soft_quotes() {
    let mut session = session();
    assert_eq!(eval(&mut session, "hq (1 + 2)").unwrap().kind(), Kind::Group);
    assert_eq!(eval(&mut session, "sq (1 + 2)").unwrap(), Value::integer(3));
    assert_eq!(eval(&mut session, "sq x").unwrap(), Value::plain_word("x"));
    assert_eq!(
        eval(&mut session, "x: 7 sq :x").unwrap(),
        Value::integer(7)
    );
}

#[test]
fn test_infix_quote_of_evaluated_value_fails() {
    let mut session = session();
    assert_eq!(error_id(&mut session, "(1 + 1) qop 5"), ErrorId::InfixQuoteLate);
    assert_eq!(eval(&mut session, "<tag> qop 5").unwrap(), Value::tag("tag"));
}

#[test]
fn test_infix_soft_quote_of_set_word_fails() {
    let mut session = session();
    assert_eq!(error_id(&mut session, "x: sop 5"), ErrorId::InfixQuoteSet);
    let quoted = eval(&mut session, "y: qop 5 :y").unwrap();
    assert_eq!(quoted.kind(), Kind::SetWord);
}

#[test]
fn test_infix_at_start_has_no_left_argument() {
    let mut session = session();
    assert_eq!(error_id(&mut session, "qop 5"), ErrorId::NoArg);
    // The set-word is offered only to the expression assigned to it.
    assert_eq!(error_id(&mut session, "x: (qop 5)"), ErrorId::NoArg);
    assert_eq!(error_id(&mut session, "x: opt qop 5"), ErrorId::NoArg);
}

#[test]
fn test_variadic_takes_until_end() {
    let mut session = session();
    assert_eq!(eval(&mut session, "sum-all 1 2 3").unwrap(), Value::integer(6));
    assert_eq!(eval(&mut session, "(sum-all 1 2 + 3) + 4").unwrap(), Value::integer(10));
    assert_eq!(eval(&mut session, "sum-all 1 2 | 10").unwrap(), Value::integer(10));
}

#[test]
fn test_stale_varargs_fail() {
    let mut session = session();
    let caught = eval(&mut session, "v: do [capture] take v").unwrap_err();
    assert!(caught.error.is(ErrorId::VarargsNoStack));
}

#[test]
fn test_specialized_refinement() {
    let mut session = session();
    let frame = eval(&mut session, "pb: specialize :p [b: true] pb 1").unwrap();
    assert_eq!(field(&frame, "b"), Value::logic(true));
    assert_eq!(field(&frame, "c"), Value::integer(1));

    let frame = eval(&mut session, "pc: specialize :p [b: true c: 9] pc").unwrap();
    assert_eq!(field(&frame, "c"), Value::integer(9));
}

#[test]
fn test_specialized_refinement_must_be_logic() {
    let mut session = session();
    assert_eq!(
        error_id(&mut session, "bad: specialize :p [b: 1] bad 2"),
        ErrorId::NonLogicRefine
    );
}

#[test]
fn test_escaped_frames_are_managed() {
    let mut session = session();
    let manuals = session.heap().manuals_len();
    let frame = eval(&mut session, "p").unwrap();
    let context = frame.as_context().unwrap();
    assert!(context.is_accessible());
    assert!(session.heap().is_managed(context));
    assert_eq!(session.heap().manuals_len(), manuals);
}
