//! Tests for function values and parameters.

use pretty_assertions::assert_eq;

use crate::evaluator::Call;
use crate::session::Session;
use crate::trap::EvalResult;
use crate::values::{
    Function, FunctionValue, Kind, Output, Param, ParamClass, Symbol, TypeSet, Value,
};

fn noop(_: &mut Session, _: &Call) -> EvalResult<Output> {
    Ok(Output::Void)
}

#[test]
fn test_param_defaults() {
    assert_eq!(Param::normal("x").types, TypeSet::ANY_VALUE);
    assert_eq!(Param::refinement("only").types, TypeSet::of(Kind::Logic));
    assert_eq!(Param::local("tmp").types, TypeSet::ANY);
    assert!(!Param::normal("x").types.contains(Kind::Void));
    assert!(Param::normal("x").is_argument());
    assert!(!Param::refinement("only").is_argument());
    assert!(!Param::local("tmp").is_argument());
}

#[test]
fn test_param_builders() {
    let param = Param::soft_quote("arg").variadic().endable();
    assert_eq!(param.class, ParamClass::SoftQuote);
    assert!(param.variadic);
    assert!(param.endable);
}

#[test]
fn test_find_param_ignores_case() {
    let function = Function::native(
        vec![Param::normal("Value"), Param::refinement("only")],
        noop,
    );
    assert_eq!(function.find_param(&Symbol::new("value")), Some(0));
    assert_eq!(function.find_param(&Symbol::new("ONLY")), Some(1));
    assert_eq!(function.find_param(&Symbol::new("other")), None);
}

#[test]
fn test_specialize_keeps_underlying() {
    let function = Function::native(vec![Param::normal("a"), Param::normal("b")], noop);
    let specialized = function.specialize(vec![Some(Value::integer(1)), None]);

    assert!(!specialized.is(&function));
    assert_eq!(specialized.underlying(), function.underlying());
    assert!(specialized.is_specialized(0));
    assert!(!specialized.is_specialized(1));
    assert!(!function.is_specialized(0));
}

#[test]
fn test_function_values_compare_by_identity() {
    let function = Function::native(Vec::new(), noop);
    let other = Function::native(Vec::new(), noop);
    let value = Value::function(FunctionValue::new(function.clone()));

    assert_eq!(value, Value::function(function.into()));
    assert_ne!(value, Value::function(other.into()));
}
