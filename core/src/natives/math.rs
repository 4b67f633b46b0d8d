//! Arithmetic and comparison.

use super::register;
use crate::context::Context;
use crate::error::ErrorId;
use crate::evaluator::Call;
use crate::session::Session;
use crate::trap::EvalResult;
use crate::values::{Function, Kind, Output, Param, Payload, TypeSet, Value};

const NUMBER: TypeSet = TypeSet::of(Kind::Integer).with(Kind::Decimal);

#[derive(Clone, Copy, Debug)]
enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
}

pub(super) fn register_all(lib: &Context) {
    let binary = || {
        vec![
            Param::normal("value1").with_types(NUMBER),
            Param::normal("value2").with_types(NUMBER),
        ]
    };
    let natives: [(&str, &str, fn(&mut Session, &Call) -> EvalResult<Output>); 4] = [
        ("add", "+", add),
        ("subtract", "-", subtract),
        ("multiply", "*", multiply),
        ("divide", "/", divide),
    ];
    for (prefix, infix, dispatcher) in natives {
        let function = Function::native(binary(), dispatcher);
        register(lib, prefix, &function, false);
        register(lib, infix, &function, true);
    }

    let equal = Function::native(vec![Param::normal("value1"), Param::normal("value2")], equal);
    register(lib, "equal?", &equal, false);
    register(lib, "=", &equal, true);
}

fn add(session: &mut Session, call: &Call) -> EvalResult<Output> {
    arithmetic(session, call, Op::Add)
}

fn subtract(session: &mut Session, call: &Call) -> EvalResult<Output> {
    arithmetic(session, call, Op::Subtract)
}

fn multiply(session: &mut Session, call: &Call) -> EvalResult<Output> {
    arithmetic(session, call, Op::Multiply)
}

fn divide(session: &mut Session, call: &Call) -> EvalResult<Output> {
    arithmetic(session, call, Op::Divide)
}

fn arithmetic(session: &mut Session, call: &Call, op: Op) -> EvalResult<Output> {
    let (left, right) = (call.arg(0), call.arg(1));
    if let (Some(a), Some(b)) = (left.as_integer(), right.as_integer()) {
        let result = match op {
            Op::Add => a.checked_add(b),
            Op::Subtract => a.checked_sub(b),
            Op::Multiply => a.checked_mul(b),
            Op::Divide => {
                if b == 0 {
                    return Err(session.raise(ErrorId::ZeroDivide, &[]));
                }
                match a.checked_rem(b) {
                    None => None,
                    Some(0) => a.checked_div(b),
                    Some(_) => return Ok(Output::Value(Value::decimal(a as f64 / b as f64))),
                }
            }
        };
        return match result {
            Some(number) => Ok(Output::Value(Value::integer(number))),
            None => Err(session.raise(ErrorId::Overflow, &[])),
        };
    }

    let (Some(a), Some(b)) = (as_decimal(&left), as_decimal(&right)) else {
        return Err(session.raise(ErrorId::InvalidArg, &[left]));
    };
    let result = match op {
        Op::Add => a + b,
        Op::Subtract => a - b,
        Op::Multiply => a * b,
        Op::Divide => {
            if b == 0.0 {
                return Err(session.raise(ErrorId::ZeroDivide, &[]));
            }
            a / b
        }
    };
    if !result.is_finite() {
        return Err(session.raise(ErrorId::Overflow, &[]));
    }
    Ok(Output::Value(Value::decimal(result)))
}

fn as_decimal(value: &Value) -> Option<f64> {
    match value.as_integer() {
        Some(number) => Some(number as f64),
        None => match value.payload() {
            Payload::Decimal(number) => Some(*number),
            _ => None,
        },
    }
}

fn equal(_: &mut Session, call: &Call) -> EvalResult<Output> {
    Ok(Output::Value(Value::logic(call.arg(0) == call.arg(1))))
}
