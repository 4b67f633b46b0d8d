use super::register;
use crate::context::Context;
use crate::error::ErrorId;
use crate::evaluator::Call;
use crate::session::Session;
use crate::trap::EvalResult;
use crate::values::{Function, Kind, Output, Param, TypeSet, Value, Varargs};

pub(super) fn register_all(lib: &Context) {
    let handle = || vec![Param::normal("varargs").with_types(TypeSet::of(Kind::Varargs))];
    register(lib, "take", &Function::native(handle(), take), false);
    register(lib, "tail?", &Function::native(handle(), tail_q), false);

    let make = Function::native(
        vec![Param::normal("block").with_types(TypeSet::of(Kind::Block))],
        make_varargs,
    );
    register(lib, "make-varargs", &make, false);
}

fn handle(session: &mut Session, call: &Call) -> EvalResult<Varargs> {
    let value = call.arg(0);
    match value.as_varargs() {
        Some(varargs) => Ok(varargs.clone()),
        None => Err(session.raise(ErrorId::InvalidArg, &[value])),
    }
}

fn take(session: &mut Session, call: &Call) -> EvalResult<Output> {
    let varargs = handle(session, call)?;
    Ok(Output::VoidIfUnwritten(session.take_vararg(&varargs)?))
}

fn tail_q(session: &mut Session, call: &Call) -> EvalResult<Output> {
    let varargs = handle(session, call)?;
    let tail = session.vararg_tail(&varargs)?;
    Ok(if tail { Output::True } else { Output::False })
}

fn make_varargs(_: &mut Session, call: &Call) -> EvalResult<Output> {
    let block = call.arg(0);
    let Some(series) = block.as_series() else {
        return Ok(Output::Blank);
    };
    Ok(Output::Value(Value::varargs(Varargs::from_block(series.clone()))))
}
