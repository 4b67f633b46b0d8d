//! TRAP, FAIL and MAKE-ERROR.

use tracing::debug;

use super::register;
use crate::context::Context;
use crate::error::ErrorObject;
use crate::evaluator::{Call, DoFlags};
use crate::session::Session;
use crate::trap::EvalResult;
use crate::values::{Function, Kind, Output, Param, TypeSet, Value};

pub(super) fn register_all(lib: &Context) {
    let trap = Function::native(
        vec![Param::normal("block").with_types(TypeSet::of(Kind::Block))],
        trap,
    );
    register(lib, "trap", &trap, false);

    let reason = TypeSet::of(Kind::Error)
        .with(Kind::String)
        .with(Kind::Block);
    let fail = Function::native(vec![Param::normal("reason").with_types(reason)], fail);
    register(lib, "fail", &fail, false);

    let make_error = Function::native(
        vec![Param::normal("spec").with_types(reason.with(Kind::Object))],
        make_error,
    );
    register(lib, "make-error", &make_error, false);
}

/// Runs a block, giving back the error it raised instead of failing. Halts
/// are not caught.
fn trap(session: &mut Session, call: &Call) -> EvalResult<Output> {
    let block = call.arg(0);
    let Some(series) = block.as_series() else {
        return Ok(Output::Void);
    };
    match session.trap(|session| session.do_array(series, DoFlags::TO_END))? {
        Ok(step) => Ok(Output::Value(step.value)),
        Err(caught) if caught.halted => {
            debug!("re-raising halt");
            Err(session.fail(caught.error))
        }
        Err(caught) => Ok(Output::Value(caught.value())),
    }
}

fn fail(session: &mut Session, call: &Call) -> EvalResult<Output> {
    let reason = call.arg(0);
    let mut error = match reason.kind() {
        Kind::String => ErrorObject::user(reason.as_str().unwrap_or_default()),
        _ => session.make_error(&reason)?,
    };
    session.locate(&mut error);
    Err(session.fail(error))
}

fn make_error(session: &mut Session, call: &Call) -> EvalResult<Output> {
    let error = session.make_error(&call.arg(0))?;
    Ok(Output::Value(Value::error(error)))
}
