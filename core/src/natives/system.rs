use super::register;
use crate::context::Context;
use crate::evaluator::Call;
use crate::session::Session;
use crate::trap::EvalResult;
use crate::values::{Function, Output, Value};

pub(super) fn register_all(lib: &Context) {
    register(lib, "recycle", &Function::native(Vec::new(), recycle), false);
    register(lib, "stack-depth", &Function::native(Vec::new(), stack_depth), false);
}

/// Sweeps the ledger and returns how many entries went away.
fn recycle(session: &mut Session, _: &Call) -> EvalResult<Output> {
    let swept = session.heap.recycle();
    Ok(Output::Value(Value::integer(swept as i64)))
}

/// Frames on the stack, the one calling STACK-DEPTH included.
fn stack_depth(session: &mut Session, _: &Call) -> EvalResult<Output> {
    Ok(Output::Value(Value::integer(session.frames.len() as i64)))
}
