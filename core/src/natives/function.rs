//! Making functions: FUNC, PROC, SPECIALIZE and the definitional exits.

use tracing::debug;

use super::register;
use crate::context::{Context, bind_deep, bind_relative, specify_deep};
use crate::error::ErrorId;
use crate::evaluator::{Call, DoFlags};
use crate::session::Session;
use crate::spec::{Exit, SpecError, parse_spec};
use crate::trap::{Escape, EvalResult, Thrown};
use crate::values::{
    FuncId, Function, FunctionFlags, FunctionValue, Kind, Output, Param, ParamClass,
    Series, TypeSet, Value,
};

pub(super) struct Exits {
    pub(super) exit: Function,
    pub(super) return_: Function,
    pub(super) leave: Function,
}

pub(super) fn register_all(lib: &Context) -> Exits {
    let maker = || {
        vec![
            Param::normal("spec").with_types(TypeSet::of(Kind::Block)),
            Param::normal("body").with_types(TypeSet::of(Kind::Block)),
        ]
    };
    register(lib, "func", &Function::native(maker(), func), false);
    register(lib, "proc", &Function::native(maker(), proc), false);

    let specialize = Function::native(
        vec![
            Param::normal("specializee").with_types(TypeSet::of(Kind::Function)),
            Param::normal("def").with_types(TypeSet::of(Kind::Block)),
        ],
        specialize,
    );
    register(lib, "specialize", &specialize, false);

    // RETURN and LEAVE are reached through the slots of the functions that
    // own them, but plain lookups of the words find these and fail.
    let return_ = Function::native(
        vec![Param::normal("value").with_types(TypeSet::ANY)],
        return_,
    );
    register(lib, "return", &return_, false);
    let leave = Function::native(Vec::new(), leave);
    register(lib, "leave", &leave, false);

    Exits {
        exit: Function::native(Vec::new(), exit),
        return_,
        leave,
    }
}

fn func(session: &mut Session, call: &Call) -> EvalResult<Output> {
    make_function(session, call, Exit::Return)
}

fn proc(session: &mut Session, call: &Call) -> EvalResult<Output> {
    make_function(session, call, Exit::Leave)
}

fn make_function(session: &mut Session, call: &Call, exit: Exit) -> EvalResult<Output> {
    let (spec, body) = (call.arg(0), call.arg(1));
    let (Some(spec_series), Some(body_series)) = (spec.as_series(), body.as_series()) else {
        return Err(session.raise(ErrorId::BadFuncDef, &[spec]));
    };
    let params = match parse_spec(spec_series, exit) {
        Ok(params) => params,
        Err(SpecError::Duplicate(symbol)) => {
            return Err(session.raise(ErrorId::DupVars, &[Value::plain_word(symbol.as_str())]));
        }
        Err(err) => {
            debug!(%err, "bad function spec");
            return Err(session.raise(ErrorId::BadFuncDef, &[spec]));
        }
    };

    let id = FuncId::fresh();
    let body = bind_relative(&specify_deep(body_series), &params, id);
    let flags = FunctionFlags {
        has_return: exit == Exit::Return,
        has_leave: exit == Exit::Leave,
        ..FunctionFlags::default()
    };
    debug!(params = params.len(), ?exit, "function made");
    let function = Function::interpreted(id, params, body, flags);
    Ok(Output::Value(Value::function(FunctionValue::new(function))))
}

fn return_(session: &mut Session, call: &Call) -> EvalResult<Output> {
    exit_with(session, call, call.arg(0))
}

fn leave(session: &mut Session, call: &Call) -> EvalResult<Output> {
    exit_with(session, call, Value::void())
}

/// Throws `value` at the call this exit belongs to.
fn exit_with(session: &mut Session, call: &Call, value: Value) -> EvalResult<Output> {
    let Some(exit_from) = call.exit_from.clone() else {
        return Err(session.raise(ErrorId::Return, &[]));
    };
    let label = Value::function(FunctionValue {
        function: session.natives.exit.clone(),
        exit_from: Some(exit_from),
    });
    Err(Escape::Throw(Box::new(Thrown { label, value })))
}

fn exit(session: &mut Session, _: &Call) -> EvalResult<Output> {
    Err(session.raise(ErrorId::Return, &[]))
}

fn specialize(session: &mut Session, call: &Call) -> EvalResult<Output> {
    let (specializee, def) = (call.arg(0), call.arg(1));
    let (Some(target), Some(series)) = (specializee.as_function(), def.as_series()) else {
        return Err(session.raise(ErrorId::InvalidArg, &[specializee]));
    };
    let function = target.function.clone();
    let params = function.params();

    let frame = session.heap.make_frame(function.underlying(), params);
    if let Some(exemplar) = function.exemplar() {
        for (index, slot) in exemplar.iter().enumerate() {
            if let Some(value) = slot {
                frame.set(index, value.clone());
            }
        }
    }
    let body = Series {
        array: bind_deep(&series.array, &frame),
        index: series.index,
        specifier: series.specifier.clone(),
    };

    session.heap.guard_context(&frame);
    let result = session.do_array(&body, DoFlags::TO_END);
    if matches!(result, Err(Escape::Fail)) {
        return Err(Escape::Fail);
    }
    session.heap.unguard_context(&frame);
    session.heap.manage(&frame);
    result?;

    let exemplar = params
        .iter()
        .enumerate()
        .map(|(index, param)| match param.class {
            ParamClass::Return | ParamClass::Leave => None,
            _ => frame.get(index).filter(|value| !value.is_void()),
        })
        .collect::<Vec<_>>();
    debug!(
        specialized = exemplar.iter().filter(|slot| slot.is_some()).count(),
        "function specialized"
    );
    let specialized = function.specialize(exemplar);
    Ok(Output::Value(Value::function(FunctionValue::new(specialized))))
}
