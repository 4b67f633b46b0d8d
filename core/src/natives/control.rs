//! Evaluation control: quoting, EVAL, DO, throws and halting.

use tracing::debug;

use super::register;
use crate::context::Context;
use crate::error::ErrorId;
use crate::evaluator::{Call, DoFlags};
use crate::session::Session;
use crate::trap::{Escape, EvalResult, Thrown};
use crate::values::{
    Function, FunctionFlags, FunctionValue, Kind, Output, Param, Series, TypeSet, Value,
};

pub(super) struct Control {
    pub(super) eval: Function,
    pub(super) quote: Function,
    pub(super) semiquote: Function,
    pub(super) quit: Function,
}

pub(super) fn register_all(lib: &Context) -> Control {
    let quote = Function::native(vec![Param::hard_quote("value")], identity);
    register(lib, "quote", &quote, false);

    let semiquote = Function::native(vec![Param::normal("value").with_types(TypeSet::ANY)], identity);
    register(lib, "semiquote", &semiquote, false);

    // Never dispatched: the evaluator retriggers on its argument instead.
    let eval = Function::native(
        vec![Param::normal("value").with_types(TypeSet::ANY), Param::refinement("only")],
        identity,
    );
    register(lib, "eval", &eval, false);

    let do_ = Function::native(vec![Param::normal("source").with_types(TypeSet::ANY)], do_);
    register(lib, "do", &do_, false);

    let throw = Function::native(
        vec![
            Param::normal("value").with_types(TypeSet::ANY),
            Param::refinement("name"),
            Param::normal("name-value"),
        ],
        throw,
    );
    register(lib, "throw", &throw, false);

    let block = TypeSet::of(Kind::Block);
    let catch = Function::native(
        vec![
            Param::normal("block").with_types(block),
            Param::refinement("name"),
            Param::normal("names").with_types(
                TypeSet::of(Kind::Word).with(Kind::LitWord).with(Kind::Block),
            ),
        ],
        catch,
    );
    register(lib, "catch", &catch, false);

    let quit = Function::native(
        vec![Param::refinement("with"), Param::normal("value").with_types(TypeSet::ANY)],
        quit,
    );
    register(lib, "quit", &quit, false);

    let halt = Function::native(Vec::new(), halt);
    register(lib, "halt", &halt, false);

    let bar = Function::with_flags(
        Vec::new(),
        punctuate,
        FunctionFlags {
            punctuates: true,
            ..FunctionFlags::default()
        },
    );
    register(lib, "||", &bar, true);

    Control {
        eval,
        quote,
        semiquote,
        quit,
    }
}

fn identity(_: &mut Session, call: &Call) -> EvalResult<Output> {
    Ok(Output::Value(call.arg(0)))
}

fn do_(session: &mut Session, call: &Call) -> EvalResult<Output> {
    let source = call.arg(0);
    match source.kind() {
        Kind::Block | Kind::Group => {
            let Some(series) = source.as_series() else {
                return Ok(Output::Void);
            };
            let step = session.do_array(series, DoFlags::TO_END)?;
            Ok(Output::Value(step.value))
        }
        Kind::String => {
            let text = source.as_str().unwrap_or_default().to_string();
            match session.load(&text) {
                Ok(array) => {
                    let step = session.do_array(&Series::new(array), DoFlags::TO_END)?;
                    Ok(Output::Value(step.value))
                }
                Err(err) => {
                    Err(session.raise(ErrorId::NoLoad, &[Value::string(&err.to_string())]))
                }
            }
        }
        Kind::Varargs => {
            let Some(varargs) = source.as_varargs().cloned() else {
                return Ok(Output::Void);
            };
            let mut last = None;
            while let Some(value) = session.take_vararg(&varargs)? {
                last = Some(value);
            }
            Ok(Output::VoidIfUnwritten(last))
        }
        _ => Ok(Output::Value(source)),
    }
}

fn throw(_: &mut Session, call: &Call) -> EvalResult<Output> {
    let label = if call.refinement(1) {
        call.arg(2)
    } else {
        Value::blank()
    };
    debug!(label = %label, "throw");
    Err(Escape::Throw(Box::new(Thrown {
        label,
        value: call.arg(0),
    })))
}

/// Whether a CATCH with `names` (blank for a plain CATCH) takes `label`.
fn catches(names: &Value, label: &Value) -> bool {
    if names.is_blank() {
        return label.is_blank();
    }
    let Some(symbol) = label.as_symbol() else {
        return false;
    };
    match names.as_series() {
        Some(series) if names.kind() == Kind::Block => {
            series.values().any(|name| name.as_symbol() == Some(symbol))
        }
        _ => names.as_symbol() == Some(symbol),
    }
}

fn catch(session: &mut Session, call: &Call) -> EvalResult<Output> {
    let block = call.arg(0);
    let names = if call.refinement(1) {
        call.arg(2)
    } else {
        Value::blank()
    };
    let Some(series) = block.as_series() else {
        return Ok(Output::Void);
    };
    match session.do_array(series, DoFlags::TO_END) {
        Ok(step) => Ok(Output::Value(step.value)),
        Err(Escape::Throw(thrown)) if catches(&names, &thrown.label) => {
            debug!(label = %thrown.label, "throw caught");
            Ok(Output::Value(thrown.value))
        }
        Err(escape) => Err(escape),
    }
}

fn quit(_: &mut Session, call: &Call) -> EvalResult<Output> {
    let value = if call.refinement(0) {
        call.arg(1)
    } else {
        Value::void()
    };
    Err(Escape::Throw(Box::new(Thrown {
        label: Value::function(FunctionValue::new(call.function.clone())),
        value,
    })))
}

fn halt(session: &mut Session, _: &Call) -> EvalResult<Output> {
    Err(session.raise(ErrorId::Halt, &[]))
}

fn punctuate(_: &mut Session, _: &Call) -> EvalResult<Output> {
    Ok(Output::Void)
}
