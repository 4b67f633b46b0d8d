//! Boot natives.
//!
//! Natives are grouped by concern; each group registers its functions in
//! the lib context. A few of them are known to the evaluator by identity
//! and are kept in [`Natives`].
//!
//! - Math: `add subtract multiply divide + - * / = equal?`
//! - Control: `quote semiquote eval do throw catch quit halt ||`
//! - Function: `func proc return leave specialize`
//! - Errors: `trap fail make-error`
//! - Varargs: `take tail? make-varargs`
//! - System: `recycle stack-depth`

mod control;
mod errors;
mod function;
mod math;
mod system;
mod varargs;


use tracing::trace;

use crate::context::Context;
use crate::values::{Function, FunctionValue, Kind, Value};

/// Natives the evaluator recognizes by identity.
pub(crate) struct Natives {
    pub(crate) eval: Function,
    /// Label of RETURN and LEAVE throws.
    pub(crate) exit: Function,
    pub(crate) return_: Function,
    pub(crate) leave: Function,
    pub(crate) quote: Function,
    pub(crate) semiquote: Function,
    pub(crate) quit: Function,
}

/// Fills `lib` with the natives and a few constants.
pub(crate) fn boot(lib: &Context) -> Natives {
    define(lib, "true", Value::logic(true));
    define(lib, "false", Value::logic(false));
    define(lib, "blank", Value::blank());
    for kind in Kind::ALL {
        define(lib, kind.name(), Value::datatype(*kind));
    }

    math::register_all(lib);
    system::register_all(lib);
    errors::register_all(lib);
    varargs::register_all(lib);
    let control = control::register_all(lib);
    let function = function::register_all(lib);

    Natives {
        eval: control.eval,
        exit: function.exit,
        return_: function.return_,
        leave: function.leave,
        quote: control.quote,
        semiquote: control.semiquote,
        quit: control.quit,
    }
}

fn define(lib: &Context, name: &str, value: Value) -> usize {
    let index = lib.append(name.into());
    lib.set(index, value);
    index
}

/// Defines `name` as `function`, as an infix function if `infix` is set.
fn register(lib: &Context, name: &str, function: &Function, infix: bool) {
    trace!(name, infix, "registering native");
    let index = define(lib, name, Value::function(FunctionValue::new(function.clone())));
    lib.set_lookback(index, infix);
}
