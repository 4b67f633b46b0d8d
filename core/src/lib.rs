//! Evaluator core for the Rivet language.
//!
//! A [`Session`] owns every stack the evaluator touches: frames, the data
//! stack, argument chunks, the allocation ledger, guard stacks and traps.
//! Code is loaded into cells with [`Session::load`] and run with
//! [`Session::do_array`] or, under a trap, [`Session::run`].
//!
//! ```
//! use rivet_core::{Completion, Session, Value};
//!
//! let mut session = Session::default();
//! let result = session.run("double: func [x] [x * 2]  double 21").unwrap();
//! assert_eq!(result, Completion::Value(Value::integer(42)));
//! ```

pub mod checkpoint;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod heap;
pub mod load;
mod natives;
pub mod options;
pub mod session;
pub mod signals;
pub mod spec;
pub mod stack;
pub mod trap;
pub mod values;

pub use checkpoint::Checkpoint;
pub use context::{BindError, Context, ContextKind};
pub use error::{ErrorId, ErrorObject, USER_CODE};
pub use evaluator::{Call, DoFlags, EvalType, FrameId, Step};
pub use heap::Heap;
pub use load::LoadError;
pub use options::EvalOptions;
pub use session::{Completion, Session, exit_status};
pub use signals::InterruptHandle;
pub use stack::DataStack;
pub use trap::{Caught, Escape, EvalResult, Thrown, TrapHandle};
pub use values::{
    Array, Function, FunctionValue, Kind, Output, Param, ParamClass, Series, Symbol, TypeSet,
    Value, Varargs, WordKind,
};
