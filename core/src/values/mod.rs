pub mod array;
pub mod display;
pub mod function;
pub mod kind;
pub mod symbol;
pub mod typeset;
pub mod value;
pub mod varargs;

pub use array::{Array, Series};
pub use display::Molder;
pub use function::{
    Body, ExitFrom, FuncId, Function, FunctionFlags, FunctionValue, NativeFn, Output, Param,
    ParamClass,
};
pub use kind::Kind;
pub use symbol::Symbol;
pub use typeset::TypeSet;
pub use value::{Binding, Cell, PathKind, Payload, SPECIFIED, Specifier, Value, Word, WordKind};
pub use varargs::Varargs;
pub(crate) use varargs::VarargsSource;

#[cfg(test)]
mod display_test;
#[cfg(test)]
mod function_test;
