//! Rivet - an embeddable evaluator for a Rebol-family language
//!
//! # Overview
//!
//! Rivet evaluates code the way Rebol does: a block of values is walked left
//! to right, words are looked up, functions take as many arguments as their
//! spec asks for, and infix functions take the value on their left.
//!
//! The evaluator itself lives in [`rivet_core`]. This crate wraps it for
//! hosts: [`Interpreter`] runs source text, failures come back as [`Error`],
//! and the `render_error*` functions format them for humans.
//!
//! # Quick Start
//!
//! ```
//! use rivet::{Interpreter, Value};
//!
//! let mut interpreter = Interpreter::new();
//! let value = interpreter.run("add2: func [x] [x + 2]  add2 40").unwrap();
//! assert_eq!(value, Value::integer(42));
//! ```
//!
//! # Errors
//!
//! Script errors are structured objects with a category, an id, a message
//! and the location where they were raised:
//!
//! ```
//! use rivet::{Error, ErrorId, Interpreter};
//!
//! let mut interpreter = Interpreter::new();
//! match interpreter.run("1 / 0") {
//!     Err(Error::Script(error)) => assert!(error.is(ErrorId::ZeroDivide)),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

mod error;
mod error_renderer;
mod interpreter;

pub use error::Error;
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
pub use interpreter::Interpreter;

// Re-export the core API.
pub use rivet_core::{
    Caught, Completion, ErrorId, ErrorObject, EvalOptions, InterruptHandle, Kind, LoadError,
    Session, Value, exit_status,
};
pub use rivet_core::values;
