//! The error type hosts see.

use std::rc::Rc;

use miette::{Diagnostic, SourceSpan};
use rivet_core::{ErrorObject, LoadError};
use thiserror::Error;

/// Why [`Interpreter::run`](crate::Interpreter::run) did not produce a value.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    /// The source text could not be loaded.
    #[error("could not load source: {error}")]
    #[diagnostic(code(rivet::load))]
    Load {
        error: LoadError,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },

    /// Evaluation raised an error that nothing trapped.
    #[error("{0}")]
    #[diagnostic(code(rivet::script))]
    Script(Rc<ErrorObject>),

    /// A halt was requested while the code ran.
    #[error("halted")]
    #[diagnostic(code(rivet::halted))]
    Halted,

    /// The code called QUIT.
    #[error("quit with status {status}")]
    #[diagnostic(code(rivet::quit))]
    Quit { status: i64 },
}

impl Error {
    pub(crate) fn load(error: LoadError, source: &str) -> Self {
        let span = error.span();
        Error::Load {
            error,
            src: source.to_string(),
            span: (span.start, span.len()).into(),
        }
    }

    /// `category/id` of a script error, e.g. `math/zero-divide`.
    pub fn script_id(&self) -> Option<String> {
        let Error::Script(error) = self else {
            return None;
        };
        let name = |symbol: Option<&rivet_core::Symbol>| {
            symbol.map_or_else(|| "_".to_string(), |symbol| symbol.as_str().to_string())
        };
        Some(format!("{}/{}", name(error.category()), name(error.id())))
    }

    /// The process exit status this outcome maps to.
    pub fn exit_status(&self) -> i64 {
        match self {
            Error::Quit { status } => *status,
            Error::Script(error) => error.code().max(1),
            Error::Load { .. } | Error::Halted => 1,
        }
    }
}
