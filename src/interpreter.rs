//! Running source text on a long-lived session.

use rivet_core::{Completion, EvalOptions, InterruptHandle, Series, Session, Value};
use tracing::debug;

use crate::Error;

/// A session plus the conversions hosts need.
///
/// Definitions persist across [`run`](Interpreter::run) calls.
pub struct Interpreter {
    session: Session,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_options(EvalOptions::default())
    }

    pub fn with_options(options: EvalOptions) -> Self {
        Interpreter {
            session: Session::new(options),
        }
    }

    /// Loads and evaluates `source`, returning the value of its last
    /// expression.
    pub fn run(&mut self, source: &str) -> Result<Value, Error> {
        let array = self
            .session
            .load(source)
            .map_err(|err| Error::load(err, source))?;
        match self.session.run_array(&Series::new(array)) {
            Ok(Completion::Value(value)) => Ok(value),
            Ok(Completion::Quit(status)) => {
                debug!(status, "script quit");
                Err(Error::Quit { status })
            }
            Err(caught) if caught.halted => Err(Error::Halted),
            Err(caught) => Err(Error::Script(caught.error)),
        }
    }

    /// Source-like text for `value`.
    pub fn mold(&mut self, value: &Value) -> String {
        self.session.mold(value)
    }

    pub fn form(&mut self, value: &Value) -> String {
        self.session.form(value)
    }

    /// A handle other threads can use to halt a running script.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.session.interrupt_handle()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }
}
