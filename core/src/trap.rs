//! Traps and non-local exits.
//!
//! Evaluation returns [`EvalResult`]. A structured error travels as
//! [`Escape::Fail`]: by the time it is returned, [`Session::fail`] has
//! already unwound the frame stack and stored the error in the innermost
//! trap, so every function between the fail point and the trap just
//! propagates it with `?`. [`Session::resume`] then puts the remaining
//! shared state back the way the trap's checkpoint found it.

#[cfg(test)]
#[path = "trap_test.rs"]
mod trap_test;

use std::rc::Rc;

use tracing::debug;

use crate::checkpoint::Checkpoint;
use crate::error::{ErrorId, ErrorObject};
use crate::session::Session;
use crate::values::Value;

/// A value thrown to an enclosing catcher.
#[derive(Clone, Debug)]
pub struct Thrown {
    /// Name of the throw: blank for a plain THROW, a word for THROW/NAME, or
    /// an exit function for RETURN, LEAVE and QUIT.
    pub label: Value,
    pub value: Value,
}

#[derive(Debug)]
pub enum Escape {
    /// An error is in flight and has been recorded in the innermost trap.
    Fail,
    Throw(Box<Thrown>),
}

pub type EvalResult<T> = Result<T, Escape>;

pub(crate) struct Trap {
    checkpoint: Checkpoint,
    error: Option<Rc<ErrorObject>>,
}

/// Proof that a trap is installed; consumed by [`Session::drop_trap`] or
/// [`Session::resume`].
#[derive(Debug)]
#[must_use]
pub struct TrapHandle(usize);

/// An error delivered to a trap.
#[derive(Clone, Debug)]
pub struct Caught {
    pub error: Rc<ErrorObject>,
    /// The error is a halt request, which callers should re-raise.
    pub halted: bool,
}

impl Caught {
    pub fn value(&self) -> Value {
        Value::error_rc(self.error.clone())
    }
}

impl Session {
    pub fn push_trap(&mut self) -> TrapHandle {
        let checkpoint = self.snapshot();
        debug!(depth = self.traps.len(), "trap pushed");
        self.traps.push(Trap {
            checkpoint,
            error: None,
        });
        TrapHandle(self.traps.len() - 1)
    }

    /// Removes a trap whose body finished without failing.
    pub fn drop_trap(&mut self, handle: TrapHandle) {
        debug_assert_eq!(handle.0 + 1, self.traps.len(), "traps dropped out of order");
        if let Some(trap) = self.traps.pop() {
            self.assert_balanced(&trap.checkpoint);
        }
    }

    /// Raises `error`.
    ///
    /// Pops every frame above the innermost trap, releasing the argument
    /// frames of calls caught mid-flight, and records the error in that
    /// trap. The returned [`Escape::Fail`] must be propagated unchanged up
    /// to the code that installed the trap.
    ///
    /// # Panics
    ///
    /// Failing with no trap installed is unrecoverable and panics.
    pub fn fail(&mut self, error: impl Into<Rc<ErrorObject>>) -> Escape {
        let error = error.into();
        let Some(depth) = self.traps.last().map(|trap| trap.checkpoint.frame_depth) else {
            panic!("failure with no trap installed: {}", error);
        };
        debug!(code = error.code(), frames = self.frames.len().saturating_sub(depth), "fail");
        while self.frames.len() > depth {
            let Some(frame) = self.frames.pop() else {
                break;
            };
            if let Some(call) = frame.call {
                self.heap.free(&call.args);
            }
        }
        if let Some(trap) = self.traps.last_mut() {
            trap.error = Some(error);
        }
        Escape::Fail
    }

    /// Lands a failure on the trap `handle` and restores its checkpoint.
    pub fn resume(&mut self, handle: TrapHandle) -> Caught {
        debug_assert_eq!(handle.0 + 1, self.traps.len(), "resumed a trap that is not innermost");
        let Some(trap) = self.traps.pop() else {
            panic!("resume with no trap installed");
        };
        let checkpoint = trap.checkpoint;

        self.stack.truncate(checkpoint.dsp);
        self.chunks.truncate(checkpoint.top_chunk);
        if !self.collect_buf.is_empty() {
            debug!(keys = self.collect_buf.len(), "abandoning key collection");
            self.collect_buf.clear();
        }
        self.heap.free_manuals_to(checkpoint.manuals_len);
        self.heap.restore(
            checkpoint.series_guard_len,
            checkpoint.value_guard_len,
            checkpoint.gc_disabled,
        );
        self.frames.truncate(checkpoint.frame_depth);
        self.uni_buf.truncate(checkpoint.uni_buf_len);
        self.mold_stack.truncate(checkpoint.mold_stack_len);

        let error = trap.error.unwrap_or_else(|| {
            debug_assert!(false, "resume without a recorded error");
            Rc::new(ErrorObject::new(
                ErrorId::Misc,
                &[Value::string("resume without error")],
            ))
        });
        let halted = error.is(ErrorId::Halt);
        debug!(code = error.code(), halted, "trap resumed");
        self.assert_balanced(&checkpoint);
        Caught { error, halted }
    }

    /// Runs `body` under a trap.
    ///
    /// Failures come back as `Ok(Err(caught))`; throws pass through.
    pub fn trap<T>(
        &mut self,
        body: impl FnOnce(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<Result<T, Caught>> {
        let handle = self.push_trap();
        match body(self) {
            Ok(value) => {
                self.drop_trap(handle);
                Ok(Ok(value))
            }
            Err(Escape::Fail) => Ok(Err(self.resume(handle))),
            Err(Escape::Throw(thrown)) => {
                self.drop_trap(handle);
                Err(Escape::Throw(thrown))
            }
        }
    }
}
