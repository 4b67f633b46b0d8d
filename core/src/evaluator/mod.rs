//! The evaluator.
//!
//! Evaluation runs frames. A frame walks a feed of cells through a small
//! state machine ([`eval`]), gathering arguments for calls with the protocol
//! in [`args`]. Argument expressions run in child frames that borrow the
//! parent's feed, so nested expressions do not recurse through Rust calls
//! except for groups and function bodies.
//!
//! ## Example
//!
//! ```
//! use rivet_core::{DoFlags, Series, Session};
//!
//! let mut session = Session::default();
//! let code = session.load("1 + 2 * 3").unwrap();
//! let mut result = None;
//! session
//!     .trap(|session| {
//!         result = Some(session.do_array(&Series::new(code), DoFlags::TO_END)?.value);
//!         Ok(())
//!     })
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(result.and_then(|value| value.as_integer()), Some(9));
//! ```

mod args;
mod eval;
mod frame;
mod path;
mod varargs;

#[cfg(test)]
mod args_test;
#[cfg(test)]
mod eval_test;

pub use frame::{Call, DoFlags, EvalType, FrameId};
pub(crate) use frame::{CallState, Feed, Frame};

use core::mem;

use crate::error::ErrorId;
use crate::session::Session;
use crate::trap::{Escape, EvalResult};
use crate::values::{Array, Cell, Series, Value};

/// Remaining native stack below which a frame runs on a freshly grown segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Outcome of running a frame.
#[derive(Clone, Debug)]
pub struct Step {
    pub value: Value,
    /// Index of the first unconsumed cell, `None` at the end.
    pub next: Option<usize>,
}

impl Session {
    /// Evaluates `series` from its index, one expression or all of them
    /// depending on `flags`.
    pub fn do_array(&mut self, series: &Series, flags: DoFlags) -> EvalResult<Step> {
        self.check_depth()?;
        let id = self.next_frame_id();
        let frame = Frame::new(id, Feed::new(series), flags, self.stack.len());
        self.run_frame(frame)
    }

    /// Evaluates a single value as if it were the only cell of a block.
    pub fn do_value(&mut self, value: &Value) -> EvalResult<Value> {
        let array = Array::new(vec![Cell::from(value.clone())]);
        let step = self.do_array(&Series::new(array), DoFlags::NEXT_NO_LOOKAHEAD)?;
        Ok(step.value)
    }

    pub(crate) fn check_depth(&mut self) -> EvalResult<()> {
        if self.frames.len() >= self.options.max_depth {
            return Err(self.raise(ErrorId::StackOverflow, &[]));
        }
        Ok(())
    }

    fn run_frame(&mut self, frame: Frame) -> EvalResult<Step> {
        let dsp = frame.dsp_orig;
        self.frames.push(frame);
        let top = self.frames.len() - 1;
        let result = self.run_core(top);
        if let Err(Escape::Fail) = result {
            return Err(Escape::Fail);
        }
        let frame = self.pop_frame(top)?;
        if let Err(thrown) = result {
            self.stack.truncate(dsp);
            return Err(thrown);
        }
        let next = (!frame.feed.is_end()).then(|| frame.feed.position());
        Ok(Step {
            value: frame.out.unwrap_or_else(Value::void),
            next,
        })
    }

    /// Runs one expression from the feed of frame `parent` in a child frame.
    pub(crate) fn eval_child(&mut self, parent: usize, flags: DoFlags) -> EvalResult<Value> {
        self.check_depth()?;
        let feed = mem::take(&mut self.frames[parent].feed);
        let id = self.next_frame_id();
        let dsp = self.stack.len();
        self.frames.push(Frame::new(id, feed, flags, dsp));
        let top = self.frames.len() - 1;
        let result = self.run_core(top);
        if let Err(Escape::Fail) = result {
            return Err(Escape::Fail);
        }
        let child = self.pop_frame(top)?;
        self.frames[parent].feed = child.feed;
        if let Err(thrown) = result {
            self.stack.truncate(dsp);
            return Err(thrown);
        }
        Ok(child.out.unwrap_or_else(Value::void))
    }

    /// Runs frame `top`, growing the native stack first when it runs low so
    /// deep recursion reaches the `max_depth` check instead of aborting.
    fn run_core(&mut self, top: usize) -> EvalResult<()> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.do_core(top))
    }

    fn pop_frame(&mut self, top: usize) -> EvalResult<Frame> {
        debug_assert_eq!(top + 1, self.frames.len(), "frames popped out of order");
        match self.frames.pop() {
            Some(frame) => Ok(frame),
            None => Err(self.raise(ErrorId::Misc, &[Value::string("frame stack underflow")])),
        }
    }
}
