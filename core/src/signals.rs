//! Asynchronous requests the evaluator polls for.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::error::ErrorId;
use crate::session::Session;
use crate::trap::EvalResult;

/// Lets another thread ask a running session to halt.
#[derive(Clone, Debug, Default)]
pub struct InterruptHandle(Arc<AtomicBool>);

impl InterruptHandle {
    pub fn request_halt(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Signals {
    pub(crate) halt: InterruptHandle,
    pub(crate) recycle: bool,
}

impl Session {
    /// Counts one evaluator step, polling signals every `signal_interval`.
    #[inline]
    pub(crate) fn tick(&mut self) -> EvalResult<()> {
        self.eval_count += 1;
        if self.countdown > 1 {
            self.countdown -= 1;
            return Ok(());
        }
        self.countdown = self.options.signal_interval.max(1);
        self.process_signals()
    }

    fn process_signals(&mut self) -> EvalResult<()> {
        if self.signals.recycle {
            self.signals.recycle = false;
            let before = self.snapshot();
            let swept = self.heap.recycle();
            debug!(swept, "recycle signal processed");
            self.assert_balanced(&before);
        }
        if self.signals.halt.take() {
            debug!("halt signal processed");
            return Err(self.raise(ErrorId::Halt, &[]));
        }
        Ok(())
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.signals.halt.clone()
    }

    /// Asks for a recycle at the next signal check.
    pub fn request_recycle(&mut self) {
        self.signals.recycle = true;
    }
}
