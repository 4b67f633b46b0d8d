//! The interpreter session: every stack the evaluator mutates lives here.

use tracing::debug;

use crate::context::{Context, ContextKind};
use crate::error::{ErrorId, ErrorObject};
use crate::evaluator::{DoFlags, Frame, FrameId};
use crate::heap::Heap;
use crate::load::{self, LoadError};
use crate::natives::{self, Natives};
use crate::options::EvalOptions;
use crate::signals::Signals;
use crate::stack::DataStack;
use crate::trap::{Caught, Escape, EvalResult, Trap};
use crate::values::{Array, Molder, Series, Symbol, Value};

const DATA_STACK_LIMIT: usize = 1 << 16;

/// How a top-level run ended when it did not fail.
#[derive(Clone, Debug, PartialEq)]
pub enum Completion {
    Value(Value),
    /// QUIT was called; carries the exit status.
    Quit(i64),
}

pub struct Session {
    pub(crate) options: EvalOptions,
    pub(crate) stack: DataStack,
    /// Argument frames of calls in progress, innermost last.
    pub(crate) chunks: Vec<Context>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) heap: Heap,
    pub(crate) traps: Vec<Trap>,
    pub(crate) collect_buf: Vec<Symbol>,
    pub(crate) uni_buf: String,
    pub(crate) mold_stack: Vec<Context>,
    pub(crate) signals: Signals,
    pub(crate) countdown: usize,
    pub(crate) eval_count: u64,
    next_frame_id: u64,
    pub(crate) lib: Context,
    pub(crate) user: Context,
    pub(crate) natives: Natives,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(EvalOptions::default())
    }
}

impl Session {
    pub fn new(options: EvalOptions) -> Self {
        let mut heap = Heap::new();
        let lib = heap.make_managed(ContextKind::Object);
        let user = heap.make_managed(ContextKind::Object);
        let natives = natives::boot(&lib);
        debug!(words = lib.len(), "session booted");
        Session {
            countdown: options.signal_interval.max(1),
            options,
            stack: DataStack::new(DATA_STACK_LIMIT),
            chunks: Vec::new(),
            frames: Vec::new(),
            heap,
            traps: Vec::new(),
            collect_buf: Vec::new(),
            uni_buf: String::new(),
            mold_stack: Vec::new(),
            signals: Signals::default(),
            eval_count: 0,
            next_frame_id: 0,
            lib,
            user,
            natives,
        }
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// Context holding the natives.
    pub fn lib(&self) -> &Context {
        &self.lib
    }

    /// Context that loaded code binds into.
    pub fn user(&self) -> &Context {
        &self.user
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn data_stack(&self) -> &DataStack {
        &self.stack
    }

    pub fn data_stack_mut(&mut self) -> &mut DataStack {
        &mut self.stack
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    pub fn eval_count(&self) -> u64 {
        self.eval_count
    }

    pub(crate) fn next_frame_id(&mut self) -> FrameId {
        self.next_frame_id += 1;
        FrameId(self.next_frame_id)
    }

    /// Scans and binds source text: set-words go to the user context, other
    /// words to the user context if defined there, else lib, else a new
    /// user variable.
    pub fn load(&mut self, source: &str) -> Result<Array, LoadError> {
        let array = load::scan(source)?;
        Ok(load::bind_words(&array, &self.lib, &self.user))
    }

    /// Defines `name` in the user context.
    pub fn set_user(&mut self, name: &str, value: Value) {
        let index = self.user.append(Symbol::new(name));
        self.user.set(index, value);
    }

    pub fn get_user(&self, name: &str) -> Value {
        self.user.select(&Symbol::new(name))
    }

    /// Source-like text for a value, built in the session's scratch buffer.
    pub fn mold(&mut self, value: &Value) -> String {
        let start = self.uni_buf.len();
        Molder::new(&mut self.uni_buf, &mut self.mold_stack).mold(value);
        let text = self.uni_buf[start..].to_string();
        self.uni_buf.truncate(start);
        text
    }

    /// Like [`mold`](Self::mold), but strings lose their quotes.
    pub fn form(&mut self, value: &Value) -> String {
        let start = self.uni_buf.len();
        Molder::new(&mut self.uni_buf, &mut self.mold_stack)
            .forming()
            .mold(value);
        let text = self.uni_buf[start..].to_string();
        self.uni_buf.truncate(start);
        text
    }

    /// Starts collecting distinct keys into the collect buffer.
    pub(crate) fn begin_collect(&mut self) {
        debug_assert!(self.collect_buf.is_empty(), "nested key collection");
    }

    pub(crate) fn collect_key(&mut self, symbol: Symbol) {
        if !self.collect_buf.contains(&symbol) {
            self.collect_buf.push(symbol);
        }
    }

    pub(crate) fn end_collect(&mut self) -> Vec<Symbol> {
        std::mem::take(&mut self.collect_buf)
    }

    /// Loads and runs `source` under a trap, turning uncaught throws into
    /// errors.
    pub fn run(&mut self, source: &str) -> Result<Completion, Caught> {
        let array = match self.load(source) {
            Ok(array) => array,
            Err(err) => {
                let error = ErrorObject::new(ErrorId::NoLoad, &[Value::string(&err.to_string())]);
                return Err(Caught {
                    error: error.into(),
                    halted: false,
                });
            }
        };
        self.run_array(&Series::new(array))
    }

    /// Runs already loaded code to the end under a trap.
    pub fn run_array(&mut self, series: &Series) -> Result<Completion, Caught> {
        let result = self.trap(|session| match session.do_array(series, DoFlags::TO_END) {
            Ok(step) => Ok(Completion::Value(step.value)),
            Err(Escape::Throw(thrown)) => session.uncaught(*thrown),
            Err(Escape::Fail) => Err(Escape::Fail),
        });
        match result {
            Ok(outcome) => outcome,
            Err(_) => {
                // Throws are converted inside the trap body.
                Err(Caught {
                    error: ErrorObject::new(ErrorId::Misc, &[Value::string("escaped throw")]).into(),
                    halted: false,
                })
            }
        }
    }

    fn uncaught(&mut self, thrown: crate::trap::Thrown) -> EvalResult<Completion> {
        if self.is_quit_label(&thrown.label) {
            return Ok(Completion::Quit(exit_status(&thrown.value)));
        }
        if thrown.label.is_blank() {
            Err(self.raise(ErrorId::NoCatch, &[thrown.value]))
        } else {
            Err(self.raise(ErrorId::NoCatchNamed, &[thrown.value, thrown.label]))
        }
    }

    pub(crate) fn is_quit_label(&self, label: &Value) -> bool {
        label
            .as_function()
            .is_some_and(|function| function.function.is(&self.natives.quit))
    }
}

/// Process exit status for a QUIT value.
pub fn exit_status(value: &Value) -> i64 {
    if let Some(number) = value.as_integer() {
        return number;
    }
    if value.is_void() || value.is_blank() {
        return 0;
    }
    match value.as_error() {
        Some(error) => error.code(),
        None => 1,
    }
}
