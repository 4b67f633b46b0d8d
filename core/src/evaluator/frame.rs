//! Activation records.

use crate::context::Context;
use crate::values::{
    Array, ExitFrom, Function, Kind, Series, Specifier, Symbol, Value,
};

/// Identity of a frame, stable for its whole life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameId(pub(crate) u64);

/// How far a frame runs and what it is allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoFlags {
    /// Run every expression, not just one.
    pub to_end: bool,
    /// Evaluate arguments; off for EVAL/ONLY style application.
    pub args_evaluate: bool,
    /// Let an infix function after a result take it as its left argument.
    pub lookahead: bool,
}

impl DoFlags {
    pub const TO_END: DoFlags = DoFlags {
        to_end: true,
        args_evaluate: true,
        lookahead: true,
    };

    pub const NEXT: DoFlags = DoFlags {
        to_end: false,
        args_evaluate: true,
        lookahead: true,
    };

    pub const NEXT_NO_LOOKAHEAD: DoFlags = DoFlags {
        to_end: false,
        args_evaluate: true,
        lookahead: false,
    };
}

/// What the evaluator does with a cell, by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalType {
    Inert,
    Bar,
    LitBar,
    Word,
    SetWord,
    GetWord,
    LitWord,
    Group,
    Path,
    SetPath,
    GetPath,
    LitPath,
    Function,
}

impl EvalType {
    pub fn of(kind: Kind) -> EvalType {
        match kind {
            Kind::Bar => EvalType::Bar,
            Kind::LitBar => EvalType::LitBar,
            Kind::Word => EvalType::Word,
            Kind::SetWord => EvalType::SetWord,
            Kind::GetWord => EvalType::GetWord,
            Kind::LitWord => EvalType::LitWord,
            Kind::Group => EvalType::Group,
            Kind::Path => EvalType::Path,
            Kind::SetPath => EvalType::SetPath,
            Kind::GetPath => EvalType::GetPath,
            Kind::LitPath => EvalType::LitPath,
            Kind::Function => EvalType::Function,
            _ => EvalType::Inert,
        }
    }
}

/// Read cursor over an array.
///
/// `value` is the current cell, already specified; `index` is the position
/// of the cell after it. A frame whose arguments are being gathered lends
/// its feed to the child frame doing the gathering, leaving an empty one
/// behind.
#[derive(Default)]
pub(crate) struct Feed {
    pub(crate) array: Array,
    pub(crate) index: usize,
    pub(crate) specifier: Specifier,
    pub(crate) value: Option<Value>,
}

impl Feed {
    pub(crate) fn new(series: &Series) -> Self {
        let mut feed = Feed {
            array: series.array.clone(),
            index: series.index,
            specifier: series.specifier.clone(),
            value: None,
        };
        feed.fetch_next();
        feed
    }

    pub(crate) fn fetch_next(&mut self) {
        self.value = self
            .array
            .get(self.index)
            .map(|cell| cell.specify(&self.specifier));
        if self.value.is_some() {
            self.index += 1;
        }
    }

    pub(crate) fn is_end(&self) -> bool {
        self.value.is_none()
    }

    /// Takes the current value and moves on.
    pub(crate) fn take(&mut self) -> Option<Value> {
        let value = self.value.take();
        if value.is_some() {
            self.fetch_next();
        }
        value
    }

    /// Position of the current cell, or the length at the end.
    pub(crate) fn position(&self) -> usize {
        if self.value.is_some() {
            self.index - 1
        } else {
            self.array.len()
        }
    }

    /// Lent out to a child frame.
    pub(crate) fn is_detached(&self) -> bool {
        self.array.is_empty() && self.value.is_none()
    }
}

/// A function call in progress.
pub(crate) struct CallState {
    pub(crate) function: Function,
    pub(crate) exit_from: Option<ExitFrom>,
    pub(crate) args: Context,
    /// Parameter being gathered, `None` once the function is running.
    pub(crate) param: Option<usize>,
}

pub(crate) struct Frame {
    pub(crate) id: FrameId,
    pub(crate) feed: Feed,
    pub(crate) flags: DoFlags,
    /// Result so far; `None` means nothing has been produced.
    pub(crate) out: Option<Value>,
    pub(crate) eval_type: EvalType,
    pub(crate) label: Option<Symbol>,
    /// The call was reached through an infix binding.
    pub(crate) lookback: bool,
    /// Data stack depth when the current expression started.
    pub(crate) dsp_orig: usize,
    /// SET-WORD! or SET-PATH! whose right-hand side is being evaluated.
    pub(crate) assigning: Option<Value>,
    pub(crate) call: Option<CallState>,
}

impl Frame {
    pub(crate) fn new(id: FrameId, feed: Feed, flags: DoFlags, dsp: usize) -> Self {
        Frame {
            id,
            feed,
            flags,
            out: None,
            eval_type: EvalType::Inert,
            label: None,
            lookback: false,
            dsp_orig: dsp,
            assigning: None,
            call: None,
        }
    }

    pub(crate) fn is_fulfilling(&self) -> bool {
        self.eval_type == EvalType::Function
            && self.call.as_ref().is_some_and(|call| call.param.is_some())
    }

    pub(crate) fn is_running_function(&self) -> bool {
        self.eval_type == EvalType::Function
            && self.call.as_ref().is_some_and(|call| call.param.is_none())
    }
}

/// What a native dispatcher sees of its invocation.
pub struct Call {
    pub function: Function,
    pub args: Context,
    pub label: Option<Symbol>,
    pub exit_from: Option<ExitFrom>,
    pub frame: FrameId,
}

impl Call {
    /// Argument `index`, void if unset.
    pub fn arg(&self, index: usize) -> Value {
        self.args.get(index).unwrap_or_else(Value::void)
    }

    /// Whether refinement `index` was used.
    pub fn refinement(&self, index: usize) -> bool {
        self.arg(index).as_logic() == Some(true)
    }

    pub fn label(&self) -> Symbol {
        self.label.clone().unwrap_or_else(|| Symbol::new("anonymous"))
    }
}
