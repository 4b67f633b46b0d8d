//! The per-frame state machine.

use tracing::{debug, trace};

use super::frame::{Call, CallState, DoFlags, EvalType};
use super::path::PathMode;
use crate::context::{Context, read_var, read_var_lookback, write_var};
use crate::error::ErrorId;
use crate::session::Session;
use crate::trap::{Escape, EvalResult, Thrown};
use crate::values::{
    Array, Body, ExitFrom, Function, FunctionValue, Kind, Output, PathKind, Series, Value,
    WordKind,
};

enum State {
    /// Start the next expression.
    DoNext,
    /// Evaluate this value as if it were the current cell.
    Reevaluate(Value),
    Call(FunctionValue),
    /// A result is in; see whether an infix function wants it.
    Lookahead,
    Finished,
}

impl Session {
    pub(crate) fn do_core(&mut self, top: usize) -> EvalResult<()> {
        let flags = self.frames[top].flags;
        let mut leftover = false;
        let mut state = State::DoNext;
        loop {
            state = match state {
                State::DoNext => {
                    self.tick()?;
                    leftover = false;
                    let dsp = self.stack.len();
                    let frame = &mut self.frames[top];
                    frame.flags.args_evaluate = flags.args_evaluate;
                    frame.dsp_orig = dsp;
                    frame.label = None;
                    frame.lookback = false;
                    match frame.feed.take() {
                        Some(value) => State::Reevaluate(value),
                        None => State::Finished,
                    }
                }
                State::Reevaluate(value) => {
                    leftover = false;
                    self.reevaluate(top, value)?
                }
                State::Call(function) => {
                    // An infix function that takes no arguments leaves the
                    // value to its left unconsumed.
                    leftover = self.frames[top].lookback
                        && !function.function.params().iter().any(|param| param.is_argument());
                    self.call_function(top, function)?
                }
                State::Lookahead => self.lookahead(top, leftover)?,
                State::Finished => return Ok(()),
            };
        }
    }

    fn reevaluate(&mut self, top: usize, value: Value) -> EvalResult<State> {
        let eval_type = EvalType::of(value.kind());
        self.frames[top].eval_type = eval_type;
        trace!(?eval_type, "evaluating");

        match eval_type {
            EvalType::Inert => {
                self.frames[top].out = Some(value.quoted());
                Ok(State::Lookahead)
            }

            EvalType::Bar => {
                let frame = &mut self.frames[top];
                frame.out = Some(Value::void());
                while frame.feed.value.as_ref().is_some_and(Value::is_bar) {
                    frame.feed.take();
                }
                if frame.flags.to_end && !frame.feed.is_end() {
                    Ok(State::DoNext)
                } else {
                    Ok(State::Finished)
                }
            }

            EvalType::LitBar => {
                self.frames[top].out = Some(Value::bar().evaluated());
                Ok(State::Lookahead)
            }

            EvalType::Word => {
                let Some(word) = value.as_word() else {
                    return Ok(State::Finished);
                };
                let (var, lookback) = match read_var_lookback(word) {
                    Ok(found) => found,
                    Err(err) => return Err(self.bind_fail(err)),
                };
                if let Some(function) = var.as_function() {
                    // Only the child that `assign_from_next` pushes sits
                    // directly above an assigning frame: groups, bodies and
                    // argument frames all start from a non-assigning parent.
                    let assigning = match top {
                        0 => None,
                        _ => self.frames[top - 1].assigning.clone(),
                    };
                    let frame = &mut self.frames[top];
                    frame.label = Some(word.symbol.clone());
                    frame.lookback = lookback;
                    if lookback {
                        // Nothing was evaluated on the left; an infix
                        // function may still see the set-word being assigned.
                        frame.out = assigning.map(Value::quoted);
                    }
                    return Ok(State::Call(function.clone()));
                }
                if var.is_void() {
                    return Err(self.raise(ErrorId::NoValue, &[value.clone()]));
                }
                let var = if self.options.lit_word_decay && var.kind() == Kind::LitWord {
                    var.with_word_kind(WordKind::Word).unwrap_or(var)
                } else {
                    var
                };
                self.frames[top].out = Some(var.evaluated());
                Ok(State::Lookahead)
            }

            EvalType::SetWord => {
                let Some(word) = value.as_word() else {
                    return Ok(State::Finished);
                };
                let rhs = self.assign_from_next(top, &value)?;
                if let Err(err) = write_var(word, rhs.clone()) {
                    return Err(self.bind_fail(err));
                }
                self.frames[top].out = Some(rhs.evaluated());
                Ok(State::Lookahead)
            }

            EvalType::GetWord => {
                let Some(word) = value.as_word() else {
                    return Ok(State::Finished);
                };
                let var = match read_var(word) {
                    Ok(var) => var,
                    Err(err) => return Err(self.bind_fail(err)),
                };
                self.frames[top].out = Some(var.evaluated());
                Ok(State::Lookahead)
            }

            EvalType::LitWord => {
                let word = value.with_word_kind(WordKind::Word).unwrap_or(value);
                self.frames[top].out = Some(word.evaluated());
                Ok(State::Lookahead)
            }

            EvalType::Group => {
                let Some(series) = value.as_series() else {
                    return Ok(State::Finished);
                };
                let step = self.do_array(series, DoFlags::TO_END)?;
                self.frames[top].out = Some(step.value.evaluated());
                Ok(State::Lookahead)
            }

            EvalType::Path => {
                let found = self.do_path(&value, PathMode::Call)?;
                if let Some(function) = found.value.as_function() {
                    self.frames[top].label = found.label;
                    return Ok(State::Call(function.clone()));
                }
                if found.value.is_void() {
                    return Err(self.raise(ErrorId::NoValue, &[value.clone()]));
                }
                self.frames[top].out = Some(found.value.evaluated());
                Ok(State::Lookahead)
            }

            EvalType::SetPath => {
                let rhs = self.assign_from_next(top, &value)?;
                self.do_path(&value, PathMode::Set(&rhs))?;
                self.frames[top].out = Some(rhs.evaluated());
                Ok(State::Lookahead)
            }

            EvalType::GetPath => {
                let found = self.do_path(&value, PathMode::Get)?;
                self.frames[top].out = Some(found.value.evaluated());
                Ok(State::Lookahead)
            }

            EvalType::LitPath => {
                let path = value.with_path_kind(PathKind::Path).unwrap_or(value);
                self.frames[top].out = Some(path.evaluated());
                Ok(State::Lookahead)
            }

            EvalType::Function => match value.as_function() {
                Some(function) => Ok(State::Call(function.clone())),
                None => Ok(State::Finished),
            },
        }
    }

    /// Evaluates the right-hand side of a SET-WORD! or SET-PATH!.
    fn assign_from_next(&mut self, top: usize, target: &Value) -> EvalResult<Value> {
        if self.frames[top].feed.is_end() {
            return Err(self.raise(ErrorId::NeedValue, &[target.clone()]));
        }
        self.frames[top].assigning = Some(target.clone());
        let result = self.eval_child(top, DoFlags::NEXT);
        if let Some(frame) = self.frames.get_mut(top) {
            frame.assigning = None;
        }
        let rhs = result?;
        if rhs.is_void() && self.options.void_set_is_error {
            return Err(self.raise(ErrorId::NeedValue, &[target.clone()]));
        }
        Ok(rhs)
    }

    fn lookahead(&mut self, top: usize, leftover: bool) -> EvalResult<State> {
        let frame = &self.frames[top];
        let more = frame.flags.to_end && !frame.feed.is_end();
        if !frame.flags.lookahead {
            return Ok(if more { State::DoNext } else { State::Finished });
        }

        let infix = frame
            .feed
            .value
            .as_ref()
            .filter(|next| next.kind() == Kind::Word)
            .and_then(Value::as_word)
            .and_then(|word| match read_var_lookback(word) {
                Ok((var, true)) => var
                    .as_function()
                    .map(|function| (word.symbol.clone(), function.clone())),
                _ => None,
            });

        let Some((symbol, function)) = infix else {
            return Ok(if more { State::DoNext } else { State::Finished });
        };
        if leftover {
            let word = Value::plain_word(symbol.as_str());
            return Err(self.raise(ErrorId::InfixLeftArgProhibited, &[word]));
        }
        trace!(label = %symbol, "infix lookahead");
        let frame = &mut self.frames[top];
        frame.feed.take();
        frame.label = Some(symbol);
        frame.lookback = true;
        Ok(State::Call(function))
    }

    fn call_function(&mut self, top: usize, value: FunctionValue) -> EvalResult<State> {
        let function = value.function;
        self.frames[top].eval_type = EvalType::Function;

        if function.underlying() == self.natives.eval.underlying() {
            return self.eval_retrigger(top);
        }

        if function.punctuates() && top > 0 {
            let prior = &self.frames[top - 1];
            if prior.is_fulfilling() || prior.assigning.is_some() {
                let label = self.label_word(top);
                return Err(self.raise(ErrorId::PunctuatorHit, &[label]));
            }
        }

        let args = self.heap.make_frame(function.underlying(), function.params());
        self.chunks.push(args.clone());
        debug!(
            label = %self.label_word(top),
            lookback = self.frames[top].lookback,
            "invoking function"
        );
        self.frames[top].call = Some(CallState {
            function: function.clone(),
            exit_from: value.exit_from,
            args,
            param: Some(0),
        });

        if let Err(escape) = self.fulfill_args(top) {
            if let Escape::Throw(_) = escape {
                self.drop_call(top);
            }
            return Err(escape);
        }
        if let Some(call) = self.frames[top].call.as_mut() {
            call.param = None;
        }

        let out = match self.dispatch(top) {
            Ok(out) => out,
            Err(escape) => {
                if let Escape::Throw(_) = escape {
                    self.drop_call(top);
                }
                return Err(escape);
            }
        };
        let out = self.finish_output(top, &function, out)?;

        self.drop_call(top);
        self.frames[top].out = Some(out);
        Ok(State::Lookahead)
    }

    /// EVAL takes its argument and runs it as though it were the next cell,
    /// without consuming any more input first.
    fn eval_retrigger(&mut self, top: usize) -> EvalResult<State> {
        if self.frames[top].feed.is_end() {
            let label = self.label_word(top);
            return Err(self.raise(ErrorId::NoArg, &[label, Value::plain_word("value")]));
        }

        let dsp_orig = self.frames[top].dsp_orig;
        let mut only = false;
        while self.stack.len() > dsp_orig {
            let Some(refinement) = self.stack.pop() else {
                break;
            };
            if only || !refinement.as_symbol().is_some_and(|symbol| symbol.is("only")) {
                return Err(self.raise(ErrorId::BadRefine, &[refinement]));
            }
            only = true;
        }

        let value = self.eval_child(top, DoFlags::NEXT)?;
        trace!(only, kind = %value.kind(), "eval retrigger");
        let frame = &mut self.frames[top];
        if only {
            frame.flags.args_evaluate = false;
        }
        frame.label = None;
        frame.lookback = false;
        Ok(State::Reevaluate(value))
    }

    /// Runs the dispatcher of the call in frame `top`, following redos and
    /// catching definitional exits aimed at this call.
    fn dispatch(&mut self, top: usize) -> EvalResult<Value> {
        let frame = &self.frames[top];
        let Some(state) = frame.call.as_ref() else {
            return Ok(Value::void());
        };
        let mut function = state.function.clone();
        let args = state.args.clone();
        let exit_from = state.exit_from.clone();
        let label = frame.label.clone();
        let id = frame.id;

        loop {
            let call = Call {
                function: function.clone(),
                args: args.clone(),
                label: label.clone(),
                exit_from: exit_from.clone(),
                frame: id,
            };
            let output = match function.body() {
                Body::Native(dispatcher) => dispatcher(self, &call),
                Body::Interpreted(body) => self.run_body(&function, body, &args),
            };
            drop(call);

            let output = match output {
                Ok(output) => output,
                Err(Escape::Throw(thrown)) => match self.catch_exit(&function, &args, thrown) {
                    Ok(value) => Output::Value(value),
                    Err(thrown) => return Err(Escape::Throw(thrown)),
                },
                Err(Escape::Fail) => return Err(Escape::Fail),
            };

            return Ok(match output {
                Output::Value(value) => value,
                Output::TrueIfWritten(written) => Value::logic(written.is_some()),
                Output::VoidIfUnwritten(written) => written.unwrap_or_else(Value::void),
                Output::Blank => Value::blank(),
                Output::Void => Value::void(),
                Output::True => Value::logic(true),
                Output::False => Value::logic(false),
                Output::Redo(next) => {
                    trace!(label = ?label, "redo");
                    function = next;
                    continue;
                }
            });
        }
    }

    fn run_body(
        &mut self,
        function: &Function,
        body: &Array,
        args: &Context,
    ) -> EvalResult<Output> {
        let series = Series {
            array: body.clone(),
            index: 0,
            specifier: Some(args.clone()),
        };
        let step = self.do_array(&series, DoFlags::TO_END)?;
        if function.flags().has_leave {
            Ok(Output::Void)
        } else {
            Ok(Output::Value(step.value))
        }
    }

    /// Takes the value of a RETURN or LEAVE throw aimed at this call.
    fn catch_exit(
        &self,
        function: &Function,
        args: &Context,
        thrown: Box<Thrown>,
    ) -> Result<Value, Box<Thrown>> {
        let Some(label) = thrown.label.as_function() else {
            return Err(thrown);
        };
        if label.function.underlying() != self.natives.exit.underlying() {
            return Err(thrown);
        }
        let ours = match &label.exit_from {
            Some(ExitFrom::Frame(frame)) => frame.is(args),
            Some(ExitFrom::Function(id)) => *id == function.underlying(),
            None => false,
        };
        if ours {
            debug!("definitional exit caught");
            Ok(thrown.value)
        } else {
            Err(thrown)
        }
    }

    fn finish_output(&mut self, top: usize, function: &Function, out: Value) -> EvalResult<Value> {
        if function.punctuates() {
            return Ok(Value::void());
        }
        if function.flags().has_return {
            if let Some(param) = function.return_param() {
                if !param.types.contains(out.kind()) {
                    let label = self.label_word(top);
                    return Err(self.raise(
                        ErrorId::ExpectArg,
                        &[
                            label,
                            Value::plain_word(param.symbol.as_str()),
                            Value::datatype(out.kind()),
                        ],
                    ));
                }
            }
        }
        let quoting = function.underlying() == self.natives.quote.underlying()
            || function.underlying() == self.natives.semiquote.underlying();
        Ok(if quoting { out.quoted() } else { out.evaluated() })
    }

    /// Ends the call in frame `top`: its argument frame becomes managed if
    /// anything still refers to it, and is freed otherwise.
    fn drop_call(&mut self, top: usize) {
        let Some(call) = self.frames[top].call.take() else {
            return;
        };
        let chunk = self.chunks.pop();
        debug_assert!(
            chunk.as_ref().is_some_and(|chunk| chunk.ptr_eq(&call.args)),
            "argument chunks released out of order"
        );
        drop(chunk);
        if call.args.strong_count() > 1 {
            self.heap.manage(&call.args);
        } else {
            self.heap.free(&call.args);
        }
    }
}
