//! Argument fulfillment.
//!
//! Parameters are walked in declaration order. Refinements named by the
//! call-site path sit on the data stack, the first one on top. A refinement
//! found on top is consumed right away; one found deeper is used out of
//! order, so its arguments are skipped in the main walk and gathered in a
//! second "pickup" pass once the walk is done.

use smallvec::SmallVec;
use tracing::trace;

use super::frame::DoFlags;
use crate::context::Context;
use crate::error::ErrorId;
use crate::session::Session;
use crate::trap::EvalResult;
use crate::values::{
    Body, ExitFrom, Function, FunctionValue, Kind, Param, ParamClass, Value, Varargs, WordKind,
};

/// What the parameters after the last refinement are subject to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Refine {
    /// No refinement seen yet.
    Ordinary,
    /// The refinement is not in use; arguments stay void.
    Unused { slot: usize },
    /// In use; `slot` holds the refinement's switch.
    Active { slot: usize },
    /// Its first argument was void, so it was switched back off.
    Revoked { slot: usize },
    /// In use but named out of order; filled during pickups.
    Deferred,
}

impl Session {
    /// Fills the argument frame of the call in frame `top`.
    pub(crate) fn fulfill_args(&mut self, top: usize) -> EvalResult<()> {
        let Some((function, args)) = self.frames[top]
            .call
            .as_ref()
            .map(|call| (call.function.clone(), call.args.clone()))
        else {
            return Ok(());
        };
        let params = function.params();
        let dsp_orig = self.frames[top].dsp_orig;
        // Args of an infix call are evaluated without lookahead, which is
        // what makes infix chains run left to right.
        let lookahead = !self.frames[top].lookback;

        let mut refine = Refine::Ordinary;
        let mut pickups: SmallVec<[(usize, usize); 4]> = SmallVec::new();
        let mut doing_pickups = false;
        let mut index = 0;

        loop {
            if index >= params.len() {
                if self.stack.len() <= dsp_orig {
                    break;
                }
                let position = self.stack.len() - 1;
                let Some(entry) = self.stack.pop() else {
                    break;
                };
                let Some(found) = pickups.iter().position(|(at, _)| *at == position) else {
                    return Err(self.raise(ErrorId::BadRefine, &[entry]));
                };
                let (_, slot) = pickups.swap_remove(found);
                trace!(refinement = %params[slot].symbol, "picking up refinement");
                refine = Refine::Active { slot };
                doing_pickups = true;
                index = slot + 1;
                continue;
            }

            self.set_param(top, index);
            let param = &params[index];

            match param.class {
                ParamClass::Refinement => {
                    if doing_pickups {
                        index = params.len();
                        continue;
                    }
                    refine = self.refinement(&function, &args, index, dsp_orig, &mut pickups)?;
                    index += 1;
                    continue;
                }
                ParamClass::Local => {
                    args.set(index, Value::void());
                    index += 1;
                    continue;
                }
                ParamClass::Return | ParamClass::Leave => {
                    let exit = self.exit_value(&function, &args, param.class);
                    args.set(index, exit);
                    index += 1;
                    continue;
                }
                ParamClass::Normal | ParamClass::HardQuote | ParamClass::SoftQuote => {}
            }

            if refine == Refine::Deferred {
                index += 1;
                continue;
            }

            let arg = if let Some(value) = specialized(&function, index) {
                if self.frames[top].flags.args_evaluate && value.kind().is_quotably_soft() {
                    self.do_value(&value)?
                } else {
                    value
                }
            } else if matches!(refine, Refine::Unused { .. }) {
                args.set(index, Value::void());
                index += 1;
                continue;
            } else if param.variadic {
                let varargs = self.make_variadic(top, param);
                args.set(index, Value::varargs(varargs));
                index += 1;
                continue;
            } else {
                match self.take_arg(top, param, lookahead)? {
                    Some(value) => value,
                    None => {
                        args.set(index, Value::void());
                        index += 1;
                        continue;
                    }
                }
            };

            self.check_arg(top, &args, index, param, arg, &mut refine)?;
            index += 1;
        }

        Ok(())
    }

    fn set_param(&mut self, top: usize, index: usize) {
        if let Some(call) = self.frames[top].call.as_mut() {
            call.param = Some(index);
        }
    }

    /// Decides whether the refinement at `index` is in use.
    fn refinement(
        &mut self,
        function: &Function,
        args: &Context,
        index: usize,
        dsp_orig: usize,
        pickups: &mut SmallVec<[(usize, usize); 4]>,
    ) -> EvalResult<Refine> {
        let param = &function.params()[index];

        if let Some(value) = specialized(function, index) {
            let value = if value.kind().is_quotably_soft() {
                self.do_value(&value)?
            } else {
                value
            };
            if value.is_void() {
                args.set(index, Value::logic(false));
                return Ok(Refine::Unused { slot: index });
            }
            let Some(used) = value.as_logic() else {
                return Err(self.raise(
                    ErrorId::NonLogicRefine,
                    &[refinement_word(param), Value::datatype(value.kind())],
                ));
            };
            args.set(index, Value::logic(used));
            return Ok(if used {
                Refine::Active { slot: index }
            } else {
                Refine::Unused { slot: index }
            });
        }

        let named = |value: &Value| value.as_symbol() == Some(&param.symbol);

        if self.stack.len() > dsp_orig && self.stack.top().is_some_and(named) {
            self.stack.pop();
            args.set(index, Value::logic(true));
            return Ok(Refine::Active { slot: index });
        }

        let below_top = self.stack.len().saturating_sub(1);
        for position in (dsp_orig..below_top).rev() {
            let pending = pickups.iter().any(|(at, _)| *at == position);
            if !pending && self.stack.get(position).is_some_and(named) {
                trace!(refinement = %param.symbol, position, "refinement used out of order");
                pickups.push((position, index));
                args.set(index, Value::logic(true));
                return Ok(Refine::Deferred);
            }
        }

        args.set(index, Value::logic(false));
        Ok(Refine::Unused { slot: index })
    }

    /// The RETURN or LEAVE value placed in a definitional exit slot.
    fn exit_value(&self, function: &Function, args: &Context, class: ParamClass) -> Value {
        let flags = function.flags();
        let native = match class {
            ParamClass::Return if flags.has_return => &self.natives.return_,
            ParamClass::Leave if flags.has_leave => &self.natives.leave,
            _ => return Value::void(),
        };
        // Interpreted functions have a frame context worth pointing at;
        // natives exit from whichever call of theirs is running.
        let exit_from = match function.body() {
            Body::Interpreted(_) => ExitFrom::Frame(args.downgrade()),
            Body::Native(_) => ExitFrom::Function(function.underlying()),
        };
        Value::function(FunctionValue {
            function: native.clone(),
            exit_from: Some(exit_from),
        })
    }

    fn make_variadic(&mut self, top: usize, param: &Param) -> Varargs {
        let label = self.frames[top].label.clone().unwrap_or_else(|| "anonymous".into());
        let frame = &mut self.frames[top];
        if frame.lookback {
            frame.lookback = false;
            let left = frame.out.take();
            Varargs::from_left(left, param.clone(), label)
        } else {
            Varargs::from_frame(frame.id, param.clone(), label)
        }
    }

    /// Consumes one argument for `param`.
    ///
    /// `None` means the argument was legitimately absent and is void without
    /// a type check.
    fn take_arg(
        &mut self,
        top: usize,
        param: &Param,
        lookahead: bool,
    ) -> EvalResult<Option<Value>> {
        if self.frames[top].lookback {
            self.frames[top].lookback = false;
            let Some(left) = self.frames[top].out.take() else {
                if param.endable {
                    return Ok(None);
                }
                return Err(self.no_arg(top, param));
            };
            match param.class {
                ParamClass::HardQuote | ParamClass::SoftQuote => {
                    if left.is_evaluated() {
                        let label = self.label_word(top);
                        return Err(self.raise(ErrorId::InfixQuoteLate, &[label]));
                    }
                    if param.class == ParamClass::SoftQuote
                        && matches!(left.kind(), Kind::SetWord | Kind::SetPath)
                    {
                        let label = self.label_word(top);
                        return Err(self.raise(ErrorId::InfixQuoteSet, &[label]));
                    }
                }
                _ => {}
            }
            trace!(param = %param.symbol, "took left argument");
            return Ok(Some(left));
        }

        let args_evaluate = self.frames[top].flags.args_evaluate;
        let next_kind = self.frames[top].feed.value.as_ref().map(Value::kind);
        match next_kind {
            None => {
                if param.endable {
                    return Ok(None);
                }
                return Err(self.no_arg(top, param));
            }
            Some(Kind::Bar) if args_evaluate => {
                if param.endable {
                    return Ok(None);
                }
                return Err(self.raise(ErrorId::ExpressionBarrier, &[]));
            }
            Some(_) => {}
        }

        let value = match param.class {
            ParamClass::Normal if args_evaluate => {
                let flags = if lookahead {
                    DoFlags::NEXT
                } else {
                    DoFlags::NEXT_NO_LOOKAHEAD
                };
                self.eval_child(top, flags)?
            }
            ParamClass::SoftQuote
                if args_evaluate && next_kind.is_some_and(Kind::is_quotably_soft) =>
            {
                self.eval_child(top, DoFlags::NEXT_NO_LOOKAHEAD)?
            }
            _ => self.frames[top]
                .feed
                .take()
                .map(Value::quoted)
                .unwrap_or_else(Value::void),
        };
        trace!(param = %param.symbol, kind = %value.kind(), "took argument");
        Ok(Some(value))
    }

    /// Stores `arg`, handling refinement revocation and type checking.
    fn check_arg(
        &mut self,
        top: usize,
        args: &Context,
        index: usize,
        param: &Param,
        arg: Value,
        refine: &mut Refine,
    ) -> EvalResult<()> {
        if arg.is_void() {
            match *refine {
                Refine::Ordinary => {}
                Refine::Active { slot } => {
                    if slot + 1 != index {
                        return Err(self.raise(
                            ErrorId::BadRefineRevoke,
                            &[refinement_word(&args_param(args, slot)), param_word(param)],
                        ));
                    }
                    trace!(param = %param.symbol, "refinement revoked");
                    args.set(slot, Value::logic(false));
                    args.set(index, Value::void());
                    *refine = Refine::Revoked { slot };
                    return Ok(());
                }
                Refine::Unused { .. } | Refine::Revoked { .. } | Refine::Deferred => {
                    args.set(index, Value::void());
                    return Ok(());
                }
            }
        } else if let Refine::Unused { slot } | Refine::Revoked { slot } = *refine {
            return Err(self.raise(
                ErrorId::ArgumentRevoked,
                &[refinement_word(&args_param(args, slot)), param_word(param)],
            ));
        }

        if !param.types.contains(arg.kind()) {
            let label = self.label_word(top);
            return Err(self.raise(
                ErrorId::ExpectArg,
                &[label, param_word(param), Value::datatype(arg.kind())],
            ));
        }
        args.set(index, arg);
        Ok(())
    }

    fn no_arg(&mut self, top: usize, param: &Param) -> crate::trap::Escape {
        let label = self.label_word(top);
        self.raise(ErrorId::NoArg, &[label, param_word(param)])
    }

    pub(crate) fn label_word(&self, top: usize) -> Value {
        let label = self.frames[top].label.clone();
        Value::plain_word(label.as_ref().map_or("anonymous", |label| label.as_str()))
    }
}

fn specialized(function: &Function, index: usize) -> Option<Value> {
    function
        .exemplar()
        .and_then(|slots| slots.get(index))
        .and_then(Clone::clone)
}

fn param_word(param: &Param) -> Value {
    Value::plain_word(param.symbol.as_str())
}

fn refinement_word(param: &Param) -> Value {
    Value::plain_word(param.symbol.as_str())
        .with_word_kind(WordKind::Refinement)
        .unwrap_or_else(|| param_word(param))
}

fn args_param(args: &Context, slot: usize) -> Param {
    Param::refinement(args.key(slot).as_ref().map_or("refinement", |symbol| symbol.as_str()))
}
