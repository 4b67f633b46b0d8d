//! Pulling arguments through a [`Varargs`] handle.

use tracing::trace;

use super::frame::DoFlags;
use crate::error::ErrorId;
use crate::session::Session;
use crate::trap::EvalResult;
use crate::values::{Kind, ParamClass, Value, Varargs, VarargsSource};

impl Session {
    /// Takes the next argument, `None` once the source is exhausted.
    pub fn take_vararg(&mut self, varargs: &Varargs) -> EvalResult<Option<Value>> {
        let data = varargs.data();
        let taken = match &data.source {
            VarargsSource::Left(left) => left.borrow_mut().take(),
            VarargsSource::Block(series) => {
                let current = series.borrow().clone();
                if current.is_tail() {
                    None
                } else {
                    let step = self.do_array(&current, DoFlags::NEXT)?;
                    let mut position = series.borrow_mut();
                    position.index = step.next.unwrap_or(current.array.len());
                    Some(step.value)
                }
            }
            VarargsSource::Frame(id) => {
                let Some(owner) = self.frames.iter().rposition(|frame| frame.id == *id) else {
                    return Err(self.raise(ErrorId::VarargsNoStack, &[]));
                };
                let next_kind = self.frames[owner].feed.value.as_ref().map(Value::kind);
                match (next_kind, data.param.class) {
                    (None, _) | (Some(Kind::Bar), ParamClass::Normal) => None,
                    (Some(_), ParamClass::Normal) => Some(self.eval_child(owner, DoFlags::NEXT)?),
                    (Some(kind), ParamClass::SoftQuote) if kind.is_quotably_soft() => {
                        Some(self.eval_child(owner, DoFlags::NEXT_NO_LOOKAHEAD)?)
                    }
                    _ => self.frames[owner].feed.take().map(Value::quoted),
                }
            }
        };

        let Some(value) = taken else {
            return Ok(None);
        };
        trace!(label = %data.label, kind = %value.kind(), "vararg taken");
        if !data.param.types.contains(value.kind()) {
            let args = [
                Value::plain_word(data.label.as_str()),
                Value::plain_word(data.param.symbol.as_str()),
                Value::datatype(value.kind()),
            ];
            return Err(self.raise(ErrorId::ExpectArg, &args));
        }
        Ok(Some(value))
    }

    /// Whether nothing is left to take.
    pub fn vararg_tail(&mut self, varargs: &Varargs) -> EvalResult<bool> {
        match &varargs.data().source {
            VarargsSource::Left(left) => Ok(left.borrow().is_none()),
            VarargsSource::Block(series) => Ok(series.borrow().is_tail()),
            VarargsSource::Frame(id) => {
                let Some(owner) = self.frames.iter().rposition(|frame| frame.id == *id) else {
                    return Err(self.raise(ErrorId::VarargsNoStack, &[]));
                };
                Ok(self.frames[owner]
                    .feed
                    .value
                    .as_ref()
                    .is_none_or(Value::is_bar))
            }
        }
    }
}
