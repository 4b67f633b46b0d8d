//! Path evaluation.
//!
//! A path starts from the value of its head and picks through the rest.
//! When a pick lands on a function and the path is being called, the
//! remaining segments are refinements and go to the data stack for
//! argument fulfillment, the first one on top.

use tracing::trace;

use super::frame::DoFlags;
use crate::context::read_var;
use crate::error::{ErrorId, ErrorObject};
use crate::session::Session;
use crate::trap::EvalResult;
use crate::values::{Kind, Series, Symbol, Value, Word, WordKind};

#[derive(Clone, Copy)]
pub(crate) enum PathMode<'a> {
    /// Functions found are to be called, segments after them are refinements.
    Call,
    /// Plain selection; functions are returned as values.
    Get,
    /// Assign to the last segment.
    Set(&'a Value),
}

pub(crate) struct PathValue {
    pub(crate) value: Value,
    /// Last word picked, used to label a call.
    pub(crate) label: Option<Symbol>,
}

impl Session {
    pub(crate) fn do_path(&mut self, path: &Value, mode: PathMode<'_>) -> EvalResult<PathValue> {
        let Some(series) = path.as_series() else {
            return Err(self.raise(ErrorId::InvalidPath, &[path.clone(), Value::blank()]));
        };
        let segments: Vec<Value> = series.values().collect();
        let Some(head) = segments.first() else {
            return Err(self.raise(ErrorId::InvalidPath, &[path.clone(), Value::blank()]));
        };

        let mut label = None;
        let mut current = match head.kind() {
            Kind::Word => {
                label = head.as_symbol().cloned();
                self.resolve_word(head)?
            }
            Kind::GetWord => self.resolve_word(head)?,
            Kind::Group => self.do_group(head)?,
            _ => head.clone(),
        };

        let last = segments.len() - 1;
        for (index, segment) in segments.iter().enumerate().skip(1) {
            if current.as_function().is_some() {
                return match mode {
                    PathMode::Call => {
                        self.push_refinements(path, &segments[index..])?;
                        Ok(PathValue {
                            value: current,
                            label,
                        })
                    }
                    PathMode::Get | PathMode::Set(_) => {
                        Err(self.raise(ErrorId::InvalidPath, &[path.clone(), segment.clone()]))
                    }
                };
            }

            let picker = match segment.kind() {
                Kind::Group => self.do_group(segment)?,
                Kind::GetWord => self.resolve_word(segment)?,
                _ => segment.clone(),
            };
            if let Some(symbol) = picker.as_symbol() {
                label = Some(symbol.clone());
            }

            if index == last {
                if let PathMode::Set(value) = mode {
                    self.poke(path, &current, &picker, value)?;
                    return Ok(PathValue {
                        value: value.clone(),
                        label,
                    });
                }
            }
            current = self.pick(path, &current, &picker)?;
        }

        if let PathMode::Set(_) = mode {
            return Err(self.raise(ErrorId::InvalidPath, &[path.clone(), Value::blank()]));
        }
        Ok(PathValue {
            value: current,
            label,
        })
    }

    fn resolve_word(&mut self, word: &Value) -> EvalResult<Value> {
        let Some(bound) = word.as_word() else {
            return Ok(word.clone());
        };
        match read_var(bound) {
            Ok(value) => Ok(value),
            Err(err) => Err(self.bind_fail(err)),
        }
    }

    fn do_group(&mut self, group: &Value) -> EvalResult<Value> {
        match group.as_series() {
            Some(series) => Ok(self.do_array(series, DoFlags::TO_END)?.value),
            None => Ok(Value::void()),
        }
    }

    /// Pushes refinement names, last segment first.
    fn push_refinements(&mut self, path: &Value, segments: &[Value]) -> EvalResult<()> {
        let mut names = Vec::with_capacity(segments.len());
        for segment in segments {
            let picker = match segment.kind() {
                Kind::Group => self.do_group(segment)?,
                _ => segment.clone(),
            };
            match picker.as_symbol() {
                Some(symbol) => names.push(symbol.clone()),
                // A group that computes nothing names no refinement.
                None if picker.is_void() || picker.is_blank() => {}
                None => {
                    return Err(self.raise(ErrorId::BadRefine, &[picker.clone()]));
                }
            }
        }
        trace!(path = %path, refinements = names.len(), "pushing refinements");
        for symbol in names.into_iter().rev() {
            self.stack
                .push(Value::word(WordKind::Refinement, Word::unbound(symbol)));
        }
        Ok(())
    }

    fn pick(&mut self, path: &Value, current: &Value, picker: &Value) -> EvalResult<Value> {
        if let Some(context) = current.as_context() {
            if let Some(symbol) = picker.as_symbol() {
                if let Some(index) = context.find(symbol) {
                    return Ok(context.get(index).unwrap_or_else(Value::void));
                }
            }
        } else if let Some(error) = current.as_error() {
            if let Some(symbol) = picker.as_symbol() {
                if let Some(value) = error_field(error, symbol) {
                    return Ok(value);
                }
            }
        } else if let (Some(series), Kind::Block) = (current.as_series(), current.kind()) {
            if let Some(position) = picker.as_integer() {
                return Ok(pick_index(series, position).unwrap_or_else(Value::blank));
            }
            if let Some(symbol) = picker.as_symbol() {
                let found = series
                    .values()
                    .position(|value| value.as_symbol() == Some(symbol));
                return Ok(found
                    .and_then(|offset| series.value_at(offset + 1))
                    .unwrap_or_else(Value::blank));
            }
        }
        Err(self.raise(ErrorId::InvalidPath, &[path.clone(), picker.clone()]))
    }

    fn poke(
        &mut self,
        path: &Value,
        current: &Value,
        picker: &Value,
        value: &Value,
    ) -> EvalResult<()> {
        if let (Some(context), Some(symbol)) = (current.as_context(), picker.as_symbol()) {
            if let Some(index) = context.find(symbol) {
                context.set(index, value.clone().quoted());
                return Ok(());
            }
        }
        Err(self.raise(ErrorId::InvalidPath, &[path.clone(), picker.clone()]))
    }
}

fn pick_index(series: &Series, position: i64) -> Option<Value> {
    let offset = usize::try_from(position).ok()?.checked_sub(1)?;
    series.value_at(offset)
}

fn error_field(error: &ErrorObject, field: &Symbol) -> Option<Value> {
    let word = |symbol: Option<&Symbol>| {
        symbol.map_or_else(Value::blank, |symbol| {
            Value::word(WordKind::Word, Word::unbound(symbol.clone()))
        })
    };
    match field.as_str().to_ascii_lowercase().as_str() {
        "code" => Some(Value::integer(error.code())),
        "type" => Some(word(error.category())),
        "id" => Some(word(error.id())),
        "message" => Some(Value::string(&error.message_text())),
        _ => error.arg(field.as_str()).cloned(),
    }
}
