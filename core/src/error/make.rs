//! Building error objects: catalogued errors raised by the evaluator, and
//! errors made from user data.

use tracing::debug;

use super::catalog::{self, ErrorId, USER_CODE};
use super::{ErrorObject, Message, Part};
use crate::context::{BindError, ContextKind, bind_deep, set_word_symbols};
use crate::evaluator::DoFlags;
use crate::session::Session;
use crate::trap::{Escape, EvalResult};
use crate::values::{Array, Cell, Kind, Series, Symbol, Value, Word};

/// Fields every error made from a block has, in this order.
const STANDARD_FIELDS: &[&str] = &[
    "code", "type", "id", "message", "near", "where", "arg1", "arg2", "arg3",
];

impl Session {
    /// A catalogued error located at the current point of evaluation.
    pub fn error(&mut self, id: ErrorId, args: &[Value]) -> ErrorObject {
        let mut error = ErrorObject::new(id, args);
        self.locate(&mut error);
        error
    }

    /// Fails with a catalogued error.
    pub fn raise(&mut self, id: ErrorId, args: &[Value]) -> Escape {
        let error = self.error(id, args);
        self.fail(error)
    }

    pub(crate) fn bind_fail(&mut self, err: BindError) -> Escape {
        match err {
            BindError::NotBound(symbol) => {
                self.raise(ErrorId::NotBound, &[Value::plain_word(symbol.as_str())])
            }
            BindError::Inaccessible(symbol) => {
                self.raise(ErrorId::Expired, &[Value::plain_word(symbol.as_str())])
            }
        }
    }

    /// Fills in where and near, unless the error already has a location.
    pub fn locate(&mut self, error: &mut ErrorObject) {
        if error.has_location() {
            return;
        }
        let backtrace = self.where_labels();
        let near = self.near_snippet();
        error.set_location(backtrace, near);
    }

    /// Labels of the functions that are running (not still gathering their
    /// arguments), innermost first.
    pub(crate) fn where_labels(&self) -> Vec<Symbol> {
        self.frames
            .iter()
            .rev()
            .filter(|frame| frame.is_running_function())
            .map(|frame| {
                frame
                    .label
                    .clone()
                    .unwrap_or_else(|| Symbol::new("anonymous"))
            })
            .collect()
    }

    /// Cells around the read position of the innermost frame that owns a
    /// feed, with `??` just after the cell being evaluated.
    pub(crate) fn near_snippet(&self) -> Option<Array> {
        let feed = &self
            .frames
            .iter()
            .rev()
            .find(|frame| !frame.feed.is_detached())?
            .feed;
        let index = feed.index as isize;
        let mut start = index - 3;
        let mut cells = Vec::with_capacity(self.options.near_width + 3);
        if start < 0 {
            cells.push(marker("..."));
            start = 0;
        }
        let start = start as usize;
        let items = feed.array.cells().get(start..).unwrap_or(&[]);

        let mut count = 0;
        for cell in items.iter().take(self.options.near_width) {
            cells.push(Cell::from(cell.specify(&feed.specifier)));
            count += 1;
            if count == feed.index.saturating_sub(start) {
                cells.push(marker("??"));
            }
        }
        if items.len() > count {
            cells.push(marker("..."));
        }
        Some(Array::new(cells))
    }

    /// MAKE ERROR!: builds an error object from an error, an object, a
    /// block of field assignments, or a message string.
    pub fn make_error(&mut self, spec: &Value) -> EvalResult<ErrorObject> {
        if let Some(error) = spec.as_error() {
            return Ok(ErrorObject::clone(error));
        }
        if let Some(text) = spec.as_str().filter(|_| spec.kind() == Kind::String) {
            return Ok(ErrorObject::user(text));
        }

        let fields = if let Some(context) = spec.as_context() {
            context.fields().collect::<Vec<_>>()
        } else if let (Kind::Block, Some(series)) = (spec.kind(), spec.as_series()) {
            self.error_fields_from_block(series)?
        } else {
            return Err(self.raise(ErrorId::InvalidError, &[spec.clone()]));
        };

        match validate(&fields) {
            Some(error) => {
                debug!(code = error.code(), "error made");
                Ok(error)
            }
            None => Err(self.raise(ErrorId::InvalidError, &[spec.clone()])),
        }
    }

    /// Runs `series` as the body of an object with the standard error
    /// fields plus its own set-words, and returns the resulting fields.
    fn error_fields_from_block(&mut self, series: &Series) -> EvalResult<Vec<(Symbol, Value)>> {
        self.begin_collect();
        for name in STANDARD_FIELDS {
            self.collect_key(Symbol::new(name));
        }
        for symbol in set_word_symbols(series) {
            self.collect_key(symbol);
        }
        let keys = self.end_collect();

        let context = self.heap.make_context(ContextKind::Object, None);
        for key in keys {
            let index = context.append(key);
            context.set(index, Value::blank());
        }
        let body = Series {
            array: bind_deep(&series.array, &context),
            index: series.index,
            specifier: series.specifier.clone(),
        };

        self.heap.guard_context(&context);
        let result = self.do_array(&body, DoFlags::TO_END);
        if matches!(result, Err(Escape::Fail)) {
            return Err(Escape::Fail);
        }
        self.heap.unguard_context(&context);
        self.heap.manage(&context);
        result?;
        Ok(context.fields().collect())
    }
}

fn marker(spelling: &str) -> Cell {
    Cell::from(Value::plain_word(spelling))
}

/// Absent, void and blank fields all count as blank.
fn field<'a>(fields: &'a [(Symbol, Value)], name: &str) -> Option<&'a Value> {
    fields
        .iter()
        .find(|(symbol, _)| symbol.is(name))
        .map(|(_, value)| value)
        .filter(|value| !value.is_void() && !value.is_blank())
}

fn word_field(fields: &[(Symbol, Value)], name: &str) -> Result<Option<Symbol>, ()> {
    match field(fields, name) {
        None => Ok(None),
        Some(value) => match value.kind() {
            Kind::Word | Kind::LitWord => Ok(value.as_symbol().cloned()),
            _ => Err(()),
        },
    }
}

/// Checks code, type, id and message against each other and the catalog.
fn validate(fields: &[(Symbol, Value)]) -> Option<ErrorObject> {
    let category = word_field(fields, "type").ok()?;
    let id = word_field(fields, "id").ok()?;
    let message = field(fields, "message");
    let args: Vec<(Symbol, Value)> = fields
        .iter()
        .filter(|(symbol, value)| {
            !value.is_void() && !["code", "type", "id", "message", "near", "where"]
                .iter()
                .any(|standard| symbol.is(standard))
        })
        .cloned()
        .collect();

    let catalogued = |entry: ErrorId| {
        ErrorObject::from_fields(
            entry.code(),
            Some(Symbol::new(entry.category())),
            Some(Symbol::new(entry.id())),
            Message::parse(entry.template()),
            args.clone(),
        )
    };

    let error = match field(fields, "code") {
        Some(code) => {
            let code = code.as_integer()?;
            if code >= USER_CODE {
                ErrorObject::from_fields(code, category, id, user_message(message)?, args.clone())
            } else {
                if message.is_some() {
                    return None;
                }
                let entry = catalog::by_code(code)?;
                if category.as_ref().is_some_and(|name| !name.is(entry.category()))
                    || id.as_ref().is_some_and(|name| !name.is(entry.id()))
                {
                    return None;
                }
                catalogued(entry)
            }
        }
        None => match (&category, &id) {
            (Some(category_name), Some(id_name)) if catalog::category(category_name).is_some() => {
                if message.is_some() {
                    return None;
                }
                catalogued(catalog::by_name(category_name, id_name)?)
            }
            // Unknown categories belong to users.
            _ => ErrorObject::from_fields(
                USER_CODE,
                category.clone(),
                id.clone(),
                user_message(message)?,
                args.clone(),
            ),
        },
    };

    if error.code() == USER_CODE && error.category().is_none() && error.id().is_none() {
        return Some(ErrorObject::from_fields(
            USER_CODE,
            Some(Symbol::new("user")),
            Some(Symbol::new("message")),
            error.message().clone(),
            args,
        ));
    }
    Some(error)
}

/// A user-supplied message: a string, or a block whose strings are text
/// and whose words name arguments.
fn user_message(message: Option<&Value>) -> Option<Message> {
    let Some(message) = message else {
        return Some(Message::None);
    };
    match message.kind() {
        Kind::String => Some(Message::Text(message.as_str()?.into())),
        Kind::Block => {
            let series = message.as_series()?;
            let mut parts = Vec::new();
            for (i, item) in series.values().enumerate() {
                if i > 0 {
                    parts.push(Part::Text(" ".into()));
                }
                parts.push(match (item.kind(), item.as_word()) {
                    (Kind::String, _) => Part::Text(item.as_str().unwrap_or_default().into()),
                    (_, Some(Word { symbol, .. })) if item.kind() == Kind::Word => {
                        Part::Arg(symbol.clone())
                    }
                    _ => Part::Value(item.quoted()),
                });
            }
            Some(Message::Template(parts))
        }
        _ => None,
    }
}
