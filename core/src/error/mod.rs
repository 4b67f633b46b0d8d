//! Structured error objects.
//!
//! An [`ErrorObject`] is plain data: a numeric code, category and id words,
//! a message, the argument values the message refers to, and optionally the
//! location of the failure (the functions that were running and a snippet
//! of the source nearby). Raising one goes through the trap mechanism; see
//! [`Session::fail`](crate::Session::fail).

pub mod catalog;
mod make;

#[cfg(test)]
mod error_test;

use core::fmt;

use ecow::EcoString;

pub use catalog::{ErrorId, USER_CODE};

use crate::values::{Array, Molder, Symbol, Value};

/// One piece of a message.
#[derive(Clone, Debug)]
pub enum Part {
    Text(EcoString),
    /// Replaced by the argument of that name.
    Arg(Symbol),
    Value(Value),
}

#[derive(Clone, Debug)]
pub enum Message {
    None,
    Text(EcoString),
    Template(Vec<Part>),
}

impl Message {
    /// Splits a catalog template such as `":arg1 has no value"`.
    pub fn parse(template: &str) -> Message {
        let mut parts = Vec::new();
        let mut rest = template;
        while let Some(start) = rest.find(":arg") {
            let digits = rest[start + 4..]
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            if digits == 0 {
                parts.push(Part::Text(rest[..start + 4].into()));
                rest = &rest[start + 4..];
                continue;
            }
            if start > 0 {
                parts.push(Part::Text(rest[..start].into()));
            }
            let end = start + 4 + digits;
            parts.push(Part::Arg(Symbol::new(&rest[start + 1..end])));
            rest = &rest[end..];
        }
        if !rest.is_empty() {
            parts.push(Part::Text(rest.into()));
        }
        Message::Template(parts)
    }
}

#[derive(Clone, Debug)]
pub struct ErrorObject {
    code: i64,
    category: Option<Symbol>,
    id: Option<Symbol>,
    message: Message,
    args: Vec<(Symbol, Value)>,
    backtrace: Option<Vec<Symbol>>,
    near: Option<Array>,
}

impl ErrorObject {
    /// A catalogued error; `args` fill `:arg1`, `:arg2`, ... in order.
    pub fn new(id: ErrorId, args: &[Value]) -> Self {
        ErrorObject {
            code: id.code(),
            category: Some(Symbol::new(id.category())),
            id: Some(Symbol::new(id.id())),
            message: Message::parse(id.template()),
            args: args
                .iter()
                .enumerate()
                .map(|(i, value)| (Symbol::new(&format!("arg{}", i + 1)), value.clone()))
                .collect(),
            backtrace: None,
            near: None,
        }
    }

    /// A user error carrying just a message.
    pub fn user(message: &str) -> Self {
        ErrorObject {
            code: USER_CODE,
            category: Some(Symbol::new("user")),
            id: Some(Symbol::new("message")),
            message: Message::Text(message.into()),
            args: Vec::new(),
            backtrace: None,
            near: None,
        }
    }

    pub(crate) fn from_fields(
        code: i64,
        category: Option<Symbol>,
        id: Option<Symbol>,
        message: Message,
        args: Vec<(Symbol, Value)>,
    ) -> Self {
        ErrorObject {
            code,
            category,
            id,
            message,
            args,
            backtrace: None,
            near: None,
        }
    }

    pub fn code(&self) -> i64 {
        self.code
    }

    pub fn category(&self) -> Option<&Symbol> {
        self.category.as_ref()
    }

    pub fn id(&self) -> Option<&Symbol> {
        self.id.as_ref()
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn args(&self) -> &[(Symbol, Value)] {
        &self.args
    }

    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args
            .iter()
            .find(|(symbol, _)| symbol.is(name))
            .map(|(_, value)| value)
    }

    /// Labels of the functions that were running, innermost first.
    pub fn backtrace(&self) -> Option<&[Symbol]> {
        self.backtrace.as_deref()
    }

    pub fn near(&self) -> Option<&Array> {
        self.near.as_ref()
    }

    pub fn is(&self, id: ErrorId) -> bool {
        self.code == id.code()
    }

    pub fn has_location(&self) -> bool {
        self.backtrace.is_some() || self.near.is_some()
    }

    pub(crate) fn set_location(&mut self, backtrace: Vec<Symbol>, near: Option<Array>) {
        self.backtrace = Some(backtrace);
        self.near = near;
    }

    /// The message with its arguments substituted.
    pub fn message_text(&self) -> String {
        let mut buf = String::new();
        let mut stack = Vec::new();
        match &self.message {
            Message::None => {}
            Message::Text(text) => buf.push_str(text),
            Message::Template(parts) => {
                for part in parts {
                    match part {
                        Part::Text(text) => buf.push_str(text),
                        Part::Arg(name) => match self.arg(name.as_str()) {
                            Some(value) => Molder::new(&mut buf, &mut stack).forming().mold(value),
                            None => buf.push_str(name.as_str()),
                        },
                        Part::Value(value) => {
                            Molder::new(&mut buf, &mut stack).forming().mold(value)
                        }
                    }
                }
            }
        }
        buf
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "** {}: {}",
            catalog::description(self.code),
            self.message_text()
        )?;
        if let Some(backtrace) = self.backtrace.as_ref().filter(|labels| !labels.is_empty()) {
            f.write_str("\n** Where:")?;
            for label in backtrace {
                write!(f, " {}", label)?;
            }
        }
        if let Some(near) = &self.near {
            f.write_str("\n** Near: [")?;
            for (i, cell) in near.cells().iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", cell)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
