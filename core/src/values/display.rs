//! Molding: turning values back into source text.

use core::fmt;

use super::{Cell, Kind, ParamClass, PathKind, Payload, TypeSet, Value, WordKind};
use crate::context::Context;

/// Writes values into a shared buffer.
///
/// `stack` holds the objects currently being molded, so that an object
/// reachable from itself is written as `...` instead of recursing forever.
pub struct Molder<'a> {
    buf: &'a mut String,
    stack: &'a mut Vec<Context>,
    form: bool,
}

impl<'a> Molder<'a> {
    pub fn new(buf: &'a mut String, stack: &'a mut Vec<Context>) -> Self {
        Molder {
            buf,
            stack,
            form: false,
        }
    }

    /// FORM style: strings and tags are written without delimiters.
    pub fn forming(mut self) -> Self {
        self.form = true;
        self
    }

    pub fn mold(&mut self, value: &Value) {
        self.payload(value.payload());
    }

    pub fn mold_cell(&mut self, cell: &Cell) {
        self.payload(cell.payload());
    }

    fn payload(&mut self, payload: &Payload) {
        match payload {
            Payload::Void => {}
            Payload::Blank => self.buf.push('_'),
            Payload::Logic(flag) => self.buf.push_str(if *flag { "true" } else { "false" }),
            Payload::Bar => self.buf.push('|'),
            Payload::LitBar => self.buf.push_str("'|"),
            Payload::Integer(number) => self.buf.push_str(&number.to_string()),
            Payload::Decimal(number) => {
                let text = number.to_string();
                self.buf.push_str(&text);
                if number.is_finite() && !text.contains(['.', 'e']) {
                    self.buf.push_str(".0");
                }
            }
            Payload::String(text) if self.form => self.buf.push_str(text),
            Payload::String(text) => self.string(text),
            Payload::Tag(text) => {
                self.buf.push('<');
                self.buf.push_str(text);
                self.buf.push('>');
            }
            Payload::Word(kind, word) => {
                let (prefix, suffix) = match kind {
                    WordKind::Word => ("", ""),
                    WordKind::SetWord => ("", ":"),
                    WordKind::GetWord => (":", ""),
                    WordKind::LitWord => ("'", ""),
                    WordKind::Refinement => ("/", ""),
                };
                self.buf.push_str(prefix);
                self.buf.push_str(word.symbol.as_str());
                self.buf.push_str(suffix);
            }
            Payload::Block(series) => self.cells('[', series.cells(), ' ', ']'),
            Payload::Group(series) => self.cells('(', series.cells(), ' ', ')'),
            Payload::Path(kind, series) => {
                match kind {
                    PathKind::GetPath => self.buf.push(':'),
                    PathKind::LitPath => self.buf.push('\''),
                    PathKind::Path | PathKind::SetPath => {}
                }
                for (i, cell) in series.cells().iter().enumerate() {
                    if i > 0 {
                        self.buf.push('/');
                    }
                    self.mold_cell(cell);
                }
                if *kind == PathKind::SetPath {
                    self.buf.push(':');
                }
            }
            Payload::Function(value) => {
                self.buf.push_str("#[function! [");
                let mut first = true;
                for param in value.function.params() {
                    let prefix = match param.class {
                        ParamClass::Normal => "",
                        ParamClass::HardQuote => "'",
                        ParamClass::SoftQuote => ":",
                        ParamClass::Refinement => "/",
                        ParamClass::Local | ParamClass::Return | ParamClass::Leave => continue,
                    };
                    if !first {
                        self.buf.push(' ');
                    }
                    first = false;
                    self.buf.push_str(prefix);
                    self.buf.push_str(param.symbol.as_str());
                }
                self.buf.push_str("]]");
            }
            Payload::Error(error) => {
                self.buf.push_str("make error! [code: ");
                self.buf.push_str(&error.code().to_string());
                if let Some(category) = error.category() {
                    self.buf.push_str(" type: '");
                    self.buf.push_str(category.as_str());
                }
                if let Some(id) = error.id() {
                    self.buf.push_str(" id: '");
                    self.buf.push_str(id.as_str());
                }
                self.buf.push(']');
            }
            Payload::Object(context) => self.object(context),
            Payload::Varargs(_) => self.buf.push_str("#[varargs!]"),
            Payload::Datatype(kind) => self.buf.push_str(kind.name()),
            Payload::Typeset(types) => self.typeset(*types),
        }
    }

    fn string(&mut self, text: &str) {
        self.buf.push('"');
        for ch in text.chars() {
            match ch {
                '"' => self.buf.push_str("^\""),
                '^' => self.buf.push_str("^^"),
                '\n' => self.buf.push_str("^/"),
                '\t' => self.buf.push_str("^-"),
                _ => self.buf.push(ch),
            }
        }
        self.buf.push('"');
    }

    fn cells(&mut self, open: char, cells: &[Cell], separator: char, close: char) {
        self.buf.push(open);
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                self.buf.push(separator);
            }
            self.mold_cell(cell);
        }
        self.buf.push(close);
    }

    fn object(&mut self, context: &Context) {
        if self.stack.iter().any(|seen| seen.ptr_eq(context)) {
            self.buf.push_str("...");
            return;
        }
        self.stack.push(context.clone());
        self.buf.push_str("make object! [");
        let fields: Vec<_> = context.fields().collect();
        for (i, (symbol, value)) in fields.iter().enumerate() {
            if i > 0 {
                self.buf.push(' ');
            }
            self.buf.push_str(symbol.as_str());
            self.buf.push_str(": ");
            match value.kind() {
                Kind::Word | Kind::Path | Kind::Function => {
                    self.buf.push('\'');
                    self.mold(value);
                }
                _ => self.mold(value),
            }
        }
        self.buf.push(']');
        self.stack.pop();
    }

    fn typeset(&mut self, types: TypeSet) {
        self.buf.push_str("make typeset! [");
        for (i, kind) in types.iter().enumerate() {
            if i > 0 {
                self.buf.push(' ');
            }
            self.buf.push_str(kind.name());
        }
        self.buf.push(']');
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        let mut stack = Vec::new();
        Molder::new(&mut buf, &mut stack).mold(self);
        f.write_str(&buf)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = String::new();
        let mut stack = Vec::new();
        Molder::new(&mut buf, &mut stack).mold_cell(self);
        f.write_str(&buf)
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind(), self)
    }
}

impl fmt::Debug for super::Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.cells()).finish()
    }
}
