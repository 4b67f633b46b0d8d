use std::rc::Rc;

use ecow::EcoString;

use super::{Array, FuncId, FunctionValue, Kind, Series, Symbol, TypeSet, Varargs};
use crate::context::Context;
use crate::error::ErrorObject;

/// Context used to resolve relative words, `None` when everything reachable
/// is already specific.
pub type Specifier = Option<Context>;

pub const SPECIFIED: Specifier = None;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordKind {
    Word,
    SetWord,
    GetWord,
    LitWord,
    Refinement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    Path,
    SetPath,
    GetPath,
    LitPath,
}

/// Where a word looks up its variable.
#[derive(Clone)]
pub enum Binding {
    Unbound,
    /// Slot `index` of a context.
    Specific { context: Context, index: usize },
    /// Slot `index` of whichever frame of `function` is running; only
    /// meaningful together with a specifier.
    Relative { function: FuncId, index: usize },
}

#[derive(Clone)]
pub struct Word {
    pub symbol: Symbol,
    pub binding: Binding,
}

impl Word {
    pub fn unbound(symbol: impl Into<Symbol>) -> Self {
        Word {
            symbol: symbol.into(),
            binding: Binding::Unbound,
        }
    }

    pub fn bound(symbol: Symbol, context: Context, index: usize) -> Self {
        Word {
            symbol,
            binding: Binding::Specific { context, index },
        }
    }

    pub fn is_relative(&self) -> bool {
        matches!(self.binding, Binding::Relative { .. })
    }
}

/// The datum carried by a cell.
#[derive(Clone)]
pub enum Payload {
    Void,
    Blank,
    Logic(bool),
    Bar,
    LitBar,
    Integer(i64),
    Decimal(f64),
    String(EcoString),
    Tag(EcoString),
    Word(WordKind, Word),
    Block(Series),
    Group(Series),
    Path(PathKind, Series),
    Function(FunctionValue),
    Error(Rc<ErrorObject>),
    Object(Context),
    Varargs(Varargs),
    Datatype(Kind),
    Typeset(TypeSet),
}

impl Payload {
    pub fn kind(&self) -> Kind {
        match self {
            Payload::Void => Kind::Void,
            Payload::Blank => Kind::Blank,
            Payload::Logic(_) => Kind::Logic,
            Payload::Bar => Kind::Bar,
            Payload::LitBar => Kind::LitBar,
            Payload::Integer(_) => Kind::Integer,
            Payload::Decimal(_) => Kind::Decimal,
            Payload::String(_) => Kind::String,
            Payload::Tag(_) => Kind::Tag,
            Payload::Word(kind, _) => match kind {
                WordKind::Word => Kind::Word,
                WordKind::SetWord => Kind::SetWord,
                WordKind::GetWord => Kind::GetWord,
                WordKind::LitWord => Kind::LitWord,
                WordKind::Refinement => Kind::Refinement,
            },
            Payload::Block(_) => Kind::Block,
            Payload::Group(_) => Kind::Group,
            Payload::Path(kind, _) => match kind {
                PathKind::Path => Kind::Path,
                PathKind::SetPath => Kind::SetPath,
                PathKind::GetPath => Kind::GetPath,
                PathKind::LitPath => Kind::LitPath,
            },
            Payload::Function(_) => Kind::Function,
            Payload::Error(_) => Kind::Error,
            Payload::Object(_) => Kind::Object,
            Payload::Varargs(_) => Kind::Varargs,
            Payload::Datatype(_) => Kind::Datatype,
            Payload::Typeset(_) => Kind::Typeset,
        }
    }
}

impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        use Payload::*;
        match (self, other) {
            (Void, Void) | (Blank, Blank) | (Bar, Bar) | (LitBar, LitBar) => true,
            (Logic(a), Logic(b)) => a == b,
            (Integer(a), Integer(b)) => a == b,
            (Decimal(a), Decimal(b)) => a == b,
            (Integer(a), Decimal(b)) | (Decimal(b), Integer(a)) => (*a as f64) == *b,
            (String(a), String(b)) | (Tag(a), Tag(b)) => a == b,
            (Word(ka, a), Word(kb, b)) => ka == kb && a.symbol == b.symbol,
            (Block(a), Block(b)) | (Group(a), Group(b)) => a.cells() == b.cells(),
            (Path(ka, a), Path(kb, b)) => ka == kb && a.cells() == b.cells(),
            (Function(a), Function(b)) => a.function.id() == b.function.id(),
            (Error(a), Error(b)) => Rc::ptr_eq(a, b) || (a.code() == b.code() && a.id() == b.id()),
            (Object(a), Object(b)) => a.ptr_eq(b),
            (Varargs(a), Varargs(b)) => a.ptr_eq(b),
            (Datatype(a), Datatype(b)) => a == b,
            (Typeset(a), Typeset(b)) => a == b,
            _ => false,
        }
    }
}

/// A cell as stored in an array.
///
/// Cells may be relative: a word inside a function body is bound to "the
/// running frame of that function" and cannot be looked up until a
/// specifier says which frame that is. Reading a cell therefore always goes
/// through [`Cell::specify`].
#[derive(Clone, PartialEq)]
pub struct Cell(Payload);

impl Cell {
    pub fn new(payload: Payload) -> Self {
        Cell(payload)
    }

    pub fn payload(&self) -> &Payload {
        &self.0
    }

    pub fn kind(&self) -> Kind {
        self.0.kind()
    }

    pub fn is_relative(&self) -> bool {
        matches!(&self.0, Payload::Word(_, word) if word.is_relative())
    }

    /// Resolves the cell into a specific value.
    ///
    /// Relative words become bound to the specifier's frame, and arrays that
    /// carry no specifier of their own inherit this one.
    pub fn specify(&self, specifier: &Specifier) -> Value {
        let payload = match &self.0 {
            Payload::Word(kind, word) => match (&word.binding, specifier) {
                (Binding::Relative { function, index }, Some(frame)) => {
                    debug_assert!(
                        frame.function() == Some(*function),
                        "specifier does not belong to the word's function"
                    );
                    Payload::Word(
                        *kind,
                        Word::bound(word.symbol.clone(), frame.clone(), *index),
                    )
                }
                (Binding::Relative { .. }, None) => {
                    debug_assert!(false, "relative word {} read without a specifier", word.symbol);
                    Payload::Word(*kind, Word::unbound(word.symbol.clone()))
                }
                _ => self.0.clone(),
            },
            Payload::Block(series) => Payload::Block(inherit(series, specifier)),
            Payload::Group(series) => Payload::Group(inherit(series, specifier)),
            Payload::Path(kind, series) => Payload::Path(*kind, inherit(series, specifier)),
            other => other.clone(),
        };
        Value {
            payload,
            evaluated: false,
        }
    }
}

fn inherit(series: &Series, specifier: &Specifier) -> Series {
    if series.specifier.is_some() || specifier.is_none() {
        return series.clone();
    }
    Series {
        array: series.array.clone(),
        index: series.index,
        specifier: specifier.clone(),
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Cell(value.payload)
    }
}

impl From<Payload> for Cell {
    fn from(payload: Payload) -> Self {
        Cell(payload)
    }
}

/// A fully specific value, plus the flag recording whether it was produced
/// by evaluation (as opposed to being copied from source).
#[derive(Clone)]
pub struct Value {
    payload: Payload,
    evaluated: bool,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload
    }
}

impl Value {
    pub fn new(payload: Payload) -> Self {
        Value {
            payload,
            evaluated: false,
        }
    }

    pub fn void() -> Self {
        Value::new(Payload::Void)
    }

    pub fn blank() -> Self {
        Value::new(Payload::Blank)
    }

    pub fn logic(flag: bool) -> Self {
        Value::new(Payload::Logic(flag))
    }

    pub fn bar() -> Self {
        Value::new(Payload::Bar)
    }

    pub fn integer(number: i64) -> Self {
        Value::new(Payload::Integer(number))
    }

    pub fn decimal(number: f64) -> Self {
        Value::new(Payload::Decimal(number))
    }

    pub fn string(text: &str) -> Self {
        Value::new(Payload::String(EcoString::from(text)))
    }

    pub fn tag(text: &str) -> Self {
        Value::new(Payload::Tag(EcoString::from(text)))
    }

    pub fn word(kind: WordKind, word: Word) -> Self {
        Value::new(Payload::Word(kind, word))
    }

    /// An unbound plain word, handy for labels and markers.
    pub fn plain_word(spelling: &str) -> Self {
        Value::word(WordKind::Word, Word::unbound(spelling))
    }

    pub fn block(array: Array) -> Self {
        Value::new(Payload::Block(Series::new(array)))
    }

    pub fn series(kind: Kind, series: Series) -> Self {
        let payload = match kind {
            Kind::Group => Payload::Group(series),
            Kind::Path => Payload::Path(PathKind::Path, series),
            Kind::SetPath => Payload::Path(PathKind::SetPath, series),
            Kind::GetPath => Payload::Path(PathKind::GetPath, series),
            Kind::LitPath => Payload::Path(PathKind::LitPath, series),
            _ => Payload::Block(series),
        };
        Value::new(payload)
    }

    pub fn function(value: FunctionValue) -> Self {
        Value::new(Payload::Function(value))
    }

    pub fn error(error: ErrorObject) -> Self {
        Value::new(Payload::Error(Rc::new(error)))
    }

    pub fn error_rc(error: Rc<ErrorObject>) -> Self {
        Value::new(Payload::Error(error))
    }

    pub fn object(context: Context) -> Self {
        Value::new(Payload::Object(context))
    }

    pub fn varargs(varargs: Varargs) -> Self {
        Value::new(Payload::Varargs(varargs))
    }

    pub fn datatype(kind: Kind) -> Self {
        Value::new(Payload::Datatype(kind))
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn kind(&self) -> Kind {
        self.payload.kind()
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    /// The same value, flagged as a product of evaluation.
    pub fn evaluated(mut self) -> Self {
        self.evaluated = true;
        self
    }

    /// The same value, flagged as copied from source.
    pub fn quoted(mut self) -> Self {
        self.evaluated = false;
        self
    }

    pub fn is_void(&self) -> bool {
        matches!(self.payload, Payload::Void)
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.payload, Payload::Blank)
    }

    pub fn is_bar(&self) -> bool {
        matches!(self.payload, Payload::Bar)
    }

    /// Conditional truth: everything but void, blank and false.
    pub fn is_truthy(&self) -> bool {
        !matches!(
            self.payload,
            Payload::Void | Payload::Blank | Payload::Logic(false)
        )
    }

    pub fn as_logic(&self) -> Option<bool> {
        match self.payload {
            Payload::Logic(flag) => Some(flag),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.payload {
            Payload::Integer(number) => Some(number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::String(text) | Payload::Tag(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_word(&self) -> Option<&Word> {
        match &self.payload {
            Payload::Word(_, word) => Some(word),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        self.as_word().map(|word| &word.symbol)
    }

    /// The series of a block, group or path.
    pub fn as_series(&self) -> Option<&Series> {
        match &self.payload {
            Payload::Block(series) | Payload::Group(series) | Payload::Path(_, series) => {
                Some(series)
            }
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionValue> {
        match &self.payload {
            Payload::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&Rc<ErrorObject>> {
        match &self.payload {
            Payload::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&Context> {
        match &self.payload {
            Payload::Object(context) => Some(context),
            _ => None,
        }
    }

    pub fn as_varargs(&self) -> Option<&Varargs> {
        match &self.payload {
            Payload::Varargs(varargs) => Some(varargs),
            _ => None,
        }
    }

    /// Converts any word to another word kind, keeping the binding.
    pub fn with_word_kind(&self, kind: WordKind) -> Option<Value> {
        self.as_word()
            .map(|word| Value::word(kind, word.clone()).with_flag(self.evaluated))
    }

    /// Converts any path to another path kind.
    pub fn with_path_kind(&self, kind: PathKind) -> Option<Value> {
        match &self.payload {
            Payload::Path(_, series) => {
                Some(Value::new(Payload::Path(kind, series.clone())).with_flag(self.evaluated))
            }
            _ => None,
        }
    }

    fn with_flag(mut self, evaluated: bool) -> Self {
        self.evaluated = evaluated;
        self
    }
}

impl From<i64> for Value {
    fn from(number: i64) -> Self {
        Value::integer(number)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::logic(flag)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::string(text)
    }
}
