//! Binding contexts.
//!
//! A context is an ordered table of keys and variables. Objects and function
//! argument frames are both contexts; words bind to a slot by index.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use core::cell::RefCell;
use std::rc::{Rc, Weak};

use thiserror::Error;

use crate::heap::SeriesId;
use crate::values::{
    Array, Binding, Cell, FuncId, Param, Payload, Series, Specifier, Symbol, Value, Word,
    WordKind,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextKind {
    Object,
    /// Arguments of one function invocation.
    Frame,
}

#[derive(Clone, Debug)]
pub struct Key {
    pub symbol: Symbol,
    /// The variable holds an infix function.
    pub lookback: bool,
}

struct ContextData {
    kind: ContextKind,
    id: SeriesId,
    function: Option<FuncId>,
    keys: Vec<Key>,
    vars: Vec<Value>,
    inaccessible: bool,
}

#[derive(Clone)]
pub struct Context(Rc<RefCell<ContextData>>);

/// Non-owning reference to a context, compared by identity.
#[derive(Clone)]
pub struct WeakContext(Weak<RefCell<ContextData>>);

#[derive(Debug, Error)]
pub enum BindError {
    #[error("{0} is not bound to a context")]
    NotBound(Symbol),
    #[error("{0} belongs to a frame that is no longer available")]
    Inaccessible(Symbol),
}

impl Context {
    pub(crate) fn new(kind: ContextKind, id: SeriesId, function: Option<FuncId>) -> Self {
        Context(Rc::new(RefCell::new(ContextData {
            kind,
            id,
            function,
            keys: Vec::new(),
            vars: Vec::new(),
            inaccessible: false,
        })))
    }

    /// A frame context with one void slot per parameter.
    pub(crate) fn for_params(id: SeriesId, function: FuncId, params: &[Param]) -> Self {
        let context = Context::new(ContextKind::Frame, id, Some(function));
        {
            let mut data = context.0.borrow_mut();
            data.keys = params
                .iter()
                .map(|param| Key {
                    symbol: param.symbol.clone(),
                    lookback: false,
                })
                .collect();
            data.vars = vec![Value::void(); params.len()];
        }
        context
    }

    pub fn kind(&self) -> ContextKind {
        self.0.borrow().kind
    }

    pub fn id(&self) -> SeriesId {
        self.0.borrow().id
    }

    /// Function whose relative words this frame resolves.
    pub fn function(&self) -> Option<FuncId> {
        self.0.borrow().function
    }

    pub fn len(&self) -> usize {
        self.0.borrow().keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, symbol: &Symbol) -> Option<usize> {
        self.0
            .borrow()
            .keys
            .iter()
            .position(|key| key.symbol == *symbol)
    }

    pub fn key(&self, index: usize) -> Option<Symbol> {
        self.0.borrow().keys.get(index).map(|key| key.symbol.clone())
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().vars.get(index).cloned()
    }

    /// Reads a variable by name, void when absent.
    pub fn select(&self, symbol: &Symbol) -> Value {
        self.find(symbol)
            .and_then(|index| self.get(index))
            .unwrap_or_else(Value::void)
    }

    pub fn set(&self, index: usize, value: Value) {
        if let Some(slot) = self.0.borrow_mut().vars.get_mut(index) {
            *slot = value;
        }
    }

    /// Adds a key, or finds the existing one, and returns its index.
    pub fn append(&self, symbol: Symbol) -> usize {
        if let Some(index) = self.find(&symbol) {
            return index;
        }
        let mut data = self.0.borrow_mut();
        data.keys.push(Key {
            symbol,
            lookback: false,
        });
        data.vars.push(Value::void());
        data.keys.len() - 1
    }

    pub fn set_lookback(&self, index: usize, lookback: bool) {
        if let Some(key) = self.0.borrow_mut().keys.get_mut(index) {
            key.lookback = lookback;
        }
    }

    pub fn is_lookback(&self, index: usize) -> bool {
        self.0
            .borrow()
            .keys
            .get(index)
            .is_some_and(|key| key.lookback)
    }

    /// Snapshot of the keys and their current values.
    pub fn fields(&self) -> impl Iterator<Item = (Symbol, Value)> {
        let data = self.0.borrow();
        let fields: Vec<_> = data
            .keys
            .iter()
            .zip(data.vars.iter())
            .map(|(key, var)| (key.symbol.clone(), var.clone()))
            .collect();
        fields.into_iter()
    }

    pub fn is_accessible(&self) -> bool {
        !self.0.borrow().inaccessible
    }

    /// Releases the variables; later reads through stale bindings fail.
    pub(crate) fn decay(&self) {
        let mut data = self.0.borrow_mut();
        data.inaccessible = true;
        data.vars.clear();
    }

    pub fn ptr_eq(&self, other: &Context) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakContext {
        WeakContext(Rc::downgrade(&self.0))
    }

    /// Number of live owners, used to tell whether a frame escaped its call.
    pub(crate) fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl WeakContext {
    pub fn upgrade(&self) -> Option<Context> {
        self.0.upgrade().map(Context)
    }

    pub fn is(&self, context: &Context) -> bool {
        core::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&context.0))
    }
}

fn specific(word: &Word) -> Result<(&Context, usize), BindError> {
    match &word.binding {
        Binding::Specific { context, index } => {
            if context.is_accessible() {
                Ok((context, *index))
            } else {
                Err(BindError::Inaccessible(word.symbol.clone()))
            }
        }
        Binding::Unbound | Binding::Relative { .. } => Err(BindError::NotBound(word.symbol.clone())),
    }
}

pub fn read_var(word: &Word) -> Result<Value, BindError> {
    read_var_lookback(word).map(|(value, _)| value)
}

/// Reads a variable together with its lookback flag.
pub fn read_var_lookback(word: &Word) -> Result<(Value, bool), BindError> {
    let (context, index) = specific(word)?;
    let value = context
        .get(index)
        .ok_or_else(|| BindError::NotBound(word.symbol.clone()))?;
    Ok((value, context.is_lookback(index)))
}

pub fn write_var(word: &Word, value: Value) -> Result<(), BindError> {
    let (context, index) = specific(word)?;
    if index >= context.len() {
        return Err(BindError::NotBound(word.symbol.clone()));
    }
    context.set(index, value.quoted());
    Ok(())
}

/// Rebuilds `array` with every word whose spelling is a key of `context`
/// bound to it, descending into nested blocks, groups and paths.
pub fn bind_deep(array: &Array, context: &Context) -> Array {
    rebind(array, &mut |_, word| {
        context
            .find(&word.symbol)
            .map(|index| Word::bound(word.symbol.clone(), context.clone(), index))
    })
}

/// Rebuilds a function body so that words naming a parameter refer to the
/// running frame of `function` instead of any one context.
pub(crate) fn bind_relative(array: &Array, params: &[Param], function: FuncId) -> Array {
    rebind(array, &mut |_, word| {
        params
            .iter()
            .position(|param| param.symbol == word.symbol)
            .map(|index| Word {
                symbol: word.symbol.clone(),
                binding: Binding::Relative { function, index },
            })
    })
}

/// Rebuilds `array` deeply, replacing each word for which `binder` returns
/// a new one.
pub(crate) fn rebind(
    array: &Array,
    binder: &mut dyn FnMut(WordKind, &Word) -> Option<Word>,
) -> Array {
    array
        .cells()
        .iter()
        .map(|cell| match cell.payload() {
            Payload::Word(kind, word) => match binder(*kind, word) {
                Some(bound) => Cell::new(Payload::Word(*kind, bound)),
                None => cell.clone(),
            },
            Payload::Block(series) => Cell::new(Payload::Block(rebind_series(series, binder))),
            Payload::Group(series) => Cell::new(Payload::Group(rebind_series(series, binder))),
            Payload::Path(kind, series) => {
                Cell::new(Payload::Path(*kind, rebind_series(series, binder)))
            }
            _ => cell.clone(),
        })
        .collect()
}

fn rebind_series(
    series: &Series,
    binder: &mut dyn FnMut(WordKind, &Word) -> Option<Word>,
) -> Series {
    Series {
        array: rebind(&series.array, binder),
        index: series.index,
        specifier: series.specifier.clone(),
    }
}

/// Copies the cells of `series` from its index with every relative word
/// resolved through the series' specifier, nested arrays included.
pub(crate) fn specify_deep(series: &Series) -> Array {
    series
        .cells()
        .iter()
        .map(|cell| specify_cell(cell, &series.specifier))
        .collect()
}

fn specify_cell(cell: &Cell, specifier: &Specifier) -> Cell {
    let nested = |inner: &Series| match &inner.specifier {
        Some(_) => inner.clone(),
        None => Series {
            array: inner
                .array
                .cells()
                .iter()
                .map(|cell| specify_cell(cell, specifier))
                .collect(),
            index: inner.index,
            specifier: None,
        },
    };
    match cell.payload() {
        Payload::Word(..) if cell.is_relative() => Cell::from(cell.specify(specifier)),
        Payload::Block(inner) => Cell::new(Payload::Block(nested(inner))),
        Payload::Group(inner) => Cell::new(Payload::Group(nested(inner))),
        Payload::Path(kind, inner) => Cell::new(Payload::Path(*kind, nested(inner))),
        _ => cell.clone(),
    }
}

/// Set-words at the top level of a block.
pub(crate) fn set_word_symbols(series: &Series) -> impl Iterator<Item = Symbol> + '_ {
    series.cells().iter().filter_map(|cell| match cell.payload() {
        Payload::Word(WordKind::SetWord, word) => Some(word.symbol.clone()),
        _ => None,
    })
}
