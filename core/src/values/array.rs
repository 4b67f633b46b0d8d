use std::rc::Rc;

use super::{Cell, Specifier, Value};

/// Immutable sequence of cells shared between values.
#[derive(Clone)]
pub struct Array(Rc<[Cell]>);

impl Array {
    pub fn new(cells: Vec<Cell>) -> Self {
        Array(Rc::from(cells))
    }

    pub fn empty() -> Self {
        Array(Rc::from(Vec::new()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.0.get(index)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Array {
    fn default() -> Self {
        Array::empty()
    }
}

impl FromIterator<Cell> for Array {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Array::new(iter.into_iter().collect())
    }
}

/// A position in an array, together with the specifier used to resolve any
/// relative words inside it.
///
/// A series held by a cell in a function body carries no specifier of its
/// own; it inherits the one of the frame evaluating that body.
#[derive(Clone)]
pub struct Series {
    pub array: Array,
    pub index: usize,
    pub specifier: Specifier,
}

impl Series {
    pub fn new(array: Array) -> Self {
        Series {
            array,
            index: 0,
            specifier: None,
        }
    }

    pub fn at(array: Array, index: usize) -> Self {
        Series {
            array,
            index,
            specifier: None,
        }
    }

    /// The cells from the current index to the tail.
    pub fn cells(&self) -> &[Cell] {
        self.array.cells().get(self.index..).unwrap_or(&[])
    }

    pub fn is_tail(&self) -> bool {
        self.index >= self.array.len()
    }

    /// Resolves the cell `offset` positions past the index.
    pub fn value_at(&self, offset: usize) -> Option<Value> {
        self.cells()
            .get(offset)
            .map(|cell| cell.specify(&self.specifier))
    }

    /// Iterates the remaining cells as specific values.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.cells().iter().map(|cell| cell.specify(&self.specifier))
    }
}
