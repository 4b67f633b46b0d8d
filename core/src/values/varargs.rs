use std::cell::RefCell;
use std::rc::Rc;

use super::{Param, Series, Symbol, Value};
use crate::evaluator::FrameId;

/// Handle through which a variadic callee pulls its arguments.
#[derive(Clone)]
pub struct Varargs(Rc<VarargsData>);

pub(crate) struct VarargsData {
    pub(crate) source: VarargsSource,
    pub(crate) param: Param,
    pub(crate) label: Symbol,
}

pub(crate) enum VarargsSource {
    /// Feed of a live frame; dead once the frame is gone.
    Frame(FrameId),
    /// An enfixed variadic: only the value to the left is available.
    Left(RefCell<Option<Value>>),
    /// A block position shared by every copy of the handle.
    Block(RefCell<Series>),
}

impl Varargs {
    pub(crate) fn from_frame(frame: FrameId, param: Param, label: Symbol) -> Self {
        Varargs(Rc::new(VarargsData {
            source: VarargsSource::Frame(frame),
            param,
            label,
        }))
    }

    pub(crate) fn from_left(left: Option<Value>, param: Param, label: Symbol) -> Self {
        Varargs(Rc::new(VarargsData {
            source: VarargsSource::Left(RefCell::new(left)),
            param,
            label,
        }))
    }

    /// Varargs over a block; each take evaluates one expression from it.
    pub fn from_block(series: Series) -> Self {
        Varargs(Rc::new(VarargsData {
            source: VarargsSource::Block(RefCell::new(series)),
            param: Param::normal("value"),
            label: Symbol::new("varargs"),
        }))
    }

    pub(crate) fn data(&self) -> &VarargsData {
        &self.0
    }

    pub fn ptr_eq(&self, other: &Varargs) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
