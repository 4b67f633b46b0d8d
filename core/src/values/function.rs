//! Function values.
//!
//! A function is an ordered parameter list plus a dispatcher. Natives
//! dispatch to a Rust function pointer. Interpreted functions run a body
//! whose words were made relative to the function when it was created, so
//! each invocation resolves them against its own frame.

use core::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{Array, Symbol, TypeSet, Value};
use crate::context::WeakContext;
use crate::evaluator::Call;
use crate::session::Session;
use crate::trap::EvalResult;

static NEXT_FUNC_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a parameter list.
///
/// Specializations get their own id but share the `underlying` id of the
/// function they specialize, which is what relative words and generic
/// definitional exits refer to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FuncId(u64);

impl FuncId {
    pub(crate) fn fresh() -> Self {
        FuncId(NEXT_FUNC_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamClass {
    /// Evaluated with one DO/NEXT step.
    Normal,
    /// Takes the next cell literally.
    HardQuote,
    /// Literal, except groups, get-words and get-paths are evaluated once.
    SoftQuote,
    /// Logic switch gating the parameters that follow it.
    Refinement,
    /// Never supplied by the caller, starts void.
    Local,
    /// Definitional RETURN slot.
    Return,
    /// Definitional LEAVE slot.
    Leave,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub symbol: Symbol,
    pub class: ParamClass,
    pub types: TypeSet,
    /// Captures a feed the callee pulls from instead of a single value.
    pub variadic: bool,
    /// Tolerates the end of input (or a BAR!) by taking void.
    pub endable: bool,
}

impl Param {
    pub fn new(symbol: impl Into<Symbol>, class: ParamClass) -> Self {
        let types = match class {
            ParamClass::Refinement => TypeSet::of(super::Kind::Logic),
            ParamClass::Local | ParamClass::Return | ParamClass::Leave => TypeSet::ANY,
            _ => TypeSet::ANY_VALUE,
        };
        Param {
            symbol: symbol.into(),
            class,
            types,
            variadic: false,
            endable: false,
        }
    }

    pub fn normal(name: &str) -> Self {
        Param::new(name, ParamClass::Normal)
    }

    pub fn hard_quote(name: &str) -> Self {
        Param::new(name, ParamClass::HardQuote)
    }

    pub fn soft_quote(name: &str) -> Self {
        Param::new(name, ParamClass::SoftQuote)
    }

    pub fn refinement(name: &str) -> Self {
        Param::new(name, ParamClass::Refinement)
    }

    pub fn local(name: &str) -> Self {
        Param::new(name, ParamClass::Local)
    }

    pub fn with_types(mut self, types: TypeSet) -> Self {
        self.types = types;
        self
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn endable(mut self) -> Self {
        self.endable = true;
        self
    }

    /// Whether the caller supplies this parameter (directly or through a
    /// refinement).
    pub fn is_argument(&self) -> bool {
        matches!(
            self.class,
            ParamClass::Normal | ParamClass::HardQuote | ParamClass::SoftQuote
        )
    }
}

/// Native dispatcher.
pub type NativeFn = fn(&mut Session, &Call) -> EvalResult<Output>;

#[derive(Clone)]
pub enum Body {
    Native(NativeFn),
    /// Body array with parameter words bound relative to the function.
    Interpreted(Array),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FunctionFlags {
    /// Statement separator: output is forced to void and the function may
    /// not be an argument or an assignment source.
    pub punctuates: bool,
    pub has_return: bool,
    pub has_leave: bool,
}

struct FunctionData {
    id: FuncId,
    underlying: FuncId,
    params: Rc<[Param]>,
    body: Body,
    exemplar: Option<Rc<[Option<Value>]>>,
    flags: FunctionFlags,
}

#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

impl Function {
    pub fn native(params: Vec<Param>, dispatcher: NativeFn) -> Self {
        Function::with_flags(params, dispatcher, FunctionFlags::default())
    }

    pub fn with_flags(params: Vec<Param>, dispatcher: NativeFn, flags: FunctionFlags) -> Self {
        let id = FuncId::fresh();
        Function(Rc::new(FunctionData {
            id,
            underlying: id,
            params: Rc::from(params),
            body: Body::Native(dispatcher),
            exemplar: None,
            flags,
        }))
    }

    /// Builds an interpreted function. `body` must already have its
    /// parameter words made relative to `id`.
    pub(crate) fn interpreted(
        id: FuncId,
        params: Vec<Param>,
        body: Array,
        flags: FunctionFlags,
    ) -> Self {
        Function(Rc::new(FunctionData {
            id,
            underlying: id,
            params: Rc::from(params),
            body: Body::Interpreted(body),
            exemplar: None,
            flags,
        }))
    }

    /// A new function with some arguments pre-filled. `exemplar` has one
    /// slot per parameter; `None` leaves the slot to the caller.
    pub fn specialize(&self, exemplar: Vec<Option<Value>>) -> Function {
        debug_assert_eq!(exemplar.len(), self.0.params.len());
        Function(Rc::new(FunctionData {
            id: FuncId::fresh(),
            underlying: self.0.underlying,
            params: self.0.params.clone(),
            body: self.0.body.clone(),
            exemplar: Some(Rc::from(exemplar)),
            flags: self.0.flags,
        }))
    }

    pub fn id(&self) -> FuncId {
        self.0.id
    }

    pub fn underlying(&self) -> FuncId {
        self.0.underlying
    }

    pub fn is(&self, other: &Function) -> bool {
        self.0.id == other.0.id
    }

    pub fn params(&self) -> &[Param] {
        &self.0.params
    }

    pub fn body(&self) -> &Body {
        &self.0.body
    }

    pub fn exemplar(&self) -> Option<&[Option<Value>]> {
        self.0.exemplar.as_deref()
    }

    pub fn is_specialized(&self, index: usize) -> bool {
        self.exemplar()
            .and_then(|slots| slots.get(index))
            .is_some_and(Option::is_some)
    }

    pub fn flags(&self) -> FunctionFlags {
        self.0.flags
    }

    pub fn punctuates(&self) -> bool {
        self.0.flags.punctuates
    }

    pub fn find_param(&self, symbol: &Symbol) -> Option<usize> {
        self.0.params.iter().position(|param| param.symbol == *symbol)
    }

    pub fn return_param(&self) -> Option<&Param> {
        self.0
            .params
            .iter()
            .find(|param| param.class == ParamClass::Return)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("id", &self.0.id)
            .field("params", &self.0.params.len())
            .finish()
    }
}

/// Target of a definitional exit.
#[derive(Clone)]
pub enum ExitFrom {
    /// One specific invocation, identified by its argument frame.
    Frame(WeakContext),
    /// The most recent invocation of any frame of this function.
    Function(FuncId),
}

/// A function as it sits in a cell: RETURN and LEAVE values additionally
/// remember which call they exit from.
#[derive(Clone)]
pub struct FunctionValue {
    pub function: Function,
    pub exit_from: Option<ExitFrom>,
}

impl FunctionValue {
    pub fn new(function: Function) -> Self {
        FunctionValue {
            function,
            exit_from: None,
        }
    }
}

impl From<Function> for FunctionValue {
    fn from(function: Function) -> Self {
        FunctionValue::new(function)
    }
}

/// What a dispatcher hands back to the evaluator.
pub enum Output {
    Value(Value),
    /// `true` if the dispatcher produced something, `false` otherwise.
    TrueIfWritten(Option<Value>),
    /// The value if one was produced, void otherwise.
    VoidIfUnwritten(Option<Value>),
    Blank,
    Void,
    True,
    False,
    /// Run again with the same arguments, using this function's dispatcher.
    Redo(Function),
}
