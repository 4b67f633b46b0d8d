//! Allocation ledger.
//!
//! Contexts start out "manual": the ledger records them and whoever made
//! them must either free them or hand them to the collector with
//! [`Heap::manage`]. A trap unwind frees every manual allocation made since
//! its checkpoint, which is what keeps failed calls from leaking frames.

#[cfg(test)]
#[path = "heap_test.rs"]
mod heap_test;

use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::context::{Context, ContextKind, WeakContext};
use crate::values::{FuncId, Param, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesId(u64);

#[derive(Default)]
pub struct Heap {
    next_id: u64,
    manuals: Vec<(SeriesId, WeakContext)>,
    managed: HashMap<SeriesId, WeakContext>,
    series_guard: Vec<Context>,
    value_guard: Vec<Value>,
    disabled: usize,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&mut self) -> SeriesId {
        self.next_id += 1;
        SeriesId(self.next_id)
    }

    /// A manual context, recorded in the ledger.
    pub fn make_context(&mut self, kind: ContextKind, function: Option<FuncId>) -> Context {
        let id = self.fresh_id();
        let context = Context::new(kind, id, function);
        self.manuals.push((id, context.downgrade()));
        context
    }

    /// A manual argument frame for a call of `function`.
    pub fn make_frame(&mut self, function: FuncId, params: &[Param]) -> Context {
        let id = self.fresh_id();
        let context = Context::for_params(id, function, params);
        self.manuals.push((id, context.downgrade()));
        context
    }

    /// A context owned by the collector from the start.
    pub fn make_managed(&mut self, kind: ContextKind) -> Context {
        let id = self.fresh_id();
        let context = Context::new(kind, id, None);
        self.managed.insert(id, context.downgrade());
        context
    }

    fn take_manual(&mut self, id: SeriesId) -> Option<WeakContext> {
        let position = self.manuals.iter().rposition(|(manual, _)| *manual == id)?;
        Some(self.manuals.remove(position).1)
    }

    /// Hands a manual context to the collector.
    pub fn manage(&mut self, context: &Context) {
        let id = context.id();
        if let Some(weak) = self.take_manual(id) {
            self.managed.insert(id, weak);
        }
    }

    /// Frees a manual context right away.
    pub fn free(&mut self, context: &Context) {
        let id = context.id();
        if self.take_manual(id).is_some() {
            debug!(?id, "freeing manual context");
        }
        context.decay();
    }

    pub fn is_managed(&self, context: &Context) -> bool {
        self.managed.contains_key(&context.id())
    }

    pub fn manuals_len(&self) -> usize {
        self.manuals.len()
    }

    pub fn managed_len(&self) -> usize {
        self.managed.len()
    }

    /// Frees manual allocations, newest first, until `len` remain.
    pub fn free_manuals_to(&mut self, len: usize) {
        while self.manuals.len() > len {
            let Some((id, weak)) = self.manuals.pop() else {
                break;
            };
            debug!(?id, "freeing manual context during unwind");
            if let Some(context) = weak.upgrade() {
                context.decay();
            }
        }
    }

    pub fn guard_context(&mut self, context: &Context) {
        self.series_guard.push(context.clone());
    }

    pub fn unguard_context(&mut self, context: &Context) {
        let top = self.series_guard.pop();
        debug_assert!(
            top.is_some_and(|guarded| guarded.ptr_eq(context)),
            "context guards released out of order"
        );
    }

    pub fn guard_value(&mut self, value: Value) {
        self.value_guard.push(value);
    }

    pub fn unguard_value(&mut self) {
        let top = self.value_guard.pop();
        debug_assert!(top.is_some(), "value guard stack underflow");
    }

    pub fn series_guard_len(&self) -> usize {
        self.series_guard.len()
    }

    pub fn value_guard_len(&self) -> usize {
        self.value_guard.len()
    }

    pub fn disable(&mut self) {
        self.disabled += 1;
    }

    pub fn enable(&mut self) {
        debug_assert!(self.disabled > 0, "collector enabled more often than disabled");
        self.disabled = self.disabled.saturating_sub(1);
    }

    pub fn disabled(&self) -> usize {
        self.disabled
    }

    /// Puts the guard stacks and the disable counter back to earlier
    /// lengths.
    pub(crate) fn restore(&mut self, series_guard_len: usize, value_guard_len: usize, disabled: usize) {
        self.series_guard.truncate(series_guard_len);
        self.value_guard.truncate(value_guard_len);
        self.disabled = disabled;
    }

    /// Drops ledger entries for managed contexts nobody holds anymore and
    /// returns how many were swept.
    pub fn recycle(&mut self) -> usize {
        if self.disabled > 0 {
            warn!(disabled = self.disabled, "recycle requested while collector is disabled");
            return 0;
        }
        let before = self.managed.len();
        self.managed.retain(|_, weak| weak.upgrade().is_some());
        let swept = before - self.managed.len();
        debug!(swept, remaining = self.managed.len(), "recycled");
        swept
    }
}
