use pretty_assertions::assert_eq;

use super::*;
use crate::values::Symbol;

#[test]
fn test_manual_contexts_are_recorded() {
    let mut heap = Heap::new();
    let context = heap.make_context(ContextKind::Object, None);
    assert_eq!(heap.manuals_len(), 1);
    assert!(!heap.is_managed(&context));

    heap.manage(&context);
    assert_eq!(heap.manuals_len(), 0);
    assert!(heap.is_managed(&context));
    assert!(context.is_accessible());
}

#[test]
fn test_free_decays_the_context() {
    let mut heap = Heap::new();
    let context = heap.make_context(ContextKind::Object, None);
    context.append(Symbol::new("x"));
    heap.free(&context);
    assert_eq!(heap.manuals_len(), 0);
    assert!(!context.is_accessible());
    assert!(context.get(0).is_none());
}

#[test]
fn test_free_manuals_to_releases_newest_first() {
    let mut heap = Heap::new();
    let old = heap.make_context(ContextKind::Object, None);
    let newer = heap.make_frame(FuncId::fresh(), &[Param::normal("a")]);
    let newest = heap.make_context(ContextKind::Object, None);

    heap.free_manuals_to(1);
    assert_eq!(heap.manuals_len(), 1);
    assert!(old.is_accessible());
    assert!(!newer.is_accessible());
    assert!(!newest.is_accessible());
}

#[test]
fn test_ids_are_unique() {
    let mut heap = Heap::new();
    let a = heap.make_context(ContextKind::Object, None);
    let b = heap.make_managed(ContextKind::Object);
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_recycle_sweeps_unreferenced_managed_contexts() {
    let mut heap = Heap::new();
    let kept = heap.make_managed(ContextKind::Object);
    {
        let _dropped = heap.make_managed(ContextKind::Object);
    }
    assert_eq!(heap.managed_len(), 2);
    assert_eq!(heap.recycle(), 1);
    assert_eq!(heap.managed_len(), 1);
    assert!(heap.is_managed(&kept));
}

#[test]
fn test_recycle_does_nothing_while_disabled() {
    let mut heap = Heap::new();
    {
        let _dropped = heap.make_managed(ContextKind::Object);
    }
    heap.disable();
    assert_eq!(heap.recycle(), 0);
    heap.enable();
    assert_eq!(heap.recycle(), 1);
}

#[test]
fn test_restore_truncates_guards() {
    let mut heap = Heap::new();
    let context = heap.make_context(ContextKind::Object, None);
    heap.guard_context(&context);
    heap.guard_value(Value::integer(1));
    heap.disable();
    heap.restore(0, 0, 0);
    assert_eq!(heap.series_guard_len(), 0);
    assert_eq!(heap.value_guard_len(), 0);
    assert_eq!(heap.disabled(), 0);
}
