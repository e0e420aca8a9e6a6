#![forbid(unsafe_code)]

//! Property tests for [`TemporalStore`].
//!
//! Validates:
//! - Undo of every recorded step returns to the first value
//! - Version moves on every value change and only then
//! - State subscribers hear at most once per operation and always end on
//!   the current value

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use rewind_core::TemporalOptions;
use rewind_store::TemporalStore;

// ============================================================================
// Strategy helpers
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Set(u8),
    SetUntracked(u8),
    Undo(usize),
    Redo(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..6).prop_map(Op::Set),
        1 => (0u8..6).prop_map(Op::SetUntracked),
        2 => (0usize..4).prop_map(Op::Undo),
        2 => (0usize..4).prop_map(Op::Redo),
    ]
}

// ============================================================================
// Invariant 1: Full undo returns to the initial value
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn full_undo_restores_initial(values in prop::collection::vec(any::<u16>(), 0..50)) {
        let store = TemporalStore::new(0u16, TemporalOptions::new());
        for v in &values {
            store.set_state(*v);
        }
        prop_assert_eq!(store.undo(usize::MAX), values.len());
        prop_assert_eq!(store.get_state(), 0);
        prop_assert_eq!(store.redo(usize::MAX), values.len());
        prop_assert_eq!(store.get_state(), values.last().copied().unwrap_or(0));
    }
}

// ============================================================================
// Invariant 2: Version and notifications track value changes
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn notifications_follow_value_changes(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let store = TemporalStore::new(0u8, TemporalOptions::new().limit(8));
        let seen = Rc::new(RefCell::new(vec![0u8]));
        let sink = Rc::clone(&seen);
        let _sub = store.subscribe(move |v: &u8| sink.borrow_mut().push(*v));

        for op in &ops {
            let (before, version) = (store.get_state(), store.version());
            let notified = seen.borrow().len();
            match op {
                Op::Set(v) => store.set_state(*v),
                Op::SetUntracked(v) => store.set_state_untracked(*v),
                Op::Undo(n) => { store.undo(*n); }
                Op::Redo(n) => { store.redo(*n); }
            }
            let after = store.get_state();
            if matches!(op, Op::Set(_) | Op::SetUntracked(_)) {
                prop_assert_eq!(store.version() > version, after != before, "after {:?}", op);
            }
            prop_assert!(seen.borrow().len() <= notified + 1, "more than one notification for {:?}", op);
            prop_assert_eq!(seen.borrow().last().copied(), Some(after));
            prop_assert!(store.past_states().len() <= 8);
        }
    }
}
