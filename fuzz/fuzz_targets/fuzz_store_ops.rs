#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rewind_core::TemporalOptions;
use rewind_store::TemporalStore;

#[derive(Debug, Arbitrary)]
enum Op {
    Push(u8),
    Pop,
    PushUntracked(u8),
    Undo(u8),
    Redo(u8),
    Clear,
    Pause,
    Resume,
}

fuzz_target!(|ops: Vec<Op>| {
    let store = TemporalStore::new(Vec::<u8>::new(), TemporalOptions::new().equality_partial_eq());

    for op in ops.iter().take(256) {
        let version = store.version();
        let before = store.get_state();
        match *op {
            Op::Push(b) => store.update(|v| v.push(b)),
            Op::Pop => store.update(|v| {
                v.pop();
            }),
            Op::PushUntracked(b) => store.update_untracked(|v| v.push(b)),
            Op::Undo(steps) => {
                let past = store.past_states();
                let future = store.future_states().len();
                let applied = store.undo(usize::from(steps % 8));
                assert_eq!(store.future_states().len(), future + applied);
                if applied > 0 {
                    assert_eq!(store.get_state(), past[past.len() - applied]);
                }
            }
            Op::Redo(steps) => {
                let past = store.past_states().len();
                let applied = store.redo(usize::from(steps % 8));
                assert_eq!(store.past_states().len(), past + applied);
            }
            Op::Clear => store.clear(),
            Op::Pause => store.pause(),
            Op::Resume => store.resume(),
        }
        if store.get_state() != before {
            assert!(store.version() > version, "value changed without a version bump");
        }
        assert!(store.version() >= version);
    }
});
