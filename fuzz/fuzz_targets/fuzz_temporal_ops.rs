#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rewind_core::{StateHost, Temporal, TemporalOptions};

#[derive(Debug, Arbitrary)]
enum Op {
    Mutate(u8),
    Undo(u8),
    Redo(u8),
    Clear,
    Pause,
    Resume,
}

#[derive(Debug, Arbitrary)]
struct Input {
    limit: u8,
    dedupe: bool,
    ops: Vec<Op>,
}

struct Counter(u8);

impl StateHost<u8> for Counter {
    fn get_state(&self) -> u8 {
        self.0
    }

    fn set_state(&mut self, snapshot: u8) {
        self.0 = snapshot;
    }

    fn set_state_untracked(&mut self, snapshot: u8) {
        self.0 = snapshot;
    }
}

fuzz_target!(|input: Input| {
    let limit = usize::from(input.limit % 16);
    let options = TemporalOptions::new().limit(limit);
    let options = if input.dedupe {
        options.equality_partial_eq()
    } else {
        options
    };
    let mut temporal: Temporal<u8> = Temporal::new(options);
    let mut host = Counter(0);

    for op in input.ops.iter().take(512) {
        let (past, future) = (temporal.past_states().len(), temporal.future_states().len());
        match *op {
            Op::Mutate(next) => {
                let prior = temporal.snapshot(&host.0);
                host.set_state(next);
                if temporal.record(prior, &host) {
                    assert!(temporal.future_states().is_empty(), "future survived record");
                    assert_eq!(temporal.past_states().back(), Some(&prior));
                } else {
                    assert_eq!(temporal.past_states().len(), past);
                    assert_eq!(temporal.future_states().len(), future);
                }
            }
            Op::Undo(steps) => {
                let applied = temporal.undo(usize::from(steps), &mut host);
                assert_eq!(applied, usize::from(steps).min(past));
                assert_eq!(temporal.past_states().len(), past - applied);
                assert_eq!(temporal.future_states().len(), future + applied);
            }
            Op::Redo(steps) => {
                let applied = temporal.redo(usize::from(steps), &mut host);
                assert_eq!(applied, usize::from(steps).min(future));
                assert_eq!(temporal.future_states().len(), future - applied);
            }
            Op::Clear => {
                temporal.clear();
                assert!(temporal.history().is_empty());
            }
            Op::Pause => temporal.pause(),
            Op::Resume => temporal.resume(),
        }
        if limit > 0 {
            assert!(temporal.past_states().len() <= limit, "limit exceeded");
        }
    }
});
