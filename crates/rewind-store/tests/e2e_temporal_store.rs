#![forbid(unsafe_code)]

//! End-to-end scenarios for [`TemporalStore`] with persistent state types.
//!
//! Validates:
//! - 100 sequential edits, then full undo and full redo
//! - Partial snapshots: tracked fields roll back, untracked ones stay
//! - Limit, pause and clear through the store surface
//! - History and state subscribers observe a consistent store
//! - JSONL structured logging for each operation

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use im::{HashMap as ImHashMap, Vector as ImVector};
use rewind_core::{TemporalChange, TemporalOptions};
use rewind_store::TemporalStore;
use web_time::Instant;

// ============================================================================
// JSONL log entry
// ============================================================================

#[derive(Debug, serde::Serialize)]
struct LogEntry {
    event: &'static str,
    operation: &'static str,
    step: u32,
    past_len: usize,
    future_len: usize,
    state_hash: String,
    expected_hash: String,
    #[serde(rename = "match")]
    is_match: bool,
    op_time_ns: u64,
}

fn hash_state<T: Hash>(state: &T) -> String {
    let mut hasher = DefaultHasher::new();
    state.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn log_step<S: Hash + PartialEq, P: Clone + 'static>(
    store: &TemporalStore<S, P>,
    operation: &'static str,
    step: u32,
    actual: &S,
    expected: &S,
    started: Instant,
) -> String
where
    S: Clone + 'static,
{
    let entry = LogEntry {
        event: "temporal_step",
        operation,
        step,
        past_len: store.past_states().len(),
        future_len: store.future_states().len(),
        state_hash: hash_state(actual),
        expected_hash: hash_state(expected),
        is_match: actual == expected,
        op_time_ns: started.elapsed().as_nanos() as u64,
    };
    serde_json::to_string(&entry).unwrap()
}

// ============================================================================
// Editor state model (im::HashMap + im::Vector)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Editor {
    lines: ImVector<String>,
    cursor: usize,
    metadata: ImHashMap<String, String>,
}

impl Editor {
    fn new() -> Self {
        Self {
            lines: ImVector::new(),
            cursor: 0,
            metadata: ImHashMap::new(),
        }
    }

    fn insert_line(&mut self, idx: usize, text: String) {
        let pos = idx.min(self.lines.len());
        self.lines.insert(pos, text);
        self.cursor = pos;
    }

    fn delete_line(&mut self, idx: usize) {
        if !self.lines.is_empty() {
            let pos = idx.min(self.lines.len() - 1);
            self.lines.remove(pos);
            self.cursor = self.cursor.min(self.lines.len().saturating_sub(1));
        }
    }
}

/// The tracked part of an [`Editor`]: its text only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Text(ImVector<String>);

fn text_store(options: TemporalOptions<Editor, Text>) -> TemporalStore<Editor, Text> {
    TemporalStore::with_merge(Editor::new(), options, |editor: &mut Editor, text: Text| {
        editor.lines = text.0;
        editor.cursor = editor.cursor.min(editor.lines.len().saturating_sub(1));
    })
}

fn text_options() -> TemporalOptions<Editor, Text> {
    TemporalOptions::partialized(|editor: &Editor| Text(editor.lines.clone()))
}

// ============================================================================
// Sequential edits
// ============================================================================

#[test]
fn hundred_edits_full_undo_full_redo() {
    let store = TemporalStore::new(Editor::new(), TemporalOptions::new());
    let mut expected = vec![Editor::new()];
    let mut log = Vec::new();

    for step in 0..100u32 {
        let started = Instant::now();
        store.update(|editor| {
            if step % 7 == 6 {
                editor.delete_line(step as usize / 2);
            } else {
                editor.insert_line(step as usize, format!("line {step}"));
            }
            editor.metadata.insert("last".into(), step.to_string());
        });
        let actual = store.get_state();
        expected.push(actual.clone());
        log.push(log_step(&store, "edit", step, &actual, &actual, started));
    }
    assert_eq!(store.past_states().len(), 100);

    for step in (0..100u32).rev() {
        let started = Instant::now();
        assert_eq!(store.undo(1), 1);
        let actual = store.get_state();
        let want = &expected[step as usize];
        log.push(log_step(&store, "undo", step, &actual, want, started));
        assert_eq!(&actual, want, "undo mismatch at step {step}");
    }
    assert_eq!(store.get_state(), Editor::new());
    assert!(!store.can_undo());

    let started = Instant::now();
    assert_eq!(store.redo(usize::MAX), 100);
    let actual = store.get_state();
    log.push(log_step(&store, "redo_all", 100, &actual, &expected[100], started));
    assert_eq!(actual, expected[100]);
    assert!(store.future_states().is_empty());

    assert_eq!(log.len(), 201);
    assert!(log.iter().all(|line| line.contains("\"match\":true")));
}

#[test]
fn edit_after_undo_discards_redo_branch() {
    let store = TemporalStore::new(Editor::new(), TemporalOptions::new());
    for i in 0..5 {
        store.update(|e| e.insert_line(i, format!("a{i}")));
    }
    store.undo(3);
    assert_eq!(store.future_states().len(), 3);

    store.update(|e| e.insert_line(0, "branch".into()));
    assert!(!store.can_redo());
    assert_eq!(store.past_states().len(), 3);
    assert_eq!(store.get_state().lines.len(), 3);
}

// ============================================================================
// Partial snapshots
// ============================================================================

#[test]
fn cursor_is_not_rolled_back() {
    let store = text_store(text_options());
    store.update(|e| e.insert_line(0, "one".into()));
    store.update(|e| e.insert_line(1, "two".into()));
    store.update_untracked(|e| e.cursor = 0);

    store.undo(1);
    let editor = store.get_state();
    assert_eq!(editor.lines, ImVector::from(vec!["one".to_string()]));
    assert_eq!(editor.cursor, 0);
    assert_eq!(
        store.future_states(),
        vec![Text(ImVector::from(vec!["one".to_string(), "two".to_string()]))]
    );
}

#[test]
fn cursor_only_changes_are_suppressed_by_equality() {
    let store = text_store(text_options().equality_partial_eq());
    store.update(|e| e.insert_line(0, "x".into()));
    store.update(|e| e.cursor = 5);
    store.update(|e| {
        e.metadata.insert("k".into(), "v".into());
    });

    assert_eq!(store.past_states().len(), 1);
    assert_eq!(store.get_state().cursor, 5);
}

// ============================================================================
// Limit, pause, clear
// ============================================================================

#[test]
fn limit_keeps_most_recent_entries() {
    let store = TemporalStore::new(0u32, TemporalOptions::new().limit(3));
    for v in 1..=10 {
        store.set_state(v);
    }
    assert_eq!(store.past_states(), vec![7, 8, 9]);
    assert_eq!(store.undo(10), 3);
    assert_eq!(store.get_state(), 7);
}

#[test]
fn paused_edits_become_part_of_baseline() {
    let store = TemporalStore::new(ImVector::<u32>::new(), TemporalOptions::new());
    store.update(|v| v.push_back(1));
    store.pause();
    store.update(|v| v.push_back(2));
    store.update(|v| v.push_back(3));
    store.resume();
    store.update(|v| v.push_back(4));

    store.undo(1);
    assert_eq!(store.get_state(), ImVector::from(vec![1, 2, 3]));
    store.undo(1);
    assert_eq!(store.get_state(), ImVector::new());
}

#[test]
fn clear_keeps_state_and_tracking() {
    let store = TemporalStore::new(String::new(), TemporalOptions::new());
    store.update(|s| s.push('a'));
    store.update(|s| s.push('b'));
    store.undo(1);
    store.clear();

    assert_eq!(store.get_state(), "a");
    assert!(store.past_states().is_empty());
    assert!(store.future_states().is_empty());
    assert!(store.is_tracking());
}

// ============================================================================
// Subscribers
// ============================================================================

#[test]
fn history_events_carry_consistent_lengths() {
    let store = TemporalStore::new(0i64, TemporalOptions::new().equality_partial_eq());
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    let handle = store.clone();
    let _sub = store.subscribe_temporal(move |event| {
        assert_eq!(event.past_len, handle.past_states().len());
        assert_eq!(event.future_len, handle.future_states().len());
        sink.borrow_mut().push(event.change);
    });

    store.set_state(1);
    store.set_state(1);
    store.set_state(2);
    store.undo(2);
    store.redo(1);
    store.pause();
    store.clear();

    assert_eq!(
        *events.borrow(),
        vec![
            TemporalChange::Recorded,
            TemporalChange::Recorded,
            TemporalChange::Undone { steps: 2 },
            TemporalChange::Redone { steps: 1 },
            TemporalChange::Paused,
            TemporalChange::Cleared,
        ]
    );
}

#[test]
fn state_subscriber_sees_undo_result() {
    let store = TemporalStore::new(Editor::new(), TemporalOptions::new());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = store.subscribe(move |editor: &Editor| sink.borrow_mut().push(editor.lines.len()));

    store.update(|e| e.insert_line(0, "a".into()));
    store.update(|e| e.insert_line(0, "b".into()));
    store.undo(2);

    assert_eq!(*seen.borrow(), vec![1, 2, 0]);
}

#[test]
fn save_hook_observes_every_record() {
    let store = TemporalStore::new(0u8, TemporalOptions::new());
    let saved = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&saved);
    store.set_on_save(move |prior: &u8, current: &u8| sink.borrow_mut().push((*prior, *current)));

    store.set_state(1);
    store.set_state(2);
    store.undo(1);
    store.set_state(9);

    assert_eq!(*saved.borrow(), vec![(0, 1), (1, 2), (1, 9)]);
}
