#![forbid(unsafe_code)]

//! The public history tracker.
//!
//! [`Temporal`] owns the (possibly decorated) [`TemporalMachine`], the
//! optional recording wrapper and the list of history observers. Every
//! operation that changes the past stack, the future stack or the tracking
//! flag emits exactly one [`TemporalEvent`]; operations that change nothing
//! emit nothing.
//!
//! # Failure Modes
//!
//! - **Re-entrant record**: observers and the save hook run while the tracker
//!   is mutably borrowed. A host that keeps the tracker in a `RefCell` and
//!   records from inside one of them will panic on the borrow. Use
//!   [`Temporal::set_deferred`] to queue events and dispatch them after the
//!   borrow is released.

use std::collections::VecDeque;
use std::fmt;

use web_time::Instant;

use crate::history::History;
use crate::host::StateHost;
use crate::machine::{BaseMachine, TemporalMachine};
use crate::options::{HandleSet, TemporalOptions};
use crate::subscription::{Callback, Subscribers, Subscription};

/// What an emitted [`TemporalEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalChange {
    /// A snapshot was pushed onto past.
    Recorded,
    /// `steps` undo steps were applied.
    Undone { steps: usize },
    /// `steps` redo steps were applied.
    Redone { steps: usize },
    /// Both stacks were emptied.
    Cleared,
    /// Tracking was switched off.
    Paused,
    /// Tracking was switched back on.
    Resumed,
    /// The save hook was replaced or removed.
    SaveHookReplaced,
}

/// Tracker state after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporalEvent {
    pub change: TemporalChange,
    pub past_len: usize,
    pub future_len: usize,
    pub is_tracking: bool,
}

/// Events queued while the tracker is in deferred mode.
///
/// Dispatch them once the tracker is no longer borrowed.
#[must_use = "pending events are lost unless dispatched"]
pub struct PendingEvents {
    callbacks: Vec<Callback<TemporalEvent>>,
    events: Vec<TemporalEvent>,
}

impl PendingEvents {
    /// Queued events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[TemporalEvent] {
        &self.events
    }

    /// True when nothing was queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Deliver every queued event to every live observer, in order.
    pub fn dispatch(self) {
        for event in &self.events {
            for cb in &self.callbacks {
                cb(event);
            }
        }
    }
}

impl fmt::Debug for PendingEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingEvents")
            .field("events", &self.events)
            .field("observers", &self.callbacks.len())
            .finish()
    }
}

/// Undo/redo history tracker over full state `S` with snapshots `P`.
///
/// # Invariants
///
/// 1. At most one past entry is added per [`record`](Self::record) commit.
/// 2. Future is empty right after a successful record.
/// 3. `past_states().len() <= limit` when a limit is configured.
/// 4. Undo and redo write to the host only through
///    [`StateHost::set_state_untracked`].
pub struct Temporal<S, P = S> {
    machine: Box<dyn TemporalMachine<S, P>>,
    handle_set: Option<HandleSet<P>>,
    subscribers: Subscribers<TemporalEvent>,
    /// `Some` while events are queued instead of delivered.
    deferred: Option<Vec<TemporalEvent>>,
}

impl<S, P> fmt::Debug for Temporal<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Temporal")
            .field("history", self.machine.history())
            .field("is_tracking", &self.machine.is_tracking())
            .field("handle_set", &self.handle_set.is_some())
            .field("subscribers", &self.subscribers.len())
            .field("deferred", &self.deferred.is_some())
            .finish()
    }
}

impl<S: Clone + 'static> Default for Temporal<S, S> {
    fn default() -> Self {
        Self::new(TemporalOptions::new())
    }
}

impl<S: 'static, P: 'static> Temporal<S, P> {
    /// Build a tracker, applying `wrap_temporal` once over the base machine.
    #[must_use]
    pub fn new(options: TemporalOptions<S, P>) -> Self {
        let (base, wrap_temporal, handle_set) = BaseMachine::from_options(options);
        let base: Box<dyn TemporalMachine<S, P>> = Box::new(base);
        let machine = match wrap_temporal {
            Some(wrap) => wrap(base),
            None => base,
        };
        Self {
            machine,
            handle_set,
            subscribers: Subscribers::new(),
            deferred: None,
        }
    }
}

impl<S, P> Temporal<S, P> {
    // ====================================================================
    // Query
    // ====================================================================

    /// Both stacks.
    #[must_use]
    pub fn history(&self) -> &History<P> {
        self.machine.history()
    }

    /// Snapshots available for undo, oldest first.
    #[must_use]
    pub fn past_states(&self) -> &VecDeque<P> {
        self.machine.history().past()
    }

    /// Snapshots available for redo, the next redo target last.
    #[must_use]
    pub fn future_states(&self) -> &VecDeque<P> {
        self.machine.history().future()
    }

    /// Whether mutations are currently recorded.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.machine.is_tracking()
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.machine.history().past_len() > 0
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.machine.history().future_len() > 0
    }

    /// Snapshot `state` the way this tracker stores it.
    ///
    /// Hosts call this before a mutation to obtain the prior snapshot.
    #[must_use]
    pub fn snapshot(&self, state: &S) -> P {
        self.machine.snapshot(state)
    }

    // ====================================================================
    // Core Operations
    // ====================================================================

    /// Record a mutation. `prior` is the snapshot taken before it; `host`
    /// must already hold the post-mutation state.
    ///
    /// Goes through the `handle_set` wrapper when one is configured.
    /// Returns `true` if a past entry was pushed.
    pub fn record(&mut self, prior: P, host: &dyn StateHost<S, P>) -> bool {
        let machine = &mut self.machine;
        let mut committed = 0usize;
        match self.handle_set.as_mut() {
            Some(wrapper) => {
                let mut commit = |prior: P| {
                    if machine.handle_set(prior, host) {
                        committed += 1;
                    }
                };
                wrapper(prior, &mut commit);
            }
            None => {
                if machine.handle_set(prior, host) {
                    committed += 1;
                }
            }
        }
        for _ in 0..committed {
            self.emit(TemporalChange::Recorded);
        }
        committed > 0
    }

    /// Undo up to `steps` recorded changes. Returns the number applied.
    ///
    /// `steps == 0` does nothing; more steps than past entries are clamped.
    pub fn undo(&mut self, steps: usize, host: &mut dyn StateHost<S, P>) -> usize {
        let start = Instant::now();
        let span = tracing::debug_span!(
            "temporal.undo",
            steps = steps as u64,
            applied = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );
        let _guard = span.enter();

        let applied = self.machine.undo(steps, host);

        let duration_us = start.elapsed().as_micros() as u64;
        span.record("applied", applied as u64);
        span.record("duration_us", duration_us);
        tracing::debug!(
            target: "rewind.temporal",
            steps = steps as u64,
            applied = applied as u64,
            duration_us,
            "undo applied"
        );
        if applied > 0 {
            self.emit(TemporalChange::Undone { steps: applied });
        }
        applied
    }

    /// Redo up to `steps` undone changes. Returns the number applied.
    ///
    /// `steps == 0` does nothing; more steps than future entries are clamped.
    pub fn redo(&mut self, steps: usize, host: &mut dyn StateHost<S, P>) -> usize {
        let start = Instant::now();
        let span = tracing::debug_span!(
            "temporal.redo",
            steps = steps as u64,
            applied = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );
        let _guard = span.enter();

        let applied = self.machine.redo(steps, host);

        let duration_us = start.elapsed().as_micros() as u64;
        span.record("applied", applied as u64);
        span.record("duration_us", duration_us);
        tracing::debug!(
            target: "rewind.temporal",
            steps = steps as u64,
            applied = applied as u64,
            duration_us,
            "redo applied"
        );
        if applied > 0 {
            self.emit(TemporalChange::Redone { steps: applied });
        }
        applied
    }

    /// Empty both stacks. Host state and tracking are untouched.
    pub fn clear(&mut self) {
        if self.machine.history().is_empty() {
            return;
        }
        self.machine.clear();
        tracing::debug!(target: "rewind.temporal", "history cleared");
        self.emit(TemporalChange::Cleared);
    }

    /// Stop recording. Undo and redo stay available.
    pub fn pause(&mut self) {
        if !self.machine.is_tracking() {
            return;
        }
        self.machine.pause();
        tracing::debug!(target: "rewind.temporal", "tracking paused");
        self.emit(TemporalChange::Paused);
    }

    /// Resume recording.
    pub fn resume(&mut self) {
        if self.machine.is_tracking() {
            return;
        }
        self.machine.resume();
        tracing::debug!(target: "rewind.temporal", "tracking resumed");
        self.emit(TemporalChange::Resumed);
    }

    /// Replace the save hook.
    pub fn set_on_save(&mut self, on_save: impl FnMut(&P, &P) + 'static) {
        self.machine.set_on_save(Some(Box::new(on_save)));
        self.emit(TemporalChange::SaveHookReplaced);
    }

    /// Remove the save hook.
    pub fn remove_on_save(&mut self) {
        self.machine.set_on_save(None);
        self.emit(TemporalChange::SaveHookReplaced);
    }

    // ====================================================================
    // Observers
    // ====================================================================

    /// Observe history changes. Dropping the guard unsubscribes.
    pub fn subscribe(&mut self, callback: impl Fn(&TemporalEvent) + 'static) -> Subscription {
        self.subscribers.subscribe(callback)
    }

    /// Number of registered observers (including dead ones not yet pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Queue events instead of delivering them immediately.
    ///
    /// Turning deferral off does not deliver anything already queued; call
    /// [`take_pending`](Self::take_pending) for that.
    pub fn set_deferred(&mut self, deferred: bool) {
        match (deferred, self.deferred.is_some()) {
            (true, false) => self.deferred = Some(Vec::new()),
            (false, true) => {
                let dropped = self.deferred.take().map_or(0, |queue| queue.len());
                if dropped > 0 {
                    tracing::warn!(
                        target: "rewind.temporal",
                        dropped = dropped as u64,
                        "deferral disabled with undelivered events"
                    );
                }
            }
            _ => {}
        }
    }

    /// Drain queued events together with the observers to deliver them to.
    pub fn take_pending(&mut self) -> PendingEvents {
        let events = self
            .deferred
            .as_mut()
            .map(std::mem::take)
            .unwrap_or_default();
        let callbacks = if events.is_empty() {
            Vec::new()
        } else {
            self.subscribers.live()
        };
        PendingEvents { callbacks, events }
    }

    fn emit(&mut self, change: TemporalChange) {
        let history = self.machine.history();
        let event = TemporalEvent {
            change,
            past_len: history.past_len(),
            future_len: history.future_len(),
            is_tracking: self.machine.is_tracking(),
        };
        if let Some(queue) = self.deferred.as_mut() {
            queue.push(event);
            return;
        }
        for cb in self.subscribers.live() {
            cb(&event);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
