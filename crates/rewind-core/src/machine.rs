#![forbid(unsafe_code)]

//! The history-tracking state machine.
//!
//! [`TemporalMachine`] is the seam decorators plug into: the base machine
//! built from [`TemporalOptions`] can be wrapped once at construction (see
//! [`TemporalOptions::wrap_temporal`]) by any type that implements the trait
//! and delegates to the inner machine.
//!
//! # Recording policy
//!
//! ```text
//! handle_set(prior)
//!   tracking paused?                 -> drop
//!   current = partialize(host state)
//!   equality(prior, current)?        -> drop
//!   past full?                       -> evict oldest
//!   past.push(prior); on_save(prior, current); future.clear()
//! ```
//!
//! # Traversal
//!
//! Each undo step pops the newest past entry, pushes the snapshot of the
//! state being left onto future, then applies the popped entry through the
//! host's untracked write path. Redo mirrors this. Step counts larger than
//! the stack are clamped; a zero step count does nothing.

use std::num::NonZeroUsize;

use crate::history::History;
use crate::host::StateHost;
use crate::options::{Equality, HandleSet, OnSave, Partialize, TemporalOptions, WrapTemporal};

/// Operations of a history tracker over full state `S` and snapshots `P`.
pub trait TemporalMachine<S, P> {
    /// Read-only view of both stacks.
    fn history(&self) -> &History<P>;

    /// Whether records are currently accepted.
    fn is_tracking(&self) -> bool;

    /// Snapshot `state` the way this machine stores it.
    fn snapshot(&self, state: &S) -> P;

    /// Recording entry point. `prior` is the snapshot taken before the
    /// mutation; `host` already holds the post-mutation state.
    ///
    /// Returns `true` if a past entry was pushed.
    fn handle_set(&mut self, prior: P, host: &dyn StateHost<S, P>) -> bool;

    /// Walk back up to `steps` entries. Returns the number of steps taken.
    fn undo(&mut self, steps: usize, host: &mut dyn StateHost<S, P>) -> usize;

    /// Walk forward up to `steps` entries. Returns the number of steps taken.
    fn redo(&mut self, steps: usize, host: &mut dyn StateHost<S, P>) -> usize;

    /// Empty both stacks.
    fn clear(&mut self);

    /// Stop accepting records.
    fn pause(&mut self);

    /// Accept records again.
    fn resume(&mut self);

    /// Replace the save hook.
    fn set_on_save(&mut self, on_save: Option<OnSave<P>>);
}

/// The state machine every tracker starts from.
pub struct BaseMachine<S, P> {
    history: History<P>,
    is_tracking: bool,
    on_save: Option<OnSave<P>>,
    partialize: Partialize<S, P>,
    equality: Option<Equality<P>>,
    limit: Option<NonZeroUsize>,
}

impl<S, P> std::fmt::Debug for BaseMachine<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseMachine")
            .field("history", &self.history)
            .field("is_tracking", &self.is_tracking)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl<S, P> BaseMachine<S, P> {
    /// Build the base machine from `options`.
    ///
    /// The decorator and the recording wrapper are not part of the machine
    /// and are handed back to the caller.
    pub(crate) fn from_options(
        options: TemporalOptions<S, P>,
    ) -> (Self, Option<WrapTemporal<S, P>>, Option<HandleSet<P>>) {
        let TemporalOptions {
            past_states,
            future_states,
            partialize,
            equality,
            limit,
            on_save,
            wrap_temporal,
            handle_set,
            start_paused,
        } = options;
        let machine = Self {
            history: History::seeded(past_states, future_states, limit),
            is_tracking: !start_paused,
            on_save,
            partialize,
            equality,
            limit,
        };
        (machine, wrap_temporal, handle_set)
    }

    fn walk(
        &mut self,
        steps: usize,
        host: &mut dyn StateHost<S, P>,
        direction: Direction,
    ) -> usize {
        if steps == 0 {
            return 0;
        }
        let mut applied = 0;
        while applied < steps {
            let target = match direction {
                Direction::Back => self.history.pop_past(),
                Direction::Forward => self.history.pop_future(),
            };
            let Some(target) = target else {
                break;
            };
            let leaving = (self.partialize)(&host.get_state());
            match direction {
                Direction::Back => self.history.push_future(leaving),
                Direction::Forward => {
                    self.history.push_past_bounded(leaving, self.limit);
                }
            }
            host.set_state_untracked(target);
            applied += 1;
        }
        applied
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Back,
    Forward,
}

impl<S, P> TemporalMachine<S, P> for BaseMachine<S, P> {
    fn history(&self) -> &History<P> {
        &self.history
    }

    fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    fn snapshot(&self, state: &S) -> P {
        (self.partialize)(state)
    }

    fn handle_set(&mut self, prior: P, host: &dyn StateHost<S, P>) -> bool {
        if !self.is_tracking {
            tracing::trace!(target: "rewind.temporal", "record dropped: tracking paused");
            return false;
        }
        let current = (self.partialize)(&host.get_state());
        if self
            .equality
            .as_ref()
            .is_some_and(|equal| equal(&prior, &current))
        {
            tracing::debug!(target: "rewind.temporal", "record suppressed: snapshot unchanged");
            return false;
        }

        let evicted = self.history.push_past_bounded(prior, self.limit);
        if let Some(on_save) = self.on_save.as_mut()
            && let Some(stored) = self.history.past().back()
        {
            on_save(stored, &current);
        }
        let future_dropped = self.history.clear_future();

        tracing::debug!(
            target: "rewind.temporal",
            past_len = self.history.past_len(),
            evicted,
            future_dropped,
            "snapshot recorded"
        );
        true
    }

    fn undo(&mut self, steps: usize, host: &mut dyn StateHost<S, P>) -> usize {
        self.walk(steps, host, Direction::Back)
    }

    fn redo(&mut self, steps: usize, host: &mut dyn StateHost<S, P>) -> usize {
        self.walk(steps, host, Direction::Forward)
    }

    fn clear(&mut self) {
        self.history.clear();
    }

    fn pause(&mut self) {
        self.is_tracking = false;
    }

    fn resume(&mut self) {
        self.is_tracking = true;
    }

    fn set_on_save(&mut self, on_save: Option<OnSave<P>>) {
        self.on_save = on_save;
    }
}
