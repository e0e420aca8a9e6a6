#![forbid(unsafe_code)]

//! Construction-time options for a [`Temporal`](crate::Temporal) tracker.
//!
//! Every option is independent and optional. An absent option has a fixed
//! meaning:
//!
//! | Option           | Absent means                                  |
//! |------------------|-----------------------------------------------|
//! | `partialize`     | snapshots are clones of the full state        |
//! | `equality`       | every mutation is distinct (always recorded)  |
//! | `limit`          | past grows without bound                      |
//! | `on_save`        | nothing runs after a record                   |
//! | `wrap_temporal`  | the base state machine is used as is          |
//! | `handle_set`     | records go straight to the state machine      |
//!
//! ```ignore
//! let options = TemporalOptions::<Doc>::new()
//!     .limit(50)
//!     .equality_partial_eq()
//!     .on_save(|past, current| tracing::info!(?past, ?current, "saved"));
//! ```

use std::fmt;
use std::num::NonZeroUsize;

use crate::config::TemporalConfig;
use crate::machine::TemporalMachine;

/// Projection from full state to the stored snapshot.
pub type Partialize<S, P> = Box<dyn Fn(&S) -> P>;

/// Snapshot equality. `true` suppresses the record.
pub type Equality<P> = Box<dyn Fn(&P, &P) -> bool>;

/// Hook fired with `(stored, current)` after every successful record.
pub type OnSave<P> = Box<dyn FnMut(&P, &P)>;

/// Decorator applied once over the base state machine.
pub type WrapTemporal<S, P> =
    Box<dyn FnOnce(Box<dyn TemporalMachine<S, P>>) -> Box<dyn TemporalMachine<S, P>>>;

/// Wrapper around the recording entry point.
///
/// Receives the prior snapshot and a `commit` continuation that runs the
/// normal recording policy. Not calling `commit` drops the record.
pub type HandleSet<P> = Box<dyn FnMut(P, &mut dyn FnMut(P))>;

/// Options for building a tracker over full state `S` with snapshots `P`.
pub struct TemporalOptions<S, P = S> {
    pub(crate) past_states: Vec<P>,
    pub(crate) future_states: Vec<P>,
    pub(crate) partialize: Partialize<S, P>,
    pub(crate) equality: Option<Equality<P>>,
    pub(crate) limit: Option<NonZeroUsize>,
    pub(crate) on_save: Option<OnSave<P>>,
    pub(crate) wrap_temporal: Option<WrapTemporal<S, P>>,
    pub(crate) handle_set: Option<HandleSet<P>>,
    pub(crate) start_paused: bool,
}

impl<S, P> fmt::Debug for TemporalOptions<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporalOptions")
            .field("past_states", &self.past_states.len())
            .field("future_states", &self.future_states.len())
            .field("equality", &self.equality.is_some())
            .field("limit", &self.limit)
            .field("on_save", &self.on_save.is_some())
            .field("wrap_temporal", &self.wrap_temporal.is_some())
            .field("handle_set", &self.handle_set.is_some())
            .field("start_paused", &self.start_paused)
            .finish()
    }
}

impl<S: Clone + 'static> TemporalOptions<S, S> {
    /// Options storing full-state snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self::partialized(S::clone)
    }
}

impl<S: Clone + 'static> Default for TemporalOptions<S, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, P> TemporalOptions<S, P> {
    /// Options storing `partialize(state)` instead of the full state.
    #[must_use]
    pub fn partialized(partialize: impl Fn(&S) -> P + 'static) -> Self {
        Self {
            past_states: Vec::new(),
            future_states: Vec::new(),
            partialize: Box::new(partialize),
            equality: None,
            limit: None,
            on_save: None,
            wrap_temporal: None,
            handle_set: None,
            start_paused: false,
        }
    }

    /// Seed the past stack (oldest first).
    #[must_use]
    pub fn past_states(mut self, states: Vec<P>) -> Self {
        self.past_states = states;
        self
    }

    /// Seed the future stack (next redo target last).
    #[must_use]
    pub fn future_states(mut self, states: Vec<P>) -> Self {
        self.future_states = states;
        self
    }

    /// Suppress records for which `equality(prior, current)` is true.
    #[must_use]
    pub fn equality(mut self, equality: impl Fn(&P, &P) -> bool + 'static) -> Self {
        self.equality = Some(Box::new(equality));
        self
    }

    /// Bound the past stack. `0` means unbounded.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = NonZeroUsize::new(limit);
        self
    }

    /// Hook fired with `(stored, current)` after every successful record.
    #[must_use]
    pub fn on_save(mut self, hook: impl FnMut(&P, &P) + 'static) -> Self {
        self.on_save = Some(Box::new(hook));
        self
    }

    /// Decorate the base state machine.
    #[must_use]
    pub fn wrap_temporal(
        mut self,
        wrap: impl FnOnce(Box<dyn TemporalMachine<S, P>>) -> Box<dyn TemporalMachine<S, P>> + 'static,
    ) -> Self {
        self.wrap_temporal = Some(Box::new(wrap));
        self
    }

    /// Wrap the recording entry point (see [`throttle`](crate::throttle)).
    #[must_use]
    pub fn handle_set(mut self, handle_set: impl FnMut(P, &mut dyn FnMut(P)) + 'static) -> Self {
        self.handle_set = Some(Box::new(handle_set));
        self
    }

    /// Start with tracking paused.
    #[must_use]
    pub fn start_paused(mut self, paused: bool) -> Self {
        self.start_paused = paused;
        self
    }

    /// Apply a data-only [`TemporalConfig`] on top of these options.
    ///
    /// Only fields the config sets are applied: an absent `limit` keeps the
    /// current bound (`limit = 0` clears it) and `start_paused = false`
    /// leaves an earlier `start_paused(true)` in place.
    #[must_use]
    pub fn with_config(mut self, config: &TemporalConfig) -> Self {
        if let Some(limit) = config.limit {
            self = self.limit(limit);
        }
        if config.start_paused {
            self = self.start_paused(true);
        }
        self
    }

    /// Configured past-stack bound.
    #[must_use]
    pub fn configured_limit(&self) -> Option<NonZeroUsize> {
        self.limit
    }
}

impl<S, P: PartialEq + 'static> TemporalOptions<S, P> {
    /// Suppress records whose prior snapshot equals the current one by `PartialEq`.
    #[must_use]
    pub fn equality_partial_eq(self) -> Self {
        self.equality(|a: &P, b: &P| a == b)
    }
}
