#![forbid(unsafe_code)]

//! Observable state cell with built-in undo/redo history.
//!
//! # Design
//!
//! [`TemporalStore<S, P>`] keeps its value in shared, reference-counted
//! storage (`Rc<RefCell<..>>`) next to a [`Temporal<S, P>`] tracker. Tracked
//! writes snapshot the state, apply the change, notify state subscribers and
//! then hand the prior snapshot to the tracker. Undo and redo write back
//! through an untracked path, so traversal never lands in history.
//!
//! ```text
//! set_state(next)
//!   prior = snapshot(value)
//!   value = next; version += 1        (only if value changed)
//!   notify state subscribers          (only if value changed)
//!   temporal.record(prior)
//!   dispatch temporal events
//! ```
//!
//! # Performance
//!
//! | Operation       | Complexity                          |
//! |-----------------|-------------------------------------|
//! | `get_state()`   | O(clone S)                          |
//! | `set_state()`   | O(clone S + subscribers)            |
//! | `undo(n)`       | O(n * clone S + subscribers)        |
//!
//! # Failure Modes
//!
//! - **Write from inside `update`**: the closure runs on a private copy, so
//!   reading the store from it is fine, but its writes are overwritten.
//! - **Store access from the save hook**: the hook runs while the tracker is
//!   borrowed; calling back into the store panics on the `RefCell` borrow.
//!   State and history subscribers run after every borrow is released and
//!   may use the store freely.

use std::cell::RefCell;
use std::rc::Rc;

use rewind_core::{StateHost, Subscribers, Subscription, Temporal, TemporalEvent, TemporalOptions};
use tracing::{info, info_span};
use web_time::Instant;

/// Merge a snapshot into the full state.
type Merge<S, P> = Rc<dyn Fn(&mut S, P)>;

/// Shared interior for [`TemporalStore`].
struct StoreInner<S> {
    value: S,
    version: u64,
    subscribers: Subscribers<S>,
    /// Open [`TemporalStore::batch`] scopes.
    batch_depth: u32,
    /// A notification is owed once the outermost batch exits.
    dirty: bool,
}

/// A shared state container whose tracked writes are recorded for undo.
///
/// Cloning a `TemporalStore` creates a new handle to the **same** state,
/// history and subscribers.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing write,
///    tracked or not.
/// 2. Every tracked write reaches [`Temporal::record`], even one that leaves
///    the value unchanged; the configured equality decides what is kept.
/// 3. State subscribers are notified only when the value changed, at most
///    once per operation.
/// 4. Undo and redo never add history entries of their own.
pub struct TemporalStore<S, P = S> {
    inner: Rc<RefCell<StoreInner<S>>>,
    temporal: Rc<RefCell<Temporal<S, P>>>,
    merge: Merge<S, P>,
}

impl<S, P> Clone for TemporalStore<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            temporal: Rc::clone(&self.temporal),
            merge: Rc::clone(&self.merge),
        }
    }
}

impl<S: std::fmt::Debug, P> std::fmt::Debug for TemporalStore<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TemporalStore")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .field("temporal", &*self.temporal.borrow())
            .finish()
    }
}

impl<S: Clone + PartialEq + 'static> TemporalStore<S, S> {
    /// Create a store recording full-state snapshots.
    ///
    /// Undo and redo replace the whole value with the stored snapshot.
    #[must_use]
    pub fn new(initial: S, options: TemporalOptions<S, S>) -> Self {
        Self::with_merge(initial, options, |state: &mut S, snapshot: S| *state = snapshot)
    }
}

impl<S: Clone + PartialEq + 'static, P: 'static> TemporalStore<S, P> {
    /// Create a store recording partial snapshots.
    ///
    /// `merge` folds a snapshot produced by the configured projection back
    /// into the full state when undo or redo applies it.
    #[must_use]
    pub fn with_merge(
        initial: S,
        options: TemporalOptions<S, P>,
        merge: impl Fn(&mut S, P) + 'static,
    ) -> Self {
        let mut temporal = Temporal::new(options);
        temporal.set_deferred(true);
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                value: initial,
                version: 0,
                subscribers: Subscribers::new(),
                batch_depth: 0,
                dirty: false,
            })),
            temporal: Rc::new(RefCell::new(temporal)),
            merge: Rc::new(merge),
        }
    }

    // ====================================================================
    // State
    // ====================================================================

    /// Get a clone of the current value.
    #[must_use]
    pub fn get_state(&self) -> S {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Current version number.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Replace the value and record the change.
    pub fn set_state(&self, value: S) {
        let prior = self.snapshot_current();
        if self.replace(value) {
            self.notify();
        }
        self.record(prior);
    }

    /// Modify a copy of the value, then store it and record the change.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        let mut next = self.get_state();
        f(&mut next);
        self.set_state(next);
    }

    /// Replace the value without recording it.
    pub fn set_state_untracked(&self, value: S) {
        if self.replace(value) {
            self.notify();
        }
    }

    /// Modify a copy of the value, then store it without recording it.
    pub fn update_untracked(&self, f: impl FnOnce(&mut S)) {
        let mut next = self.get_state();
        f(&mut next);
        self.set_state_untracked(next);
    }

    /// Run `f` with state notifications coalesced.
    ///
    /// Writes inside the scope are applied and recorded immediately; state
    /// subscribers hear about them once, when the outermost scope exits.
    /// History subscribers are not affected.
    ///
    /// The scope is closed even if `f` panics. A pending notification is
    /// dropped in that case and the next change notifies as usual.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = BatchGuard::new(self);
        f()
    }

    /// Subscribe to value changes. Dropping the guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&S) + 'static) -> Subscription {
        self.inner.borrow_mut().subscribers.subscribe(callback)
    }

    /// Number of registered state subscribers (including dead ones not yet
    /// pruned).
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    // ====================================================================
    // History
    // ====================================================================

    /// Undo up to `steps` recorded changes. Returns the number applied.
    pub fn undo(&self, steps: usize) -> usize {
        self.traverse(|temporal, host| temporal.undo(steps, host))
    }

    /// Redo up to `steps` undone changes. Returns the number applied.
    pub fn redo(&self, steps: usize) -> usize {
        self.traverse(|temporal, host| temporal.redo(steps, host))
    }

    /// Empty both history stacks. The value is untouched.
    pub fn clear(&self) {
        self.with_temporal_mut(Temporal::clear);
    }

    /// Stop recording tracked writes.
    pub fn pause(&self) {
        self.with_temporal_mut(Temporal::pause);
    }

    /// Resume recording tracked writes.
    pub fn resume(&self) {
        self.with_temporal_mut(Temporal::resume);
    }

    /// Replace the save hook.
    ///
    /// The hook runs while the history is borrowed and must not call back
    /// into the store.
    pub fn set_on_save(&self, on_save: impl FnMut(&P, &P) + 'static) {
        self.with_temporal_mut(|temporal| temporal.set_on_save(on_save));
    }

    /// Remove the save hook.
    pub fn remove_on_save(&self) {
        self.with_temporal_mut(Temporal::remove_on_save);
    }

    /// Whether tracked writes are currently recorded.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.temporal.borrow().is_tracking()
    }

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.temporal.borrow().can_undo()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.temporal.borrow().can_redo()
    }

    /// Subscribe to history changes. Dropping the guard unsubscribes.
    pub fn subscribe_temporal(&self, callback: impl Fn(&TemporalEvent) + 'static) -> Subscription {
        self.temporal.borrow_mut().subscribe(callback)
    }

    /// Read access to the tracker.
    pub fn with_temporal<R>(&self, f: impl FnOnce(&Temporal<S, P>) -> R) -> R {
        f(&*self.temporal.borrow())
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn snapshot_current(&self) -> P {
        let inner = self.inner.borrow();
        self.temporal.borrow().snapshot(&inner.value)
    }

    /// Store `value`. Returns `true` if it differs from the current one.
    fn replace(&self, value: S) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.value == value {
            return false;
        }
        inner.value = value;
        inner.version += 1;
        true
    }

    fn record(&self, prior: P) {
        let pending = {
            let mut temporal = self.temporal.borrow_mut();
            let host = StoreHost::new(&self.inner, self.merge.as_ref());
            temporal.record(prior, &host);
            temporal.take_pending()
        };
        pending.dispatch();
    }

    fn traverse(
        &self,
        step: impl FnOnce(&mut Temporal<S, P>, &mut StoreHost<'_, S, P>) -> usize,
    ) -> usize {
        let (applied, changed, pending) = {
            let mut temporal = self.temporal.borrow_mut();
            let mut host = StoreHost::new(&self.inner, self.merge.as_ref());
            let applied = step(&mut *temporal, &mut host);
            (applied, host.changed, temporal.take_pending())
        };
        if changed {
            self.notify();
        }
        pending.dispatch();
        applied
    }

    fn with_temporal_mut(&self, f: impl FnOnce(&mut Temporal<S, P>)) {
        let pending = {
            let mut temporal = self.temporal.borrow_mut();
            f(&mut *temporal);
            temporal.take_pending()
        };
        pending.dispatch();
    }

    /// Notify live state subscribers, or mark the batch dirty.
    fn notify(&self) {
        let (value, version, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            if inner.batch_depth > 0 {
                inner.dirty = true;
                return;
            }
            let callbacks = inner.subscribers.live();
            if callbacks.is_empty() {
                return;
            }
            (inner.value.clone(), inner.version, callbacks)
        };

        let subscribers = callbacks.len() as u64;
        let start = Instant::now();
        let _span = info_span!(
            "store.notify",
            subscribers,
            version,
            duration_us = tracing::field::Empty
        )
        .entered();

        for cb in &callbacks {
            cb(&value);
        }

        let duration_us = start.elapsed().as_micros() as u64;
        tracing::Span::current().record("duration_us", duration_us);
        info!(
            target: "rewind.store",
            subscribers,
            version,
            duration_us,
            "state subscribers notified"
        );
    }
}

impl<S: Clone + PartialEq + 'static, P: Clone + 'static> TemporalStore<S, P> {
    /// Snapshots available for undo, oldest first.
    #[must_use]
    pub fn past_states(&self) -> Vec<P> {
        self.temporal.borrow().past_states().iter().cloned().collect()
    }

    /// Snapshots available for redo, the next redo target last.
    #[must_use]
    pub fn future_states(&self) -> Vec<P> {
        self.temporal.borrow().future_states().iter().cloned().collect()
    }
}

/// Open batch scope. Dropping it closes the scope and flushes the owed
/// notification once the outermost scope is gone.
struct BatchGuard<'a, S: Clone + PartialEq + 'static, P: 'static> {
    store: &'a TemporalStore<S, P>,
}

impl<'a, S: Clone + PartialEq + 'static, P: 'static> BatchGuard<'a, S, P> {
    fn new(store: &'a TemporalStore<S, P>) -> Self {
        store.inner.borrow_mut().batch_depth += 1;
        Self { store }
    }
}

impl<S: Clone + PartialEq + 'static, P: 'static> Drop for BatchGuard<'_, S, P> {
    fn drop(&mut self) {
        let flush = {
            let mut inner = self.store.inner.borrow_mut();
            inner.batch_depth = inner.batch_depth.saturating_sub(1);
            inner.batch_depth == 0 && std::mem::take(&mut inner.dirty)
        };
        // Subscribers must not run while unwinding.
        if flush && !std::thread::panicking() {
            self.store.notify();
        }
    }
}

/// The store as seen by its tracker during a single operation.
struct StoreHost<'a, S, P> {
    inner: &'a RefCell<StoreInner<S>>,
    merge: &'a dyn Fn(&mut S, P),
    /// Set when an untracked write changed the value.
    changed: bool,
}

impl<'a, S, P> StoreHost<'a, S, P> {
    fn new(inner: &'a RefCell<StoreInner<S>>, merge: &'a dyn Fn(&mut S, P)) -> Self {
        Self {
            inner,
            merge,
            changed: false,
        }
    }
}

impl<S: Clone + PartialEq, P> StateHost<S, P> for StoreHost<'_, S, P> {
    fn get_state(&self) -> S {
        self.inner.borrow().value.clone()
    }

    // Recording is driven by the store around this call.
    fn set_state(&mut self, snapshot: P) {
        self.set_state_untracked(snapshot);
    }

    fn set_state_untracked(&mut self, snapshot: P) {
        let mut inner = self.inner.borrow_mut();
        let mut next = inner.value.clone();
        (self.merge)(&mut next, snapshot);
        if next != inner.value {
            inner.value = next;
            inner.version += 1;
            self.changed = true;
        }
    }
}
