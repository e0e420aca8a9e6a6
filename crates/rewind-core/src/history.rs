#![forbid(unsafe_code)]

//! Past/future snapshot stacks.
//!
//! [`History`] holds the two ordered sequences the tracker walks during
//! undo and redo. Both are stored oldest-first, so the next entry to be
//! consumed by either traversal is always at the back.
//!
//! # Architecture
//!
//! ```text
//! record(s0), record(s1), record(s2)   (host now at s3)
//! ┌──────────────────────────────────────────┐
//! │ Past:    [s0, s1, s2]                    │
//! │ Future:  []                              │
//! └──────────────────────────────────────────┘
//!
//! undo(2)
//! ┌──────────────────────────────────────────┐
//! │ Past:    [s0]                            │
//! │ Future:  [s3, s2]                        │
//! │ Host:    s1                              │
//! └──────────────────────────────────────────┘
//!
//! record(s1) after host moves s1 -> s4: future dropped
//! ┌──────────────────────────────────────────┐
//! │ Past:    [s0, s1]                        │
//! │ Future:  []                              │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. `past.len() <= limit` after every bounded push.
//! 2. Only the owning tracker mutates the stacks; callers get read-only views.

use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;

/// The two snapshot stacks of a tracker.
#[derive(Clone)]
pub struct History<P> {
    /// Snapshots available for undo (most recent at back).
    past: VecDeque<P>,
    /// Snapshots available for redo (most recently undone at back).
    future: VecDeque<P>,
}

impl<P> fmt::Debug for History<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("past_len", &self.past.len())
            .field("future_len", &self.future.len())
            .finish()
    }
}

impl<P> Default for History<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> History<P> {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
        }
    }

    /// Create a history pre-seeded with past and future entries.
    ///
    /// When `limit` is set and `past` is longer, the oldest seeds are dropped.
    #[must_use]
    pub fn seeded(past: Vec<P>, future: Vec<P>, limit: Option<NonZeroUsize>) -> Self {
        let mut history = Self {
            past: past.into(),
            future: future.into(),
        };
        if let Some(limit) = limit {
            while history.past.len() > limit.get() {
                history.past.pop_front();
            }
        }
        history
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Snapshots available for undo, oldest first.
    #[must_use]
    pub fn past(&self) -> &VecDeque<P> {
        &self.past
    }

    /// Snapshots available for redo, the next redo target last.
    #[must_use]
    pub fn future(&self) -> &VecDeque<P> {
        &self.future
    }

    /// Number of undoable entries.
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redoable entries.
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    /// True when neither stack holds anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.past.is_empty() && self.future.is_empty()
    }

    // ====================================================================
    // Mutation (tracker only)
    // ====================================================================

    /// Append to past, evicting from the front until there is room.
    ///
    /// Returns the number of evicted entries.
    pub(crate) fn push_past_bounded(&mut self, snapshot: P, limit: Option<NonZeroUsize>) -> usize {
        let mut evicted = 0;
        if let Some(limit) = limit {
            while self.past.len() >= limit.get() {
                self.past.pop_front();
                evicted += 1;
            }
        }
        self.past.push_back(snapshot);
        evicted
    }

    pub(crate) fn push_future(&mut self, snapshot: P) {
        self.future.push_back(snapshot);
    }

    pub(crate) fn pop_past(&mut self) -> Option<P> {
        self.past.pop_back()
    }

    pub(crate) fn pop_future(&mut self) -> Option<P> {
        self.future.pop_back()
    }

    /// Drop every redo entry. Returns how many were dropped.
    pub(crate) fn clear_future(&mut self) -> usize {
        let dropped = self.future.len();
        self.future.clear();
        dropped
    }

    /// Drop both stacks.
    pub(crate) fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================
