#![forbid(unsafe_code)]

//! Weakly-held change subscribers.
//!
//! A [`Subscribers`] list stores callbacks as `Weak` references and hands the
//! caller a [`Subscription`] guard that owns the strong `Rc`. Dropping the
//! guard unsubscribes; the dead entry is pruned on the next
//! [`live`](Subscribers::live) call.
//!
//! Callbacks are collected before they are invoked, so the owner can release
//! any borrow it holds before running them.

use std::rc::{Rc, Weak};

/// Strong callback handle as returned by [`Subscribers::live`].
pub type Callback<T> = Rc<dyn Fn(&T)>;

type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// Registration-ordered list of weakly held callbacks.
pub struct Subscribers<T> {
    entries: Vec<CallbackWeak<T>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.entries.len())
            .finish()
    }
}

impl<T> Subscribers<T> {
    /// Number of registered entries, including dead ones not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: 'static> Subscribers<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. Keep the returned guard alive to stay subscribed.
    pub fn subscribe(&mut self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Callback<T> = Rc::new(callback);
        self.entries.push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Prune dead entries and return the live callbacks in registration order.
    pub fn live(&mut self) -> Vec<Callback<T>> {
        self.entries.retain(|w| w.strong_count() > 0);
        self.entries.iter().filter_map(Weak::upgrade).collect()
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the `Subscription` drops the strong `Rc`, so the `Weak` held by
/// the list no longer upgrades and the callback is never called again.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
