#![forbid(unsafe_code)]

//! Rewind core: undo/redo history tracking for mutable state containers.
//!
//! A [`Temporal`] tracker sits next to a state container (the *host*). The
//! host reports every mutation by handing the tracker the snapshot it took
//! before mutating; the tracker decides whether that snapshot becomes a
//! history entry. Undo and redo walk the history and write snapshots back
//! through the host's untracked write path.
//!
//! # Key Components
//!
//! - [`Temporal`] - the tracker: record, undo, redo, clear, pause, resume
//! - [`TemporalOptions`] - projection, equality, limit, hooks, decorators
//! - [`StateHost`] - what a container exposes to its tracker
//! - [`TemporalMachine`] - the state machine seam used by decorators
//! - [`History`] - read-only past/future stacks
//! - [`TemporalConfig`] - data-only configuration (TOML/JSON with `config`)
//!
//! # Example
//!
//! ```ignore
//! use rewind_core::{StateHost, Temporal, TemporalOptions};
//!
//! let mut temporal = Temporal::new(TemporalOptions::<Doc>::new().limit(100));
//!
//! // In the host's mutation path:
//! let prior = temporal.snapshot(&doc);
//! doc.apply(edit);
//! temporal.record(prior, &host);
//!
//! // Later:
//! temporal.undo(1, &mut host);
//! ```

pub mod config;
pub mod history;
pub mod host;
pub mod machine;
pub mod options;
pub mod subscription;
pub mod temporal;
pub mod throttle;

pub use config::{ConfigError, TemporalConfig};
pub use history::History;
pub use host::StateHost;
pub use machine::{BaseMachine, TemporalMachine};
pub use options::{Equality, HandleSet, OnSave, Partialize, TemporalOptions, WrapTemporal};
pub use subscription::{Callback, Subscribers, Subscription};
pub use temporal::{PendingEvents, Temporal, TemporalChange, TemporalEvent};
pub use throttle::throttle;

/// Persistent collection types for snapshot-friendly state.
///
/// When the `hamt` feature is enabled, this module re-exports types from
/// the [`im`] crate. Cloning them is O(1) and clones share structure, so
/// taking a full-state snapshot on every mutation stays cheap.
///
/// ```ignore
/// use rewind_core::persistent;
///
/// let mut map = persistent::HashMap::new();
/// map.insert("key", 42);
/// let snapshot = map.clone(); // shares structure
/// map.insert("key2", 99);
/// // `snapshot` still has only "key" → 42
/// ```
#[cfg(feature = "hamt")]
pub mod persistent {
    pub use im::{HashMap, HashSet, OrdMap, OrdSet, Vector};
}
