#![forbid(unsafe_code)]

//! Observable state container with undo/redo history.
//!
//! [`TemporalStore`] is a ready-made host for a
//! [`Temporal`](rewind_core::Temporal) tracker: a shared state cell with a
//! version counter and change subscribers whose tracked writes are recorded
//! and whose undo/redo go through an untracked write path.
//!
//! ```ignore
//! use rewind_core::TemporalOptions;
//! use rewind_store::TemporalStore;
//!
//! let store = TemporalStore::new(0, TemporalOptions::new().limit(10));
//! store.update(|n| *n += 1);
//! store.undo(1);
//! assert_eq!(store.get_state(), 0);
//! ```

pub mod store;

pub use store::TemporalStore;
