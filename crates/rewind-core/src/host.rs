#![forbid(unsafe_code)]

//! Binding between a tracker and the container that owns the state.

/// Capabilities a state container exposes to its history tracker.
///
/// The tracker reads the full state `S` and writes snapshots `P` back. `P`
/// equals `S` unless the tracker was configured with a projection, in which
/// case the host decides how a partial snapshot is merged into its state.
///
/// There are two write paths. [`set_state`](StateHost::set_state) is the
/// normal path: it applies the snapshot and reports the mutation to the
/// tracker. [`set_state_untracked`](StateHost::set_state_untracked) applies
/// the snapshot without reporting it; undo and redo only ever use this one.
pub trait StateHost<S, P = S> {
    /// Current full state.
    fn get_state(&self) -> S;

    /// Apply `snapshot` and record the mutation.
    fn set_state(&mut self, snapshot: P);

    /// Apply `snapshot` without recording it.
    fn set_state_untracked(&mut self, snapshot: P);
}
