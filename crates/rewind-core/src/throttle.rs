#![forbid(unsafe_code)]

//! Leading-edge throttle for the recording entry point.
//!
//! Bursty hosts (drag handles, sliders, typing) mutate far more often than
//! anyone wants to undo. Install [`throttle`] as a `handle_set` wrapper to
//! keep at most one history entry per interval:
//!
//! ```ignore
//! let options = TemporalOptions::<Canvas>::new()
//!     .handle_set(throttle(Duration::from_millis(500)));
//! ```
//!
//! The first record of a burst is kept, so undo returns to the state before
//! the burst started.

use std::time::Duration;

use web_time::Instant;

/// Forward at most one record per `interval`; drop the rest.
pub fn throttle<P>(interval: Duration) -> impl FnMut(P, &mut dyn FnMut(P)) {
    let mut last_commit: Option<Instant> = None;
    move |prior: P, commit: &mut dyn FnMut(P)| {
        let now = Instant::now();
        if let Some(last) = last_commit
            && now.duration_since(last) < interval
        {
            tracing::trace!(target: "rewind.temporal", "record dropped: throttled");
            return;
        }
        last_commit = Some(now);
        commit(prior);
    }
}
