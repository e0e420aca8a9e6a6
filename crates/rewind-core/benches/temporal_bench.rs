//! Benchmarks for recording and traversal throughput.
//!
//! Compares snapshots of a plain `Vec` (deep clone per record) against an
//! `im::Vector` (structural sharing), and measures multi-step undo/redo.
//!
//! Run with: cargo bench -p rewind-core --bench temporal_bench
//!
//! Expected results:
//!
//! | Scenario                  | Cost per record          |
//! |---------------------------|--------------------------|
//! | `Vec<u64>` snapshot       | O(len) clone             |
//! | `im::Vector<u64>` snapshot| O(1) clone               |
//! | Undo/redo step            | one projection + one pop |

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rewind_core::{StateHost, Temporal, TemporalOptions};

// ============================================================================
// Setup helpers
// ============================================================================

struct Host<S> {
    state: S,
}

impl<S: Clone> StateHost<S> for Host<S> {
    fn get_state(&self) -> S {
        self.state.clone()
    }

    fn set_state(&mut self, snapshot: S) {
        self.state = snapshot;
    }

    fn set_state_untracked(&mut self, snapshot: S) {
        self.state = snapshot;
    }
}

fn record<S: Clone + 'static>(temporal: &mut Temporal<S>, host: &mut Host<S>, f: impl FnOnce(&mut S)) {
    let prior = temporal.snapshot(&host.state);
    f(&mut host.state);
    temporal.record(prior, host);
}

/// Tracker with `n` recorded single-element pushes.
fn setup_filled(n: usize) -> (Temporal<im::Vector<u64>>, Host<im::Vector<u64>>) {
    let mut temporal = Temporal::new(TemporalOptions::new());
    let mut host = Host {
        state: im::Vector::new(),
    };
    for i in 0..n {
        record(&mut temporal, &mut host, |v| v.push_back(i as u64));
    }
    (temporal, host)
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_record(c: &mut Criterion) {
    let mut group = c.benchmark_group("record");
    for size in [100usize, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("vec", size), &size, |b, &size| {
            let mut temporal: Temporal<Vec<u64>> = Temporal::new(TemporalOptions::new().limit(100));
            let mut host = Host {
                state: (0..size as u64).collect::<Vec<_>>(),
            };
            let mut i = 0u64;
            b.iter(|| {
                i = i.wrapping_add(1);
                record(&mut temporal, &mut host, |v| v[0] = black_box(i));
            });
        });
        group.bench_with_input(BenchmarkId::new("im_vector", size), &size, |b, &size| {
            let mut temporal: Temporal<im::Vector<u64>> =
                Temporal::new(TemporalOptions::new().limit(100));
            let mut host = Host {
                state: (0..size as u64).collect::<im::Vector<_>>(),
            };
            let mut i = 0u64;
            b.iter(|| {
                i = i.wrapping_add(1);
                record(&mut temporal, &mut host, |v| v.set(0, black_box(i)));
            });
        });
    }
    group.finish();
}

fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");
    for steps in [1usize, 10, 100] {
        group.bench_with_input(BenchmarkId::new("undo_redo", steps), &steps, |b, &steps| {
            let (mut temporal, mut host) = setup_filled(steps);
            b.iter(|| {
                black_box(temporal.undo(steps, &mut host));
                black_box(temporal.redo(steps, &mut host));
            });
        });
    }
    group.finish();
}

fn bench_suppressed(c: &mut Criterion) {
    c.bench_function("record_suppressed_by_equality", |b| {
        let mut temporal: Temporal<im::Vector<u64>> =
            Temporal::new(TemporalOptions::new().equality_partial_eq());
        let mut host = Host {
            state: (0..1_000u64).collect::<im::Vector<_>>(),
        };
        b.iter(|| record(&mut temporal, &mut host, |_| {}));
    });
}

criterion_group!(benches, bench_record, bench_traversal, bench_suppressed);
criterion_main!(benches);
