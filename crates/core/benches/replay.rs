use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use lockcheck_core::trace::types::{Event, EventKind, ProcessId, TraceSet};
use lockcheck_core::{verify, Policy, Verdict};

/// Build a protocol-conforming trace set: `rounds` full
/// request->acquire->release rounds with rotating holders over `n_proc`
/// processes, all logical times globally distinct except the request burst
/// of each round, which shares one instant.
#[allow(clippy::cast_possible_truncation)]
fn build_traces(n_proc: ProcessId, rounds: u64) -> TraceSet {
    let mut traces: TraceSet = (1..=n_proc).map(|pid| (pid, Vec::new())).collect();
    let mut clock: u64 = 0;
    let mut wall: u64 = 0;

    for round in 0..rounds {
        let holder = (round % u64::from(n_proc)) as ProcessId + 1;
        clock += 1;
        for granter in 1..=n_proc {
            if granter == holder {
                continue;
            }
            wall += 7;
            traces
                .get_mut(&granter)
                .unwrap()
                .push(Event::new(wall, clock, holder, EventKind::Request));
        }
        for kind in [EventKind::Acquire, EventKind::Release] {
            clock += 1;
            wall += 7;
            traces
                .get_mut(&holder)
                .unwrap()
                .push(Event::new(wall, clock, holder, kind));
        }
    }

    traces
}

fn bench_replay(c: &mut Criterion) {
    let small = build_traces(2, 10);
    let medium = build_traces(4, 100);
    let large = build_traces(8, 1_000);

    for traces in [&small, &medium, &large] {
        let report = verify(traces, &Policy::default()).expect("benchmark traces must replay");
        assert_eq!(
            report.verdict(),
            Verdict::Pass,
            "benchmark generation must produce conforming runs",
        );
    }

    let mut group = c.benchmark_group("replay_verify");

    group.bench_function("verify_small", |b| {
        b.iter(|| {
            let _ = verify(black_box(&small), black_box(&Policy::default()));
        });
    });
    group.bench_function("verify_medium", |b| {
        b.iter(|| {
            let _ = verify(black_box(&medium), black_box(&Policy::default()));
        });
    });
    group.bench_function("verify_large", |b| {
        b.iter(|| {
            let _ = verify(black_box(&large), black_box(&Policy::default()));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_replay);
criterion_main!(benches);
