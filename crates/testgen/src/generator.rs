use lockcheck_core::trace::types::{Event, EventKind, ProcessId, TraceSet};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Parameters for trace-set generation.
#[derive(Clone, Debug, Deserialize, Serialize, TypedBuilder)]
pub struct GenParams {
    /// Number of participating processes; trace files are numbered `1..=n`.
    pub n_proc: ProcessId,
    /// Number of full request->acquire->release rounds.
    pub n_round: u64,
    /// Seed for the randomized holder order and wall-clock jitter. `None`
    /// seeds from the OS, making every run distinct.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

/// Generate a protocol-conforming trace set.
///
/// Each round a random holder is chosen, every peer grants it permission at
/// one shared logical instant (exercising the verifier's same-instant
/// grouping), then the holder acquires and releases at the two following
/// instants. Logical time is a single global counter, so every process's own
/// stream stays strictly monotonic; wall-clock stamps advance with random
/// jitter. A generated run therefore always verifies as a pass, which makes
/// this the fixture generator for pipeline tests of the instrumentation
/// tooling itself.
///
/// # Panics
///
/// Panics if `params.n_proc` is zero (cannot pick a holder from no
/// processes).
#[must_use]
pub fn generate_trace_set(params: &GenParams) -> TraceSet {
    assert!(params.n_proc > 0, "need at least one process");

    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::try_from_rng(&mut rand::rngs::SysRng).expect("OS entropy source failed"),
    };

    let mut traces: TraceSet = (1..=params.n_proc).map(|pid| (pid, Vec::new())).collect();
    let mut clock: u64 = 0;
    // Start the wall clock somewhere in the working day so rendered stamps
    // look like real captures.
    let mut wall: u64 = 8 * 3600 * 1_000_000;

    for _ in 0..params.n_round {
        let holder = rng.random_range(1..=params.n_proc);

        clock += 1;
        for granter in 1..=params.n_proc {
            if granter == holder {
                continue;
            }
            wall += rng.random_range(1..500);
            traces
                .get_mut(&granter)
                .expect("granter trace exists")
                .push(Event::new(wall, clock, holder, EventKind::Request));
        }

        for kind in [EventKind::Acquire, EventKind::Release] {
            clock += 1;
            wall += rng.random_range(1..500);
            traces
                .get_mut(&holder)
                .expect("holder trace exists")
                .push(Event::new(wall, clock, holder, kind));
        }
    }

    tracing::debug!(
        processes = params.n_proc,
        rounds = params.n_round,
        instants = clock,
        "generated conforming trace set"
    );
    traces
}
