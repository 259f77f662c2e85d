//! Replay verification for distributed mutual-exclusion traces.
//!
//! `lockcheck_core` decides, after the fact, whether a set of concurrently
//! running processes coordinating exclusive access to a shared resource
//! through an asynchronous request/acquire/release/cancel protocol respected
//! the safety invariants of distributed mutual exclusion. It consumes the
//! per-process event streams captured by an instrumented lock implementation
//! and works in three strictly sequential phases:
//!
//! 1. **Timeline construction** -- the per-process streams are merged into a
//!    single [`GlobalTimeline`](timeline::GlobalTimeline) ordered by logical
//!    time, with events sharing a logical time grouped into one indivisible
//!    step.
//! 2. **Replay** -- the timeline is walked in non-decreasing logical time
//!    while a simulated [`ResourceState`](replay::ResourceState) tracks the
//!    holder of the resource and the acknowledgements each process has
//!    collected.
//! 3. **Reporting** -- every detected anomaly is accumulated into a
//!    [`Report`](report::Report) in discovery order; the final verdict is
//!    *pass* exactly when no violation-severity diagnostic was recorded.
//!
//! Replay is exhaustive by design: a protocol violation is recorded and the
//! walk continues, since the input is a closed artifact and the point is a
//! complete diagnosis rather than fail-fast rejection. Only two conditions
//! abort a run: two events of the same process sharing a logical time (the
//! global order cannot be trusted past that point) and an event kind outside
//! the protocol vocabulary (a format or version mismatch, not a behavior
//! under test).
//!
//! # Entry point
//!
//! The main entry point is [`verify()`], which takes the per-process traces
//! and a replay [`Policy`], and returns either a [`Report`] or an
//! [`Error`](replay::error::Error) describing why the run had to abort.
//!
//! ```rust,ignore
//! use lockcheck_core::{verify, Policy};
//!
//! match verify(&traces, &Policy::default()) {
//!     Ok(report) => println!("{:?}", report.verdict()),
//!     Err(err) => println!("aborted: {err}"),
//! }
//! ```
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on core types
//!   (`Event`, `Diagnostic`, `Report`, `Verdict`, errors).
//!
//! This crate is `no_std` compatible (requires `alloc`). The trace-file
//! parser and directory reader live in the separate `lockcheck_parser` crate.

#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod replay;
pub mod report;
pub mod timeline;
pub mod trace;

pub use replay::{verify, Policy};
pub use report::{Report, Severity, Verdict};
