//! Random generation of protocol-conforming trace sets.
//!
//! Used by `lockcheck generate` and by tests that need realistic input for
//! the full ingestion/verification pipeline.

pub mod generator;

pub use generator::{generate_trace_set, GenParams};
