//! Trace ingestion for lockcheck.
//!
//! This crate turns the artifacts of an instrumented run -- a directory of
//! per-process trace files in the `[<real>|<logical>] <subject>: <kind>`
//! record grammar -- into the in-memory
//! [`TraceSet`](lockcheck_core::trace::types::TraceSet) that
//! `lockcheck_core` verifies. Malformed lines and empty traces are
//! recoverable: they are collected as [`Warning`]s alongside the parsed
//! events instead of interrupting ingestion.

pub mod parser;
pub mod reader;

pub use parser::{parse_record, parse_trace, Malformed, ParseError, ParsedTrace};
pub use reader::{read_trace_dir, ReadError, TraceBundle, Warning, TRACE_SUFFIX};
