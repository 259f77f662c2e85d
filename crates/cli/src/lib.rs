//! lockcheck CLI -- verify captured mutual-exclusion traces and generate
//! conforming fixtures.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lockcheck_core::{Policy, Severity};

#[derive(Debug, Parser)]
#[command(
    name = "lockcheck",
    about = "Offline verification of distributed mutual-exclusion traces"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify the trace files of a captured run
    Verify(VerifyArgs),
    /// Generate trace files for a protocol-conforming run
    Generate(GenerateArgs),
}

#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// Directory containing one `<pid><suffix>` trace file per process
    #[arg(long)]
    pub trace_dir: PathBuf,
    /// Trace file suffix
    #[arg(long, default_value = lockcheck_parser::TRACE_SUFFIX)]
    pub suffix: String,
    /// Treat request cancellation as benign instead of a violation
    #[arg(long)]
    pub allow_cancel: bool,
    /// Treat recursive acquisition as a violation instead of a note
    #[arg(long)]
    pub deny_recursive_acquire: bool,
    /// Output the full report as one JSON object
    #[arg(long)]
    pub json: bool,
}

impl VerifyArgs {
    /// Replay policy selected by the severity flags.
    #[must_use]
    pub const fn policy(&self) -> Policy {
        Policy {
            recursive_acquire: if self.deny_recursive_acquire {
                Severity::Violation
            } else {
                Severity::Note
            },
            cancel: if self.allow_cancel {
                Severity::Note
            } else {
                Severity::Violation
            },
        }
    }
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Output directory for the generated trace files
    #[arg(long)]
    pub output_dir: PathBuf,
    /// Trace file suffix
    #[arg(long, default_value = lockcheck_parser::TRACE_SUFFIX)]
    pub suffix: String,
    /// Number of participating processes
    #[arg(long)]
    pub n_proc: u32,
    /// Number of request->acquire->release rounds
    #[arg(long)]
    pub n_round: u64,
    /// RNG seed; omit for a fresh run each time
    #[arg(long)]
    pub seed: Option<u64>,
}
