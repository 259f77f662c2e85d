//! Accumulation and rendering of replay diagnostics.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};

use crate::trace::types::ProcessId;

/// How a diagnostic weighs on the verdict.
///
/// The protocol under test is ambiguous about whether recursive acquisition
/// and request cancellation are benign, so the replayer takes the intended
/// severity for those two as [`Policy`](crate::replay::Policy) input rather
/// than hard-coding one interpretation.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    /// Recorded for the reader; does not fail the run.
    Note,
    /// A broken safety rule; the run fails.
    Violation,
}

/// A safety anomaly detected at one point of the replay.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// An `acquire` whose emitter differs from its subject: one process
    /// cannot correctly observe another taking the lock before the protocol
    /// announces it.
    CrossReportedAcquire {
        observer: ProcessId,
        acquirer: ProcessId,
    },
    /// The lock was taken before permission arrived from every other peer.
    IncompleteAcknowledgement {
        pid: ProcessId,
        missing: Vec<ProcessId>,
    },
    /// The lock was taken while another process still held it.
    ExclusionBreach {
        pid: ProcessId,
        held_by: ProcessId,
    },
    /// The holder acquired the lock it already holds.
    RecursiveAcquire { pid: ProcessId },
    /// A release by a process that did not hold the lock.
    ReleaseNotHeld {
        pid: ProcessId,
        held_by: Option<ProcessId>,
    },
    /// A request withdrawn after partial acknowledgement collection.
    CancelledRequest { pid: ProcessId },
}

impl Display for Anomaly {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CrossReportedAcquire { observer, acquirer } => {
                write!(f, "{observer} somehow knows about {acquirer} taking the lock")
            }
            Self::IncompleteAcknowledgement { pid, missing } => {
                write!(f, "{pid} took the lock without asking ")?;
                for (i, peer) in missing.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{peer}")?;
                }
                Ok(())
            }
            Self::ExclusionBreach { pid, held_by } => {
                write!(f, "{pid} took the lock held by {held_by}")
            }
            Self::RecursiveAcquire { pid } => {
                write!(f, "{pid} re-acquired the lock it already holds")
            }
            Self::ReleaseNotHeld { pid, held_by } => {
                write!(f, "{pid} released the lock held by ")?;
                match held_by {
                    Some(holder) => write!(f, "{holder}"),
                    None => write!(f, "nobody"),
                }
            }
            Self::CancelledRequest { pid } => {
                write!(f, "{pid} relinquished its request")
            }
        }
    }
}

/// One anomaly stamped with when it was observed.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Wall-clock microseconds of the offending event.
    pub real_time: u64,
    /// Logical instant of the offending event.
    pub logical_time: u64,
    pub severity: Severity,
    pub anomaly: Anomaly,
}

/// Render a microsecond wall-clock stamp as `HH:MM:SS` (UTC).
///
/// Out-of-range stamps fall back to the raw microsecond count; the stamp is
/// diagnostic only and must never abort a run.
#[must_use]
#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
pub fn wall_clock(real_time: u64) -> String {
    let secs = (real_time / 1_000_000) as i64;
    let nanos = ((real_time % 1_000_000) * 1_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos).map_or_else(
        || alloc::format!("+{real_time}us"),
        |stamp| stamp.format("%H:%M:%S").to_string(),
    )
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}|{} {}",
            wall_clock(self.real_time),
            self.logical_time,
            self.anomaly
        )
    }
}

/// Overall outcome of a run.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Every diagnostic of a run, in discovery order.
///
/// Nothing is deduplicated or suppressed: each anomaly at each logical step
/// is independently actionable.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Number of violation-severity diagnostics.
    #[must_use]
    pub fn violations(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Violation)
            .count()
    }

    /// `Pass` exactly when no violation was recorded; notes alone still pass.
    #[must_use]
    pub fn verdict(&self) -> Verdict {
        if self.violations() == 0 {
            Verdict::Pass
        } else {
            Verdict::Fail
        }
    }
}
