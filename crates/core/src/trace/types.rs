use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter, Result};

/// Identifies a participating process. Trace files are named by this id.
pub type ProcessId = u32;

/// What a trace record reports happened to the shared resource.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// The subject took the lock.
    Acquire,
    /// The subject gave the lock up.
    Release,
    /// The emitter granted the subject permission to take the lock.
    Request,
    /// The subject withdrew its request, discarding collected permissions.
    Cancel,
    /// A structurally valid record whose kind word is not part of the
    /// protocol vocabulary. Carried through to replay, where it aborts the
    /// run as a format/version mismatch.
    Other(String),
}

impl EventKind {
    /// Map a record's kind word to its variant. Unrecognized words are kept
    /// verbatim in [`EventKind::Other`] rather than rejected at parse time.
    #[must_use]
    pub fn from_word(word: &str) -> Self {
        match word {
            "acquire" => Self::Acquire,
            "release" => Self::Release,
            "request" => Self::Request,
            "cancel" => Self::Cancel,
            other => Self::Other(String::from(other)),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Acquire => "acquire",
            Self::Release => "release",
            Self::Request => "request",
            Self::Cancel => "cancel",
            Self::Other(word) => word,
        }
    }
}

impl Debug for EventKind {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single record emitted by one process.
///
/// `subject` is the process the record concerns and may differ from the
/// process that emitted it: a `request` in process 3's trace with subject 7
/// means 3 granted its permission to 7.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Event {
    /// Wall-clock microseconds, carried for diagnostics only.
    pub real_time: u64,
    /// Per-process Lamport clock value; the global ordering key.
    pub logical_time: u64,
    /// The process this record concerns.
    pub subject: ProcessId,
    pub kind: EventKind,
}

impl Event {
    #[must_use]
    pub const fn new(real_time: u64, logical_time: u64, subject: ProcessId, kind: EventKind) -> Self {
        Self {
            real_time,
            logical_time,
            subject,
            kind,
        }
    }
}

impl Debug for Event {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "[{}|{}] {}: {:?}",
            self.real_time, self.logical_time, self.subject, self.kind
        )
    }
}

/// The event stream of a single process, in emission order.
pub type Trace = Vec<Event>;

/// One execution run: a trace per participating process. A `BTreeMap` keeps
/// iteration deterministic across runs.
pub type TraceSet = BTreeMap<ProcessId, Trace>;
