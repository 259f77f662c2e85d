use alloc::string::String;
use core::fmt::{Display, Formatter};

use derive_more::From;

use crate::timeline::StructuralError;
use crate::trace::types::ProcessId;

/// An event kind outside the protocol vocabulary.
///
/// This aborts the whole replay: it signals a grammar or protocol-version
/// mismatch between the instrumented system and this verifier, not a
/// protocol bug worth cataloguing alongside the safety violations.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEventKind {
    pub pid: ProcessId,
    pub logical_time: u64,
    pub kind: String,
}

impl Display for UnknownEventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "process {} logged unknown event kind {:?} at time {}",
            self.pid, self.kind, self.logical_time
        )
    }
}

impl core::error::Error for UnknownEventKind {}

/// Error that aborts a verification run before a verdict can be produced.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, From)]
pub enum Error {
    /// The reconstructed order cannot be trusted.
    Structural(StructuralError),
    /// The trace speaks a different protocol version.
    UnknownEventKind(UnknownEventKind),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Structural(err) => write!(f, "{err}"),
            Self::UnknownEventKind(err) => write!(f, "{err}"),
        }
    }
}

impl core::error::Error for Error {}
