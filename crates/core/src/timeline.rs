//! Merging per-process traces into one logical-time-ordered structure.
//!
//! This is pure grouping and ordering: no protocol interpretation happens
//! here. Events that share a logical time form one indivisible group with no
//! ordering imposed inside it; the protocol's safety property only depends on
//! correct sequencing across groups and on each process's own monotonic
//! stream.

use alloc::collections::BTreeMap;
use core::fmt::{Display, Formatter};

use crate::trace::types::{Event, ProcessId, TraceSet};

/// Events of one logical instant, keyed by emitting process. At most one
/// event per process may occupy an instant; the `BTreeMap` key gives a fixed
/// (but semantically insignificant) evaluation order inside the group.
pub type Group = BTreeMap<ProcessId, Event>;

/// Structural defect that makes the reconstructed order untrustworthy.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    /// Two events of the same process carry the same logical time. The
    /// builder does not disambiguate or overwrite; the run aborts.
    DuplicateLogicalTime {
        pid: ProcessId,
        logical_time: u64,
    },
}

impl Display for StructuralError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicateLogicalTime { pid, logical_time } => write!(
                f,
                "multiple events at time {logical_time} in process {pid}"
            ),
        }
    }
}

impl core::error::Error for StructuralError {}

/// All events of a run, grouped by logical time in increasing order.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GlobalTimeline {
    groups: BTreeMap<u64, Group>,
}

impl GlobalTimeline {
    /// Merge per-process traces into a single timeline.
    ///
    /// # Errors
    ///
    /// Returns [`StructuralError::DuplicateLogicalTime`] if two events of the
    /// same process share a logical time.
    pub fn from_traces(traces: &TraceSet) -> Result<Self, StructuralError> {
        let mut groups: BTreeMap<u64, Group> = BTreeMap::new();
        for (&pid, trace) in traces {
            for event in trace {
                let group = groups.entry(event.logical_time).or_default();
                if group.insert(pid, event.clone()).is_some() {
                    return Err(StructuralError::DuplicateLogicalTime {
                        pid,
                        logical_time: event.logical_time,
                    });
                }
            }
        }
        tracing::debug!(
            instants = groups.len(),
            processes = traces.len(),
            "built global timeline"
        );
        Ok(Self { groups })
    }

    /// Groups in increasing logical time.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Group)> {
        self.groups.iter().map(|(&instant, group)| (instant, group))
    }

    /// Number of distinct logical instants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::types::{Event, EventKind, TraceSet};

    fn ev(lt: u64, subject: ProcessId, kind: EventKind) -> Event {
        Event::new(lt * 10, lt, subject, kind)
    }

    #[test]
    fn test_groups_ordered_by_logical_time() {
        let mut traces = TraceSet::new();
        traces.insert(1, vec![ev(5, 1, EventKind::Acquire), ev(0, 2, EventKind::Request)]);
        traces.insert(2, vec![ev(3, 2, EventKind::Acquire)]);

        let timeline = GlobalTimeline::from_traces(&traces).unwrap();
        let instants: Vec<u64> = timeline.iter().map(|(t, _)| t).collect();
        assert_eq!(instants, vec![0, 3, 5]);
    }

    #[test]
    fn test_same_instant_different_processes_share_group() {
        let mut traces = TraceSet::new();
        traces.insert(1, vec![ev(0, 1, EventKind::Acquire)]);
        traces.insert(2, vec![ev(0, 2, EventKind::Acquire)]);

        let timeline = GlobalTimeline::from_traces(&traces).unwrap();
        assert_eq!(timeline.len(), 1);
        let (_, group) = timeline.iter().next().unwrap();
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_duplicate_logical_time_is_structural() {
        let mut traces = TraceSet::new();
        traces.insert(
            3,
            vec![ev(7, 3, EventKind::Request), ev(7, 3, EventKind::Acquire)],
        );

        let result = GlobalTimeline::from_traces(&traces);
        assert_eq!(
            result,
            Err(StructuralError::DuplicateLogicalTime {
                pid: 3,
                logical_time: 7
            })
        );
    }

    #[test]
    fn test_structural_error_display() {
        let err = StructuralError::DuplicateLogicalTime {
            pid: 3,
            logical_time: 7,
        };
        assert_eq!(err.to_string(), "multiple events at time 7 in process 3");
    }

    #[test]
    fn test_empty_trace_set() {
        let timeline = GlobalTimeline::from_traces(&TraceSet::new()).unwrap();
        assert!(timeline.is_empty());
    }
}
