//! Stateful walk of the global timeline against the protocol's safety rules.

pub mod error;

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};

use self::error::{Error, UnknownEventKind};
use crate::report::{Anomaly, Diagnostic, Report, Severity};
use crate::timeline::GlobalTimeline;
use crate::trace::participants;
use crate::trace::types::{Event, EventKind, ProcessId, TraceSet};

/// Severity assignment for the two rules the observed protocol variants
/// disagree on. Everything else is fixed by the safety property itself.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Policy {
    /// An `acquire` by the process already holding the lock. Tolerated
    /// reentrancy by default.
    pub recursive_acquire: Severity,
    /// A `cancel` withdrawing a request after partial acknowledgement
    /// collection. Flagged by default.
    pub cancel: Severity,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            recursive_acquire: Severity::Note,
            cancel: Severity::Violation,
        }
    }
}

/// The simulated shared resource.
///
/// Created empty before replay, mutated one event at a time in increasing
/// logical time, discarded once the trace is exhausted.
#[derive(Debug, Default, Clone)]
pub struct ResourceState {
    /// Current holder of the resource, if any.
    pub held_by: Option<ProcessId>,
    /// For each process, the peers it has collected permission from.
    pub acknowledged: HashMap<ProcessId, HashSet<ProcessId>>,
}

impl ResourceState {
    /// Peers whose permission `pid` still lacks.
    fn missing_acknowledgements(
        &self,
        pid: ProcessId,
        participants: &BTreeSet<ProcessId>,
    ) -> Vec<ProcessId> {
        let collected = self.acknowledged.get(&pid);
        participants
            .iter()
            .copied()
            .filter(|&peer| {
                peer != pid && !collected.is_some_and(|set| set.contains(&peer))
            })
            .collect()
    }
}

/// Merge the traces into a timeline and replay it under `policy`.
///
/// The known participant set is taken from the trace files themselves: every
/// process that contributed a trace, empty or not.
///
/// # Errors
///
/// Returns [`Error::Structural`] if two events of one process share a logical
/// time, and [`Error::UnknownEventKind`] if a record's kind is outside the
/// protocol vocabulary. Protocol violations never error; they are recorded in
/// the returned [`Report`].
pub fn verify(traces: &TraceSet, policy: &Policy) -> Result<Report, Error> {
    let timeline = GlobalTimeline::from_traces(traces)?;
    let peers = participants(traces);
    replay(&timeline, &peers, policy).map_err(Error::from)
}

/// Walk `timeline` in non-decreasing logical time, validating every event
/// against the simulated [`ResourceState`] and recording every anomaly.
///
/// Replay always runs to completion: the input is a closed artifact and the
/// goal is exhaustive diagnosis, so a violation is recorded and the walk goes
/// on. Within one logical instant events are evaluated in process-id order; a
/// fixed order keeps reports reproducible even though the protocol's safety
/// property does not depend on intra-instant ordering.
///
/// # Errors
///
/// Returns [`UnknownEventKind`] for a record whose kind is outside the
/// protocol vocabulary; this is the only condition that aborts the walk.
pub fn replay(
    timeline: &GlobalTimeline,
    participants: &BTreeSet<ProcessId>,
    policy: &Policy,
) -> Result<Report, UnknownEventKind> {
    tracing::debug!(
        participants = participants.len(),
        instants = timeline.len(),
        "replaying timeline"
    );

    let mut state = ResourceState::default();
    let mut report = Report::default();

    for (instant, group) in timeline.iter() {
        for (&pid, event) in group {
            step(pid, event, participants, policy, &mut state, &mut report)
                .map_err(|kind| UnknownEventKind {
                    pid,
                    logical_time: instant,
                    kind,
                })?;
        }
    }

    tracing::debug!(
        diagnostics = report.diagnostics.len(),
        violations = report.violations(),
        "replay finished"
    );
    Ok(report)
}

/// Validate a single event and apply its state transition.
///
/// `pid` is the emitting process; `event.subject` is the process the record
/// concerns. The only error is an out-of-vocabulary kind, returned as the raw
/// kind word.
fn step(
    pid: ProcessId,
    event: &Event,
    participants: &BTreeSet<ProcessId>,
    policy: &Policy,
    state: &mut ResourceState,
    report: &mut Report,
) -> Result<(), String> {
    let subject = event.subject;
    let diagnose = |severity: Severity, anomaly: Anomaly| Diagnostic {
        real_time: event.real_time,
        logical_time: event.logical_time,
        severity,
        anomaly,
    };

    match &event.kind {
        EventKind::Acquire => {
            if pid != subject {
                // One process cannot correctly observe another taking the
                // lock before the protocol announces it. State untouched.
                report.push(diagnose(
                    Severity::Violation,
                    Anomaly::CrossReportedAcquire {
                        observer: pid,
                        acquirer: subject,
                    },
                ));
                return Ok(());
            }
            if state.held_by == Some(subject) {
                report.push(diagnose(
                    policy.recursive_acquire,
                    Anomaly::RecursiveAcquire { pid: subject },
                ));
                return Ok(());
            }
            let missing = state.missing_acknowledgements(subject, participants);
            if !missing.is_empty() {
                report.push(diagnose(
                    Severity::Violation,
                    Anomaly::IncompleteAcknowledgement {
                        pid: subject,
                        missing,
                    },
                ));
            }
            if let Some(holder) = state.held_by {
                report.push(diagnose(
                    Severity::Violation,
                    Anomaly::ExclusionBreach {
                        pid: subject,
                        held_by: holder,
                    },
                ));
            }
            // Even a flagged acquire transfers the simulated lock: the state
            // tracks observed intent so later events are judged against what
            // the processes believed, while the violation stands on record.
            state.acknowledged.entry(subject).or_default().clear();
            state.held_by = Some(subject);
        }
        EventKind::Release => {
            // A release is self-reported; other processes' view of it
            // carries no state.
            if pid != subject {
                return Ok(());
            }
            if state.held_by != Some(subject) {
                report.push(diagnose(
                    Severity::Violation,
                    Anomaly::ReleaseNotHeld {
                        pid: subject,
                        held_by: state.held_by,
                    },
                ));
            }
            state.held_by = None;
        }
        EventKind::Request => {
            // The emitter grants its permission to the subject. Never a
            // violation in itself.
            state.acknowledged.entry(subject).or_default().insert(pid);
        }
        EventKind::Cancel => {
            if let Some(collected) = state.acknowledged.get_mut(&subject) {
                collected.clear();
            }
            report.push(diagnose(
                policy.cancel,
                Anomaly::CancelledRequest { pid: subject },
            ));
        }
        EventKind::Other(word) => return Err(word.clone()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_peers() -> BTreeSet<ProcessId> {
        [1, 2].into_iter().collect()
    }

    #[test]
    fn test_request_accumulates_acknowledgement() {
        let mut state = ResourceState::default();
        let mut report = Report::default();
        let event = Event::new(0, 0, 1, EventKind::Request);

        step(2, &event, &two_peers(), &Policy::default(), &mut state, &mut report).unwrap();

        assert!(state.acknowledged[&1].contains(&2));
        assert!(report.diagnostics.is_empty());
        assert!(state.missing_acknowledgements(1, &two_peers()).is_empty());
    }

    #[test]
    fn test_cancel_discards_whole_acknowledgement_set() {
        let peers: BTreeSet<ProcessId> = [1, 2, 3].into_iter().collect();
        let mut state = ResourceState::default();
        let mut report = Report::default();

        for granter in [2, 3] {
            let event = Event::new(0, u64::from(granter), 1, EventKind::Request);
            step(granter, &event, &peers, &Policy::default(), &mut state, &mut report).unwrap();
        }
        let cancel = Event::new(0, 5, 1, EventKind::Cancel);
        step(1, &cancel, &peers, &Policy::default(), &mut state, &mut report).unwrap();

        assert_eq!(state.missing_acknowledgements(1, &peers), vec![2, 3]);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].severity, Severity::Violation);
    }

    #[test]
    fn test_release_resets_holder_even_when_flagged() {
        let mut state = ResourceState {
            held_by: Some(2),
            ..ResourceState::default()
        };
        let mut report = Report::default();
        let event = Event::new(0, 0, 1, EventKind::Release);

        step(1, &event, &two_peers(), &Policy::default(), &mut state, &mut report).unwrap();

        assert_eq!(state.held_by, None);
        assert_eq!(
            report.diagnostics[0].anomaly,
            Anomaly::ReleaseNotHeld {
                pid: 1,
                held_by: Some(2)
            }
        );
    }

    #[test]
    fn test_cross_reported_release_is_inert() {
        let mut state = ResourceState {
            held_by: Some(2),
            ..ResourceState::default()
        };
        let mut report = Report::default();
        let event = Event::new(0, 0, 2, EventKind::Release);

        step(1, &event, &two_peers(), &Policy::default(), &mut state, &mut report).unwrap();

        assert_eq!(state.held_by, Some(2));
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_unknown_kind_aborts() {
        let mut state = ResourceState::default();
        let mut report = Report::default();
        let event = Event::new(0, 0, 1, EventKind::Other("frobnicate".into()));

        let result = step(1, &event, &two_peers(), &Policy::default(), &mut state, &mut report);
        assert_eq!(result, Err("frobnicate".into()));
    }
}
