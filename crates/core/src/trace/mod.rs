pub mod display;
pub mod types;

use alloc::collections::BTreeSet;

use crate::trace::types::{ProcessId, TraceSet};

/// The set of known participants of a run: every process that contributed a
/// trace file, including processes whose trace turned out to be empty. An
/// empty-trace process never acquires but still counts as a peer whose
/// acknowledgement is required.
#[must_use]
pub fn participants(traces: &TraceSet) -> BTreeSet<ProcessId> {
    traces.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use alloc::collections::BTreeMap;

    use super::*;
    use crate::trace::types::{Event, EventKind, Trace};

    #[test]
    fn test_participants_include_empty_traces() {
        let mut traces: TraceSet = BTreeMap::new();
        traces.insert(1, vec![Event::new(0, 0, 1, EventKind::Acquire)]);
        traces.insert(2, Trace::new());
        assert_eq!(
            participants(&traces).into_iter().collect::<Vec<_>>(),
            vec![1, 2]
        );
    }
}
