use alloc::string::String;
use core::fmt::Write;

use crate::trace::types::Trace;

/// Format a trace as the line-oriented record grammar.
///
/// Each event becomes one `[<real>|<logical>] <subject>: <kind>` line and the
/// output ends with a trailing newline, so it round-trips through the parser
/// without external fixup.
#[must_use]
pub fn format_trace(trace: &Trace) -> String {
    let mut output = String::new();
    for event in trace {
        let _ = writeln!(
            output,
            "[{}|{}] {}: {}",
            event.real_time,
            event.logical_time,
            event.subject,
            event.kind.as_str()
        );
    }
    output
}
