//! Winnow-based parser for the trace record grammar.
//!
//! Grammar (one record per line):
//! ```text
//! record    = "[" real_time "|" logical_time "]" WS subject ":" WS kind
//! real_time = INTEGER      -- wall-clock microseconds
//! logical_time = INTEGER   -- per-process Lamport clock
//! subject   = INTEGER      -- process id the record concerns
//! kind      = REST_OF_LINE -- protocol word; unknown words are carried
//!                             verbatim and rejected during replay
//! ```

use lockcheck_core::trace::types::{Event, EventKind};
use winnow::ascii::dec_uint;
use winnow::prelude::*;
use winnow::token::{literal, take_while};
use winnow::ModalResult;

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// A record parse error with human-readable location information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub message: String,
    pub column: usize,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "parse error at column {}: {}", self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Parse a single trace record line into an [`Event`].
///
/// The kind word is not validated here: a structurally sound record with an
/// out-of-vocabulary kind parses to [`EventKind::Other`], which the replayer
/// treats as a fatal format mismatch. Lines that do not match the record
/// shape at all are the caller's `MalformedRecord` case.
///
/// # Errors
///
/// Returns a [`ParseError`] with the 1-based column of the first offending
/// byte when the line does not match the grammar.
pub fn parse_record(line: &str) -> Result<Event, ParseError> {
    let mut stream: &str = line;
    match record.parse_next(&mut stream) {
        Ok(event) => Ok(event),
        Err(e) => {
            let consumed = line.len().saturating_sub(stream.len());
            Err(ParseError {
                message: e.to_string(),
                column: consumed + 1,
            })
        }
    }
}

/// A line that failed to match the record grammar. Recovered locally:
/// the line is skipped and parsing continues.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Malformed {
    /// 1-based line number within the trace file.
    pub line: usize,
    /// The offending text, verbatim.
    pub text: String,
}

/// Result of parsing one trace file: the valid events plus a diagnostic per
/// malformed line, both in file order. Collecting diagnostics as data instead
/// of printing keeps the component testable without capturing output.
#[derive(Debug, Default, Clone)]
pub struct ParsedTrace {
    pub events: Vec<Event>,
    pub malformed: Vec<Malformed>,
}

/// Parse a whole trace file.
///
/// Blank lines are skipped silently. Anything else that fails the grammar --
/// including a trailing line truncated by a crashing producer -- becomes a
/// [`Malformed`] diagnostic and parsing continues.
#[must_use]
pub fn parse_trace(input: &str) -> ParsedTrace {
    let mut parsed = ParsedTrace::default();
    for (index, raw) in input.lines().enumerate() {
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }
        match parse_record(line) {
            Ok(event) => parsed.events.push(event),
            Err(_) => parsed.malformed.push(Malformed {
                line: index + 1,
                text: String::from(raw),
            }),
        }
    }
    parsed
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// Inline whitespace: spaces and tabs only.
fn inline_ws(input: &mut &str) -> ModalResult<()> {
    take_while(1.., |c: char| c == ' ' || c == '\t')
        .void()
        .parse_next(input)
}

/// `"[" real "|" logical "]" WS subject ":" WS kind`
fn record(input: &mut &str) -> ModalResult<Event> {
    literal("[").parse_next(input)?;
    let real_time: u64 = dec_uint.parse_next(input)?;
    literal("|").parse_next(input)?;
    let logical_time: u64 = dec_uint.parse_next(input)?;
    literal("]").parse_next(input)?;
    inline_ws.parse_next(input)?;
    let subject: u32 = dec_uint.parse_next(input)?;
    literal(":").parse_next(input)?;
    inline_ws.parse_next(input)?;
    let kind = take_while(1.., |c: char| c != '\n').parse_next(input)?;
    Ok(Event::new(
        real_time,
        logical_time,
        subject,
        EventKind::from_word(kind),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
