//! Filesystem side of trace ingestion.
//!
//! A trace directory holds one append-only file per process, named by the
//! process's decimal id plus a fixed suffix (`7.log` for process 7 by
//! default). The instrumented system is the sole producer; its only
//! obligation is the record grammar, one file per process, flushed
//! incrementally.

use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::{fs, io};

use lockcheck_core::trace::types::{ProcessId, TraceSet};

use crate::parser::parse_trace;

/// Default file suffix of per-process trace files.
pub const TRACE_SUFFIX: &str = ".log";

/// A recoverable condition observed while ingesting a trace directory.
///
/// Warnings never block the run; they are collected and surfaced next to the
/// replay diagnostics.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A line failed the record grammar and was skipped.
    Malformed {
        pid: ProcessId,
        line: usize,
        text: String,
    },
    /// A declared process emitted no events. Expected when trace capture was
    /// not enabled for that process; it still counts as a participant.
    EmptyTrace { pid: ProcessId },
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { pid, line, text } => write!(
                f,
                "malformed record in trace of process {pid}, line {line}: {text:?}"
            ),
            Self::EmptyTrace { pid } => write!(
                f,
                "process {pid} has an empty trace; was trace capture enabled for it?"
            ),
        }
    }
}

/// Everything read from a trace directory: one event stream per process id
/// plus the warnings accumulated along the way.
#[derive(Debug, Default, Clone)]
pub struct TraceBundle {
    pub traces: TraceSet,
    pub warnings: Vec<Warning>,
}

/// Fatal ingestion failure.
#[derive(Debug)]
pub enum ReadError {
    /// The trace directory does not exist: nothing was captured.
    MissingDirectory { path: PathBuf },
    Io { path: PathBuf, source: io::Error },
}

impl Display for ReadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDirectory { path } => write!(
                f,
                "trace directory {} not found; enable trace capture in the \
                 instrumented system and re-run",
                path.display()
            ),
            Self::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingDirectory { .. } => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Read every `<pid><suffix>` file under `dir` into a [`TraceBundle`].
///
/// Files whose name does not end in `suffix` or whose stem is not a decimal
/// process id are ignored. File contents are decoded lossily: a producer
/// that crashed mid-write may leave arbitrary trailing bytes, which then
/// surface as a malformed-line warning rather than poisoning the whole file.
/// No input is mutated.
///
/// # Errors
///
/// Returns [`ReadError::MissingDirectory`] if `dir` is not a directory and
/// [`ReadError::Io`] if the directory or one of its trace files cannot be
/// read.
pub fn read_trace_dir(dir: &Path, suffix: &str) -> Result<TraceBundle, ReadError> {
    if !dir.is_dir() {
        return Err(ReadError::MissingDirectory {
            path: dir.to_path_buf(),
        });
    }

    let entries = fs::read_dir(dir).map_err(|source| ReadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut bundle = TraceBundle::default();
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        let Some(pid) = trace_pid(&path, suffix) else {
            tracing::debug!(path = %path.display(), "ignoring non-trace file");
            continue;
        };

        let bytes = fs::read(&path).map_err(|source| ReadError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed = parse_trace(&String::from_utf8_lossy(&bytes));

        for malformed in parsed.malformed {
            bundle.warnings.push(Warning::Malformed {
                pid,
                line: malformed.line,
                text: malformed.text,
            });
        }
        if parsed.events.is_empty() {
            bundle.warnings.push(Warning::EmptyTrace { pid });
        }
        tracing::debug!(pid, events = parsed.events.len(), "read trace file");
        bundle.traces.insert(pid, parsed.events);
    }

    Ok(bundle)
}

/// Extract the process id from a trace file path, or `None` if the file does
/// not follow the `<decimal pid><suffix>` naming contract.
fn trace_pid(path: &Path, suffix: &str) -> Option<ProcessId> {
    let name = path.file_name()?.to_str()?;
    name.strip_suffix(suffix)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use std::fs::File;
    use std::io::Write as _;

    use super::*;

    /// A scratch directory under the system temp dir, removed on drop.
    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new(tag: &str) -> Self {
            let path = std::env::temp_dir().join(format!(
                "lockcheck-reader-{tag}-{}",
                std::process::id()
            ));
            fs::create_dir_all(&path).unwrap();
            Self(path)
        }

        fn write(&self, name: &str, content: &str) {
            let mut file = File::create(self.0.join(name)).unwrap();
            file.write_all(content.as_bytes()).unwrap();
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let err = read_trace_dir(Path::new("/nonexistent/lockcheck-traces"), TRACE_SUFFIX)
            .expect_err("should fail");
        assert!(matches!(err, ReadError::MissingDirectory { .. }));
        assert!(err.to_string().contains("enable trace capture"));
    }

    #[test]
    fn test_reads_traces_by_pid() {
        let dir = ScratchDir::new("by-pid");
        dir.write("1.log", "[0|0] 2: request\n[10|1] 1: acquire\n");
        dir.write("2.log", "[5|0] 1: request\n");
        dir.write("notes.txt", "not a trace\n");

        let bundle = read_trace_dir(&dir.0, TRACE_SUFFIX).unwrap();
        assert_eq!(bundle.traces.len(), 2);
        assert_eq!(bundle.traces[&1].len(), 2);
        assert_eq!(bundle.traces[&2].len(), 1);
        assert!(bundle.warnings.is_empty());
    }

    #[test]
    fn test_empty_trace_warns_but_participates() {
        let dir = ScratchDir::new("empty");
        dir.write("1.log", "[0|0] 1: acquire\n");
        dir.write("2.log", "");

        let bundle = read_trace_dir(&dir.0, TRACE_SUFFIX).unwrap();
        assert!(bundle.traces.contains_key(&2));
        assert_eq!(bundle.warnings, vec![Warning::EmptyTrace { pid: 2 }]);
    }

    #[test]
    fn test_malformed_lines_warn_with_file_context() {
        let dir = ScratchDir::new("malformed");
        dir.write("3.log", "[0|0] 3: request\ngarbage text\n[10|1] 3: acquire\n");

        let bundle = read_trace_dir(&dir.0, TRACE_SUFFIX).unwrap();
        assert_eq!(bundle.traces[&3].len(), 2);
        assert_eq!(
            bundle.warnings,
            vec![Warning::Malformed {
                pid: 3,
                line: 2,
                text: String::from("garbage text"),
            }]
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_warning_round_trips_through_json() {
        let warning = Warning::Malformed {
            pid: 3,
            line: 2,
            text: String::from("garbage text"),
        };
        let encoded = serde_json::to_string(&warning).unwrap();
        let decoded: Warning = serde_json::from_str(&encoded).unwrap();
        assert_eq!(warning, decoded);
    }

    #[test]
    fn test_custom_suffix() {
        let dir = ScratchDir::new("suffix");
        dir.write("4.stderr", "[0|0] 4: cancel\n");
        dir.write("4.log", "[0|0] 4: release\n");

        let bundle = read_trace_dir(&dir.0, ".stderr").unwrap();
        assert_eq!(bundle.traces.len(), 1);
        assert_eq!(bundle.traces[&4][0].subject, 4);
    }
}
