//! Public and internal types for the pardu API and pipeline.

use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// One unit of queued work: a path plus the index of the input path it descends from.
///
/// Owned by the queue between push and pop, then by the worker that popped it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub origin: usize,
}

impl Entry {
    pub fn new(path: impl Into<PathBuf>, origin: usize) -> Self {
        Self {
            path: path.into(),
            origin,
        }
    }
}

/// Final allocated-block total for one input path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OriginTotal {
    /// The input path exactly as given by the caller.
    #[serde(serialize_with = "serialize_path_lossy")]
    pub path: PathBuf,
    /// Allocated blocks reachable from `path` (symlinks not followed).
    pub blocks: u64,
}

/// Overall outcome of a run. Any permission-denied object flips it to `Failure`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Success,
    Failure,
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Success)
    }

    /// "Any failure wins."
    pub fn merge(self, other: RunStatus) -> RunStatus {
        match (self, other) {
            (RunStatus::Success, RunStatus::Success) => RunStatus::Success,
            _ => RunStatus::Failure,
        }
    }
}

/// Outcome reported by one worker when it reaches the terminated state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkerStatus {
    #[default]
    Success,
    /// The worker met at least one permission-denied object.
    Failure,
    /// The worker hit a fatal error and shut the pool down. The error is held by the
    /// coordinator.
    Aborted,
}

impl From<WorkerStatus> for RunStatus {
    fn from(s: WorkerStatus) -> Self {
        match s {
            WorkerStatus::Success => RunStatus::Success,
            WorkerStatus::Failure | WorkerStatus::Aborted => RunStatus::Failure,
        }
    }
}

/// Result of [`disk_usage`](crate::disk_usage): one total per input path, in input order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct DuReport {
    pub totals: Vec<OriginTotal>,
    pub status: RunStatus,
    /// Paths that could not be read or looked up because permission was denied.
    #[serde(serialize_with = "serialize_paths_lossy")]
    pub denied: Vec<PathBuf>,
    /// Worker threads used for the run.
    pub threads: usize,
}

/// Lib-only options for [`disk_usage`](crate::disk_usage).
#[derive(Clone, Debug, Default)]
pub struct DuOpts {
    /// Worker thread count. When None, derived from available threads and the FD limit.
    pub num_threads: Option<usize>,
    /// Write `cannot read directory` diagnostics to stderr as they are met.
    pub report_denied: bool,
}

impl From<&DuOpts> for Opts {
    fn from(o: &DuOpts) -> Self {
        Opts {
            num_threads: o.num_threads,
            report_denied: o.report_denied,
            ..Default::default()
        }
    }
}

/// Full options (CLI). Use [`DuOpts`] for lib.
#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Worker thread count. When None, derived from available threads and the FD limit.
    pub num_threads: Option<usize>,
    /// Debug-level logging.
    pub verbose: bool,
    /// Trace-level logging, including every queue push/pop and classification.
    pub trace: bool,
    /// Show a counter of sized entries on stderr.
    pub progress: bool,
    /// Print the report as JSON instead of `<blocks>\t<path>` lines.
    pub json: bool,
    /// Write permission diagnostics to stderr as they are met.
    pub report_denied: bool,
}

/// JSON strings must be UTF-8; invalid sequences become U+FFFD instead of failing the report.
fn serialize_path_lossy<S: Serializer>(path: &Path, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&path.to_string_lossy())
}

fn serialize_paths_lossy<S: Serializer>(paths: &[PathBuf], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(paths.iter().map(|p| p.to_string_lossy()))
}
