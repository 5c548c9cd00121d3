use log::warn;
use std::path::PathBuf;

use crate::{RunStatus, WorkerStatus};

/// Fold per-worker statuses into one run status: any failure wins.
pub fn aggregate_statuses<I>(statuses: I) -> RunStatus
where
    I: IntoIterator<Item = WorkerStatus>,
{
    statuses
        .into_iter()
        .fold(RunStatus::Success, |acc, s| acc.merge(s.into()))
}

/// Log a summary of denied paths after the pool has joined. Lists each path when `verbose`.
pub fn summarize_denied(denied: &[PathBuf], verbose: bool) {
    if denied.is_empty() {
        return;
    }
    warn!(
        "{} path(s) could not be read due to permission errors",
        denied.len()
    );
    if verbose {
        for p in denied {
            eprintln!("  denied: {}", p.display());
        }
    }
}
