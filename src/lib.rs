//! Pardu: parallel disk usage.
//!
//! Sums the allocated blocks of every object reachable from each input path. A fixed pool of
//! worker threads shares one work queue that grows as directories are enumerated; the pool
//! detects on its own when the whole walk is finished.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use error::TraversalError;
pub use types::*;

use log::debug;
use std::path::PathBuf;

use crate::pipeline::{FsProbe, LocalFs, NoopObserver, PipelineConfig, TraversalObserver};
use crate::utils::config::WorkerThreadLimits;
use crate::utils::fd_limit::determine_threads_given_fd_limit;

/// Result alias used by public pardu API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: measure each of `paths` on the host filesystem.
///
/// Totals come back in input order. A permission-denied directory counts only its own blocks
/// and makes [`DuReport::status`] a failure; any other filesystem error aborts the run.
pub fn disk_usage(paths: &[PathBuf], opts: &DuOpts) -> Result<DuReport> {
    Ok(disk_usage_with(paths, opts, LocalFs, Box::new(NoopObserver))?)
}

/// Like [`disk_usage`] with a caller-supplied filesystem and observer.
pub fn disk_usage_with<P>(
    paths: &[PathBuf],
    opts: &DuOpts,
    probe: P,
    observer: Box<dyn TraversalObserver>,
) -> std::result::Result<DuReport, TraversalError>
where
    P: FsProbe + 'static,
{
    let config = PipelineConfig {
        num_threads: resolve_threads(opts.num_threads),
        report_denied: opts.report_denied,
    };
    debug!("{} paths, {} workers", paths.len(), config.num_threads);
    pipeline::run_pipeline(paths, &config, probe, observer)
}

/// Worker count for a run: `thread_override` or every available thread, capped by the
/// open-file limit. An override of 0 is passed through so the pool can reject it.
pub fn resolve_threads(thread_override: Option<usize>) -> usize {
    if thread_override == Some(0) {
        return 0;
    }
    determine_threads_given_fd_limit(WorkerThreadLimits::current().pick(thread_override))
}
