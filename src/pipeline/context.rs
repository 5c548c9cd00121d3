//! Shared state handed to every worker: queue, coordinator, accumulators, filesystem probe
//! and observer. Workers get an `Arc` to this plus their own id; nothing points back from the
//! shared state to a worker.

use log::debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::accumulators::ResultAccumulators;
use super::classifier::FsProbe;
use super::coordinator::TerminationCoordinator;
use super::observer::TraversalObserver;
use super::queue::WorkQueue;
use crate::error::TraversalError;
use crate::utils::config::PackagePaths;

/// Why a path was recorded as denied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Denial {
    /// Directory exists but cannot be enumerated; counted as a leaf.
    ReadDirectory,
    /// Metadata lookup itself was refused; contributes nothing.
    Access,
}

impl Denial {
    /// User-facing diagnostic, e.g. `pardu: cannot read directory 'x': Permission denied`.
    pub fn diagnostic(&self, path: &Path) -> String {
        let verb = match self {
            Denial::ReadDirectory => "read directory",
            Denial::Access => "access",
        };
        format!(
            "{}: cannot {} '{}': Permission denied",
            PackagePaths::get().pkg_name(),
            verb,
            path.display()
        )
    }
}

/// State shared by the whole pool for one run.
pub struct PipelineShared<P: FsProbe> {
    pub queue: WorkQueue,
    pub coordinator: TerminationCoordinator,
    pub accumulators: ResultAccumulators,
    pub probe: P,
    pub observer: Box<dyn TraversalObserver>,
    /// Print denial diagnostics to stderr as they are met.
    pub report_denied: bool,
    denied: Mutex<Vec<PathBuf>>,
}

impl<P: FsProbe> PipelineShared<P> {
    pub fn new(
        n_threads: usize,
        origins: usize,
        probe: P,
        observer: Box<dyn TraversalObserver>,
        report_denied: bool,
    ) -> Result<Self, TraversalError> {
        if n_threads == 0 {
            return Err(TraversalError::InvalidThreadCount(n_threads));
        }
        Ok(Self {
            queue: WorkQueue::new(),
            coordinator: TerminationCoordinator::new(n_threads),
            accumulators: ResultAccumulators::new(origins),
            probe,
            observer,
            report_denied,
            denied: Mutex::new(Vec::new()),
        })
    }

    pub fn n_threads(&self) -> usize {
        self.coordinator.n_threads()
    }

    /// Add `blocks` to `origin` and tell the observer.
    pub fn add_blocks(&self, origin: usize, blocks: u64) {
        self.accumulators.add(origin, blocks);
        self.observer.on_sized(origin, blocks);
    }

    pub fn record_denied(&self, path: &Path, denial: Denial) {
        debug!("{:?} denied: {}", denial, path.display());
        if self.report_denied {
            eprintln!("{}", denial.diagnostic(path));
        }
        match self.denied.lock() {
            Ok(mut d) => d.push(path.to_path_buf()),
            Err(poison) => poison.into_inner().push(path.to_path_buf()),
        }
    }

    /// Denied paths in the order they were met. Call after join.
    pub fn take_denied(&self) -> Vec<PathBuf> {
        match self.denied.lock() {
            Ok(mut d) => std::mem::take(&mut *d),
            Err(poison) => std::mem::take(&mut *poison.into_inner()),
        }
    }
}

/// What one worker thread owns: its id and a handle to the shared state.
pub struct WorkerContext<P: FsProbe> {
    pub id: usize,
    pub shared: Arc<PipelineShared<P>>,
}
