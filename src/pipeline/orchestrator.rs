use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::classifier::FsProbe;
use super::context::{PipelineShared, WorkerContext};
use super::error_handler::aggregate_statuses;
use super::observer::TraversalObserver;
use super::worker::worker_loop;
use crate::error::TraversalError;
use crate::{DuReport, Entry, OriginTotal, RunStatus, WorkerStatus};

/// Handles to the running workers. Consumed by [`WorkerPool::join`].
pub struct WorkerPool {
    handles: Vec<(usize, JoinHandle<WorkerStatus>)>,
}

impl WorkerPool {
    /// Launch one worker per thread slot in `shared`'s coordinator.
    ///
    /// If the OS refuses a thread, the workers already running are shut down and joined
    /// before the error is returned.
    pub fn start<P>(shared: &Arc<PipelineShared<P>>) -> Result<Self, TraversalError>
    where
        P: FsProbe + 'static,
    {
        let n_threads = shared.n_threads();
        debug!("Starting {} workers", n_threads);
        let mut handles = Vec::with_capacity(n_threads);
        for id in 0..n_threads {
            let ctx = WorkerContext {
                id,
                shared: Arc::clone(shared),
            };
            let spawned = thread::Builder::new()
                .name(format!("pardu-worker-{id}"))
                .spawn(move || worker_loop(ctx));
            match spawned {
                Ok(h) => handles.push((id, h)),
                Err(source) => {
                    let pool = WorkerPool { handles };
                    return Err(pool.abandon(shared, TraversalError::Spawn { id, source }));
                }
            }
        }
        Ok(WorkerPool { handles })
    }

    /// Stop and join the workers started so far because of `cause`. A fatal error a worker
    /// recorded before the shutdown happened first, so it is returned instead of `cause`.
    pub fn abandon<P: FsProbe>(
        self,
        shared: &PipelineShared<P>,
        cause: TraversalError,
    ) -> TraversalError {
        shared.coordinator.shutdown(&shared.queue);
        match self.join(shared) {
            Err(earlier) => {
                debug!("Pool abandoned ({}); keeping earlier error", cause);
                earlier
            }
            Ok(_) => cause,
        }
    }

    /// Wait for every worker to terminate and fold their statuses.
    ///
    /// Returns the first fatal error if the run was aborted.
    pub fn join<P: FsProbe>(
        self,
        shared: &PipelineShared<P>,
    ) -> Result<RunStatus, TraversalError> {
        let mut statuses = Vec::with_capacity(self.handles.len());
        let mut panicked = None;
        for (id, h) in self.handles {
            match h.join() {
                Ok(s) => statuses.push(s),
                Err(_) => {
                    panicked.get_or_insert(id);
                }
            }
        }
        if let Some(err) = shared.coordinator.take_fatal() {
            return Err(err);
        }
        if let Some(id) = panicked {
            return Err(TraversalError::WorkerPanicked { id });
        }
        debug!("All {} workers joined", statuses.len());
        Ok(aggregate_statuses(statuses))
    }
}

/// Parameters for one pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub num_threads: usize,
    pub report_denied: bool,
}

/// Seed the queue with `paths` (origin index = position), run the pool to completion and
/// return the per-origin totals in input order.
pub fn run_pipeline<P>(
    paths: &[PathBuf],
    config: &PipelineConfig,
    probe: P,
    observer: Box<dyn TraversalObserver>,
) -> Result<DuReport, TraversalError>
where
    P: FsProbe + 'static,
{
    let shared = Arc::new(PipelineShared::new(
        config.num_threads,
        paths.len(),
        probe,
        observer,
        config.report_denied,
    )?);

    seed_queue(&shared, paths);
    let pool = WorkerPool::start(&shared)?;
    let status = pool.join(&shared)?;

    debug!(
        "Pipeline done: {} entries pushed, {} popped, {} left queued",
        shared.queue.stats().pushed(),
        shared.queue.stats().popped(),
        shared.queue.len()
    );

    let totals = paths
        .iter()
        .zip(shared.accumulators.snapshot())
        .map(|(path, blocks)| OriginTotal {
            path: path.clone(),
            blocks,
        })
        .collect();

    Ok(DuReport {
        totals,
        status,
        denied: shared.take_denied(),
        threads: config.num_threads,
    })
}

/// Push every input path tagged with its own origin index.
pub fn seed_queue<P: FsProbe>(shared: &PipelineShared<P>, paths: &[PathBuf]) {
    for (origin, path) in paths.iter().enumerate() {
        let entry = Entry::new(path.clone(), origin);
        shared.observer.on_push(&entry);
        shared.queue.push_entry(entry);
    }
}
