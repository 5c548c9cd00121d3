//! Termination detection for a dynamically growing work list.
//!
//! An empty queue alone does not mean the walk is done: a worker may be mid-directory and
//! about to push children. Quiescence is "queue empty AND no worker active", and both halves
//! are tested inside one critical section together with the shutdown broadcast. A pushing
//! worker is always counted as active until its own idle-check, so no push can slip in
//! between the test and the broadcast.

use log::debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::queue::WorkQueue;
use crate::error::TraversalError;

#[derive(Debug)]
struct CoordinatorState {
    /// Workers currently executing task logic (not waiting for work). In `[0, n_threads]`.
    active: usize,
    /// First fatal error, if the run was aborted.
    fatal: Option<TraversalError>,
}

/// Shared state every worker uses to agree the walk is finished.
#[derive(Debug)]
pub struct TerminationCoordinator {
    n_threads: usize,
    state: Mutex<CoordinatorState>,
    finished: AtomicBool,
    broadcasts: AtomicUsize,
}

impl TerminationCoordinator {
    /// All workers start counted as active; each one's first step is an idle-check.
    pub fn new(n_threads: usize) -> Self {
        Self {
            n_threads,
            state: Mutex::new(CoordinatorState {
                active: n_threads,
                fatal: None,
            }),
            finished: AtomicBool::new(false),
            broadcasts: AtomicUsize::new(0),
        }
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    pub fn n_threads(&self) -> usize {
        self.n_threads
    }

    /// Leave the active set. If that leaves the pool quiescent, declare termination and
    /// broadcast one wake-up per worker. Returns true for the worker that declared it.
    pub fn idle_check(&self, queue: &WorkQueue) -> bool {
        let mut state = self.lock();
        debug_assert!(state.active > 0, "idle-check with no active workers");
        state.active = state.active.saturating_sub(1);
        if state.active == 0 && queue.is_empty() && !self.finished.load(Ordering::Acquire) {
            self.declare_finished(queue);
            return true;
        }
        false
    }

    /// Re-enter the active set after a wake-up that was not a shutdown.
    pub fn resume(&self) {
        let mut state = self.lock();
        state.active += 1;
        debug_assert!(state.active <= self.n_threads);
    }

    /// Record a fatal error and shut the pool down. Only the first error is kept.
    pub fn abort(&self, queue: &WorkQueue, err: TraversalError) {
        let mut state = self.lock();
        if state.fatal.is_none() {
            state.fatal = Some(err);
        }
        if !self.finished.load(Ordering::Acquire) {
            self.declare_finished(queue);
        }
    }

    /// Stop the pool without recording an error (e.g. not every worker could be started).
    pub fn shutdown(&self, queue: &WorkQueue) {
        let _state = self.lock();
        if !self.finished.load(Ordering::Acquire) {
            self.declare_finished(queue);
        }
    }

    /// Caller holds the state lock.
    fn declare_finished(&self, queue: &WorkQueue) {
        self.finished.store(true, Ordering::Release);
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        debug!("Termination declared; waking {} workers", self.n_threads);
        queue.broadcast(self.n_threads);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Snapshot of the active-worker count.
    pub fn active(&self) -> usize {
        self.lock().active
    }

    /// How many times termination was declared. Exactly 1 after any completed run.
    pub fn broadcasts(&self) -> usize {
        self.broadcasts.load(Ordering::Relaxed)
    }

    /// Take the recorded fatal error, if any. Call after all workers have joined.
    pub fn take_fatal(&self) -> Option<TraversalError> {
        self.lock().fatal.take()
    }
}
