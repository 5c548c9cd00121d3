//! Unbounded FIFO of [`Entry`] shared by every worker.
//!
//! The list grows while the walk runs: each enumerated directory pushes its children. Every
//! push posts exactly one unit on the queue's [`AvailabilityCounter`]; `pop` never blocks, so
//! idle workers block on the counter instead (see [`WorkQueue::wait_available`]).

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::signal::AvailabilityCounter;
use crate::Entry;

/// Push/pop counters, kept for logging and for exactly-once checks.
#[derive(Debug, Default)]
pub struct QueueStats {
    pub pushed: AtomicU64,
    pub popped: AtomicU64,
}

impl QueueStats {
    pub fn pushed(&self) -> u64 {
        self.pushed.load(Ordering::Relaxed)
    }

    pub fn popped(&self) -> u64 {
        self.popped.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
pub struct WorkQueue {
    entries: Mutex<VecDeque<Entry>>,
    available: AvailabilityCounter,
    stats: QueueStats,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, VecDeque<Entry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    /// Append `(path, origin)` at the tail and post one availability unit.
    pub fn push(&self, path: impl Into<PathBuf>, origin: usize) {
        self.push_entry(Entry::new(path, origin));
    }

    pub fn push_entry(&self, entry: Entry) {
        let mut entries = self.lock();
        entries.push_back(entry);
        // Posted under the queue lock: a concurrent emptiness probe sees the entry and its
        // unit together.
        self.available.post();
        self.stats.pushed.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove and return the head entry, or `None` when empty. Never blocks.
    pub fn pop(&self) -> Option<Entry> {
        let entry = self.lock().pop_front()?;
        self.stats.popped.fetch_add(1, Ordering::Relaxed);
        Some(entry)
    }

    /// Point-in-time emptiness probe.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Block until an availability unit is posted and consume it.
    pub fn wait_available(&self) {
        self.available.wait();
    }

    /// Post one wake-up per worker without queueing anything.
    pub fn broadcast(&self, n: usize) {
        self.available.post_n(n);
    }

    pub fn signal(&self) -> &AvailabilityCounter {
        &self.available
    }

    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}
