//! Per-origin block totals, updated lock-free by every worker.

use std::sync::atomic::{AtomicU64, Ordering};

/// One counter per input path. Monotonically non-decreasing; additions commute, so no lock.
#[derive(Debug)]
pub struct ResultAccumulators {
    totals: Vec<AtomicU64>,
}

impl ResultAccumulators {
    pub fn new(origins: usize) -> Self {
        Self {
            totals: (0..origins).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Add `blocks` to `origin`'s total.
    ///
    /// # Panics
    ///
    /// Panics if `origin` was never seeded. Origins are assigned by the pipeline, so this
    /// is a programming error.
    #[inline]
    pub fn add(&self, origin: usize, blocks: u64) {
        self.totals[origin].fetch_add(blocks, Ordering::Relaxed);
    }

    pub fn get(&self, origin: usize) -> Option<u64> {
        self.totals.get(origin).map(|t| t.load(Ordering::Relaxed))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// Read all totals. Only meaningful once every worker has joined.
    pub fn snapshot(&self) -> Vec<u64> {
        self.totals
            .iter()
            .map(|t| t.load(Ordering::Relaxed))
            .collect()
    }
}
