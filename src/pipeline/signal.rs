//! Counting wake-up signal for idle workers.
//!
//! One unit is posted per queued entry; an idle worker blocks in [`AvailabilityCounter::wait`]
//! until a unit is available and consumes exactly one. The shutdown broadcast posts one unit
//! per worker so every worker, blocked or about to block, wakes once more.

use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct AvailabilityCounter {
    /// Posted but not yet consumed units.
    pending: Mutex<usize>,
    cv: Condvar,
}

impl AvailabilityCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Workers never panic while holding this lock, but a poisoned counter must still
    /// deliver wake-ups or the pool would hang on join.
    #[inline]
    fn lock_or_recover(&self) -> MutexGuard<'_, usize> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poison) => poison.into_inner(),
        }
    }

    /// Post one unit and wake one waiter.
    pub fn post(&self) {
        let mut pending = self.lock_or_recover();
        *pending += 1;
        self.cv.notify_one();
    }

    /// Post `n` units at once (shutdown broadcast).
    pub fn post_n(&self, n: usize) {
        if n == 0 {
            return;
        }
        let mut pending = self.lock_or_recover();
        *pending += n;
        self.cv.notify_all();
    }

    /// Block until a unit is available, then consume it.
    pub fn wait(&self) {
        let mut pending = self.lock_or_recover();
        while *pending == 0 {
            pending = match self.cv.wait(pending) {
                Ok(guard) => guard,
                Err(poison) => poison.into_inner(),
            };
        }
        *pending -= 1;
    }

    /// Consume a unit if one is available, without blocking.
    pub fn try_wait(&self) -> bool {
        let mut pending = self.lock_or_recover();
        if *pending == 0 {
            return false;
        }
        *pending -= 1;
        true
    }

    /// Snapshot of posted-but-unconsumed units. May be stale on return.
    pub fn pending(&self) -> usize {
        *self.lock_or_recover()
    }
}
