//! Optional observability hook invoked by the pipeline on queue and classification events.
//!
//! Implementations must be cheap and must not block; they run on worker threads.

use log::trace;
use std::path::Path;

use super::classifier::ResourceKind;
use crate::Entry;

pub trait TraversalObserver: Send + Sync {
    fn on_push(&self, _entry: &Entry) {}
    fn on_pop(&self, _entry: &Entry) {}
    fn on_classify(&self, _path: &Path, _kind: ResourceKind, _permission_denied: bool) {}
    /// `blocks` were added to `origin`'s total.
    fn on_sized(&self, _origin: usize, _blocks: u64) {}
    fn on_terminate(&self, _worker: usize) {}
}

/// Does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TraversalObserver for NoopObserver {}

/// Logs every event at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl TraversalObserver for LogObserver {
    fn on_push(&self, entry: &Entry) {
        trace!("push [{}] {}", entry.origin, entry.path.display());
    }

    fn on_pop(&self, entry: &Entry) {
        trace!("pop [{}] {}", entry.origin, entry.path.display());
    }

    fn on_classify(&self, path: &Path, kind: ResourceKind, permission_denied: bool) {
        trace!(
            "classify {} -> {:?}{}",
            path.display(),
            kind,
            if permission_denied { " (denied)" } else { "" }
        );
    }

    fn on_terminate(&self, worker: usize) {
        trace!("worker {} terminated", worker);
    }
}

/// Fans every event out to each inner observer in order.
pub struct ObserverSet(pub Vec<Box<dyn TraversalObserver>>);

impl TraversalObserver for ObserverSet {
    fn on_push(&self, entry: &Entry) {
        self.0.iter().for_each(|o| o.on_push(entry));
    }

    fn on_pop(&self, entry: &Entry) {
        self.0.iter().for_each(|o| o.on_pop(entry));
    }

    fn on_classify(&self, path: &Path, kind: ResourceKind, permission_denied: bool) {
        self.0
            .iter()
            .for_each(|o| o.on_classify(path, kind, permission_denied));
    }

    fn on_sized(&self, origin: usize, blocks: u64) {
        self.0.iter().for_each(|o| o.on_sized(origin, blocks));
    }

    fn on_terminate(&self, worker: usize) {
        self.0.iter().for_each(|o| o.on_terminate(worker));
    }
}
