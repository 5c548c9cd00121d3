//! Worker traversal loop.
//!
//! Each worker cycles through idle-check, wait, and (unless shut down) one active step:
//! pop an entry, classify it, size it, and push a directory's children back onto the queue.

use log::debug;
use std::path::Path;

use super::classifier::{FsProbe, Lookup, ResourceKind, classify, is_dot_entry};
use super::context::{Denial, PipelineShared, WorkerContext};
use crate::error::TraversalError;
use crate::{Entry, WorkerStatus};

/// Aborts the run if the worker unwinds, so the rest of the pool does not wait forever for
/// a worker that will never idle-check again.
struct PanicGuard<'a, P: FsProbe> {
    id: usize,
    shared: &'a PipelineShared<P>,
}

impl<P: FsProbe> Drop for PanicGuard<'_, P> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.shared.coordinator.abort(
                &self.shared.queue,
                TraversalError::WorkerPanicked { id: self.id },
            );
        }
    }
}

/// Run one worker until termination is declared. Returns `Aborted` when this worker hit a
/// fatal error; the error itself is held by the coordinator.
pub fn worker_loop<P: FsProbe>(ctx: WorkerContext<P>) -> WorkerStatus {
    let WorkerContext { id, shared } = ctx;
    let _guard = PanicGuard {
        id,
        shared: &shared,
    };
    let mut status = WorkerStatus::Success;
    debug!("Worker {} starting", id);

    loop {
        if shared.coordinator.idle_check(&shared.queue) {
            debug!("Worker {} observed quiescence", id);
        }

        shared.queue.wait_available();
        if shared.coordinator.is_finished() {
            shared.observer.on_terminate(id);
            debug!("Worker {} exiting ({:?})", id, status);
            return status;
        }

        shared.coordinator.resume();
        // A wake-up whose entry another worker already took.
        let Some(entry) = shared.queue.pop() else {
            continue;
        };
        shared.observer.on_pop(&entry);

        match process_entry(&shared, entry) {
            Ok(WorkerStatus::Success) => {}
            Ok(_) => status = WorkerStatus::Failure,
            Err(err) => {
                log::error!("Worker {}: {}", id, err);
                shared.coordinator.abort(&shared.queue, err);
                shared.observer.on_terminate(id);
                return WorkerStatus::Aborted;
            }
        }
    }
}

/// Classify and size one entry. Permission problems are absorbed here; anything else is
/// returned as fatal.
pub fn process_entry<P: FsProbe>(
    shared: &PipelineShared<P>,
    entry: Entry,
) -> Result<WorkerStatus, TraversalError> {
    let Entry { path, origin } = entry;
    let desc = match classify(&shared.probe, &path)? {
        Lookup::Resource(desc) => desc,
        Lookup::Inaccessible => {
            shared.record_denied(&path, Denial::Access);
            return Ok(WorkerStatus::Failure);
        }
    };
    shared
        .observer
        .on_classify(&path, desc.kind, desc.permission_denied);

    let blocks = desc.size();
    match desc.kind {
        ResourceKind::Directory => match desc.handle {
            Some(dir) if !desc.permission_denied => {
                enqueue_children(shared, &path, origin, dir)?;
                shared.add_blocks(origin, blocks);
                Ok(WorkerStatus::Success)
            }
            _ => {
                shared.record_denied(&path, Denial::ReadDirectory);
                shared.add_blocks(origin, blocks);
                Ok(WorkerStatus::Failure)
            }
        },
        // Sized from metadata, so read permission does not matter.
        ResourceKind::File | ResourceKind::Symlink => {
            shared.add_blocks(origin, blocks);
            Ok(WorkerStatus::Success)
        }
        ResourceKind::Ignorable => Ok(WorkerStatus::Success),
        ResourceKind::Unknown => Err(TraversalError::UnexpectedKind { path }),
    }
}

fn enqueue_children<P: FsProbe>(
    shared: &PipelineShared<P>,
    dir_path: &Path,
    origin: usize,
    dir: P::Dir,
) -> Result<(), TraversalError> {
    for name in dir {
        let name = name.map_err(|e| TraversalError::read_dir(dir_path, e))?;
        if is_dot_entry(&name) {
            continue;
        }
        let child = Entry::new(dir_path.join(name), origin);
        shared.observer.on_push(&child);
        shared.queue.push_entry(child);
    }
    Ok(())
}
