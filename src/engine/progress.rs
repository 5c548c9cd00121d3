//! Progress counter on stderr, fed from the pipeline's observer hook.
//!
//! Workers never touch the bar: [`ProgressObserver`] counts sized entries and sends batches
//! over a channel to one thread that owns the bar.

use crossbeam_channel::{Sender, unbounded};
use kdam::{Animation, Bar, BarExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::pipeline::TraversalObserver;
use crate::utils::config::ProgressConsts;

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " entries"
    )))
}

/// Advance the bar by `n`.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.lock() {
        let _ = pb.update(n);
    }
}

/// Final progress update for the remainder after batched updates.
pub fn flush_progress_remainder(pb: &ProgressBar, total: usize, chunk_size: usize) {
    let remaining = total % chunk_size;
    if remaining > 0 {
        update_progress_bar(pb, remaining);
    }
    if let Ok(mut pb) = pb.lock() {
        let _ = pb.refresh();
    }
}

/// Observer side: counts sized entries and sends one message per full batch.
pub struct ProgressObserver {
    counter: Arc<AtomicUsize>,
    tx: Sender<usize>,
    chunk_size: usize,
}

impl TraversalObserver for ProgressObserver {
    fn on_sized(&self, _origin: usize, _blocks: u64) {
        let count = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        if count.is_multiple_of(self.chunk_size) {
            let _ = self.tx.send(self.chunk_size);
        }
    }
}

/// Bar side: join after the observer has been dropped.
pub struct ProgressHandle {
    thread: JoinHandle<()>,
}

impl ProgressHandle {
    /// Wait for the bar thread to drain and print its final count.
    pub fn finish(self) {
        let _ = self.thread.join();
        eprintln!();
    }
}

/// Start the bar thread. The thread exits once the returned observer (and so the only
/// sender) is dropped.
pub fn start_progress() -> (ProgressObserver, ProgressHandle) {
    let chunk_size = ProgressConsts::PROGRESS_UPDATE_BATCH_SIZE;
    let (tx, rx) = unbounded::<usize>();
    let counter = Arc::new(AtomicUsize::new(0));
    let bar = create_counter(ProgressConsts::DESC);

    let counter_bar = Arc::clone(&counter);
    let thread = thread::spawn(move || {
        while let Ok(n) = rx.recv() {
            update_progress_bar(&bar, n);
        }
        flush_progress_remainder(&bar, counter_bar.load(Ordering::Relaxed), chunk_size);
    });

    (
        ProgressObserver {
            counter,
            tx,
            chunk_size,
        },
        ProgressHandle { thread },
    )
}
