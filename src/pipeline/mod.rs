//! Concurrent traversal engine: shared work queue, worker pool, termination detection and
//! per-origin accumulation.

pub mod accumulators;
pub mod classifier;
pub mod context;
pub mod coordinator;
pub mod error_handler;
pub mod observer;
pub mod orchestrator;
pub mod queue;
pub mod signal;
pub mod worker;

pub use accumulators::ResultAccumulators;
pub use classifier::{
    FileKind, FsProbe, LocalFs, Lookup, ResourceDescriptor, ResourceKind, StatInfo, classify,
};
pub use context::{Denial, PipelineShared, WorkerContext};
pub use coordinator::TerminationCoordinator;
pub use error_handler::{aggregate_statuses, summarize_denied};
pub use observer::{LogObserver, NoopObserver, ObserverSet, TraversalObserver};
pub use orchestrator::{PipelineConfig, WorkerPool, run_pipeline, seed_queue};
pub use queue::{QueueStats, WorkQueue};
pub use signal::AvailabilityCounter;
pub use worker::{process_entry, worker_loop};
