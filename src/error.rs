//! Error types for the traversal engine.
//!
//! Permission denial is not an error here: it is absorbed by the worker as a leaf
//! contribution and surfaces as [`RunStatus::Failure`](crate::RunStatus). Everything in
//! [`TraversalError`] ends the whole run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that stop every worker and discard partial totals.
#[derive(Error, Debug)]
pub enum TraversalError {
    /// Metadata could not be read for a reason other than permission denial
    /// (path vanished mid-walk, I/O error, ...).
    #[error("cannot stat '{}': {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Opening or enumerating a readable directory failed.
    #[error("cannot read directory '{}': {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Metadata was read but names no kind the classifier knows.
    #[error("resource at '{}' was of an unexpected type", .path.display())]
    UnexpectedKind { path: PathBuf },

    /// Worker pool asked to run with zero threads.
    #[error("number of threads must be at least 1 (got {0})")]
    InvalidThreadCount(usize),

    /// The OS refused to create a worker thread.
    #[error("failed to spawn worker {id}: {source}")]
    Spawn {
        id: usize,
        #[source]
        source: io::Error,
    },

    #[error("worker {id} panicked")]
    WorkerPanicked { id: usize },
}

impl TraversalError {
    pub fn metadata(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TraversalError::Metadata {
            path: path.into(),
            source,
        }
    }

    pub fn read_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TraversalError::ReadDir {
            path: path.into(),
            source,
        }
    }
}
