//! Client for the external AzCopy transfer engine.
//!
//! The engine moves the actual bytes; this crate only describes transfers
//! (locations, options) and drives the engine binary as an asynchronous
//! job runner: submit once, then poll the job's status by handle until it
//! reaches a terminal state. Orchestration (progress reporting, polling
//! cadence, cancellation) lives in `blobferry-transfer`.

pub mod client;
pub mod location;
pub mod options;
pub mod process;
pub mod status;

pub use client::CopyEngine;
pub use location::Location;
pub use options::{Direction, METADATA_EXCLUDES, TransferOptions};
pub use process::AzCopyEngine;
pub use status::{JobHandle, JobOutcome, JobStatus, StatusType};

/// Errors produced by the engine client.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to launch engine: {0}")]
    Spawn(String),

    #[error("engine probe failed: {0}")]
    Probe(String),
}
