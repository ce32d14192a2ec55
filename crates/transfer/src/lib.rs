//! Bulk transfer orchestration over the external copy engine.
//!
//! This crate implements the **coordination logic** for bulk uploads:
//! it never moves bytes itself. The engine client does the copying; this
//! layer submits the job, polls it to completion, translates raw counters
//! into paced progress reports, honors cooperative cancellation, and maps
//! terminal job states to success or failure.
//!
//! # Flow
//!
//! 1. **Probe** — verify the engine binary is reachable (prompting to
//!    install it otherwise)
//! 2. **Assemble** — build locations and engine options for the direction
//! 3. **Poll** — submit the job and drive it to a terminal status,
//!    reporting progress each cycle
//! 4. **Classify** — re-fetch the final status and raise on failure

pub mod facade;
pub mod poller;
pub mod progress;

pub use facade::{ENGINE_DOWNLOAD_URL, InstallPrompt, TransferManager, UploadRequest};
pub use poller::{DEFAULT_POLL_INTERVAL, JobPoller};
pub use progress::{LogSink, NotificationSink, TransferProgress};

use blobferry_engine::EngineError;

/// Errors produced by the orchestration layer.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// The operation was cancelled cooperatively. Propagated verbatim so
    /// callers can tell user cancellation apart from job failure.
    #[error("cancelled")]
    Cancelled,

    #[error("transfer failed: {0}")]
    JobFailed(String),
}
