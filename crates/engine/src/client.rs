//! Abstract copy engine client.
//!
//! The orchestration layer talks to the engine only through this trait,
//! which keeps it decoupled from the subprocess driver and testable with
//! scripted mocks.

use std::future::Future;
use std::pin::Pin;

use crate::EngineError;
use crate::location::Location;
use crate::options::TransferOptions;
use crate::status::{JobHandle, JobStatus};

/// Asynchronous client for the external copy engine.
pub trait CopyEngine: Send + Sync {
    /// Checks that the engine is reachable, returning its version string.
    fn probe(&self) -> Pin<Box<dyn Future<Output = Result<String, EngineError>> + Send + '_>>;

    /// Submits a copy job and returns its handle.
    ///
    /// The job runs asynchronously; callers observe it via
    /// [`job_status`](Self::job_status).
    fn submit(
        &self,
        source: &Location,
        destination: &Location,
        options: &TransferOptions,
    ) -> Pin<Box<dyn Future<Output = Result<JobHandle, EngineError>> + Send + '_>>;

    /// Fetches the latest status snapshot for a job.
    ///
    /// `None` means the engine has no status to report yet; callers treat
    /// that as zero progress, not as an error.
    fn job_status(
        &self,
        handle: &JobHandle,
    ) -> Pin<Box<dyn Future<Output = Result<Option<JobStatus>, EngineError>> + Send + '_>>;
}
