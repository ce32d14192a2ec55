//! Drives one engine job from submission to terminal status.

use std::time::Duration;

use blobferry_engine::{CopyEngine, JobHandle, Location, TransferOptions};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::TransferError;
use crate::progress::{LogSink, NotificationSink, TransferProgress};

/// Time waited between consecutive status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls one submitted job to completion, feeding progress reports and
/// honoring cooperative cancellation.
///
/// The poller owns its job handle exclusively: status polls are strictly
/// sequential, and the handle is never polled again after [`run`]
/// (crate::JobPoller::run) returns. Outcome classification is the
/// caller's job — the poller only drives progress and completion.
pub struct JobPoller<'a> {
    engine: &'a dyn CopyEngine,
    cancel: CancellationToken,
    poll_interval: Duration,
}

impl<'a> JobPoller<'a> {
    /// Creates a poller. A fresh (never-cancelled) token makes the poller
    /// run without cancellation support.
    pub fn new(engine: &'a dyn CopyEngine, cancel: CancellationToken) -> Self {
        Self {
            engine,
            cancel,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the fixed poll interval. Poll-count behavior is
    /// unaffected; tests inject a near-zero interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Submits the job and polls it until the engine reports end of job.
    ///
    /// Each cycle: check cancellation, fetch the latest status, select the
    /// authoritative counter (sub-transfer count for wildcard sources,
    /// bytes otherwise, zero when absent), feed both report surfaces, and
    /// sleep the poll interval unless the status was terminal.
    ///
    /// Returns the job handle for the caller's final status re-fetch.
    /// Cancellation surfaces as [`TransferError::Cancelled`], unwrapped.
    pub async fn run(
        &self,
        source: &Location,
        destination: &Location,
        options: &TransferOptions,
        progress: &mut TransferProgress,
        log: &dyn LogSink,
        notify: Option<&dyn NotificationSink>,
    ) -> Result<JobHandle, TransferError> {
        let handle = self.engine.submit(source, destination, options).await?;
        debug!(job = %handle, "polling copy job");

        loop {
            self.check_cancelled()?;

            let status = self.engine.job_status(&handle).await?;
            let completed = status
                .as_ref()
                .map(|s| s.progress_units(source.is_wildcard()))
                .unwrap_or(0);

            progress.report_to_log(completed, log);
            progress.report_to_notification(completed, notify);

            match &status {
                Some(status) if status.is_terminal() => break,
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }

        debug!(job = %handle, "copy job reached end of job");
        Ok(handle)
    }

    fn check_cancelled(&self) -> Result<(), TransferError> {
        if self.cancel.is_cancelled() {
            Err(TransferError::Cancelled)
        } else {
            Ok(())
        }
    }
}
