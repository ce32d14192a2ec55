//! Top-level transfer entry points.
//!
//! `TransferManager` holds the injected collaborators (engine client,
//! install prompt, log surface) so nothing here touches process-wide
//! state; hosts construct one manager per configuration and the tests
//! construct them around mocks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use blobferry_engine::{CopyEngine, Direction, Location, METADATA_EXCLUDES, TransferOptions};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::TransferError;
use crate::poller::{DEFAULT_POLL_INTERVAL, JobPoller};
use crate::progress::{LogSink, NotificationSink, TransferProgress};

/// Where to get the engine binary when the probe fails.
pub const ENGINE_DOWNLOAD_URL: &str = "https://aka.ms/downloadazcopy";

/// Asks the operator about installing the missing engine.
///
/// A missing engine is an expectation-setting conversation, not a program
/// error: after the prompt the transfer aborts silently either way.
pub trait InstallPrompt: Send + Sync {
    /// Shows `message` and returns whether the operator wants the
    /// download page opened.
    fn confirm_install(
        &self,
        message: &str,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + '_>>;

    /// Opens the engine download page.
    fn open_download_page(&self, url: &str);
}

/// One logical upload: a local source, a remote destination, and the
/// total unit count established by the pre-transfer inspection step
/// (file count for directories, byte size for single files).
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub source: Location,
    pub destination: Location,
    pub total_units: u64,
}

/// Validates preconditions, assembles options, runs the poller and
/// classifies the outcome. One invocation per logical transfer; not
/// re-entrant for the same job handle.
pub struct TransferManager {
    engine: Arc<dyn CopyEngine>,
    prompt: Arc<dyn InstallPrompt>,
    log: Arc<dyn LogSink>,
    poll_interval: Duration,
}

impl TransferManager {
    pub fn new(
        engine: Arc<dyn CopyEngine>,
        prompt: Arc<dyn InstallPrompt>,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            engine,
            prompt,
            log,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the poll interval passed to the job poller.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Uploads to a blob container.
    pub async fn upload_to_blob(
        &self,
        request: UploadRequest,
        notify: Option<&dyn NotificationSink>,
        cancel: CancellationToken,
    ) -> Result<(), TransferError> {
        self.upload(Direction::LocalToBlob, request, notify, cancel)
            .await
    }

    /// Uploads to a file share.
    pub async fn upload_to_file_share(
        &self,
        request: UploadRequest,
        notify: Option<&dyn NotificationSink>,
        cancel: CancellationToken,
    ) -> Result<(), TransferError> {
        self.upload(Direction::LocalToFileShare, request, notify, cancel)
            .await
    }

    async fn upload(
        &self,
        direction: Direction,
        request: UploadRequest,
        notify: Option<&dyn NotificationSink>,
        cancel: CancellationToken,
    ) -> Result<(), TransferError> {
        if !self.ensure_engine().await {
            return Ok(());
        }

        let wildcard = request.source.is_wildcard();
        let mut options = TransferOptions::upload(direction);
        if wildcard {
            options = options.exclude(METADATA_EXCLUDES.iter().copied());
        }

        let unit_label = if wildcard { "files" } else { "bytes" };
        let mut progress = TransferProgress::new(request.total_units, unit_label);

        let poller =
            JobPoller::new(&*self.engine, cancel).with_poll_interval(self.poll_interval);
        let handle = poller
            .run(
                &request.source,
                &request.destination,
                &options,
                &mut progress,
                &*self.log,
                notify,
            )
            .await?;

        match self.engine.job_status(&handle).await? {
            Some(status) if !status.failed() => {
                info!(job = %handle, "transfer completed");
                Ok(())
            }
            Some(status) => {
                let message = status
                    .error_msg
                    .unwrap_or_else(|| "the copy engine reported a failure".to_string());
                warn!(job = %handle, error = %message, "transfer failed");
                Err(TransferError::JobFailed(message))
            }
            None => Err(TransferError::JobFailed(
                "the copy engine reported no final status".to_string(),
            )),
        }
    }

    /// Verifies the engine is reachable. On failure, explains the
    /// situation and offers the download page; the transfer then aborts
    /// silently — no job is submitted and no error raised.
    async fn ensure_engine(&self) -> bool {
        match self.engine.probe().await {
            Ok(version) => {
                debug!(%version, "copy engine available");
                true
            }
            Err(e) => {
                warn!(error = %e, "copy engine unavailable");
                self.log
                    .append_line("Bulk uploads require the AzCopy engine, which was not found.");
                let message = "Bulk uploads require the AzCopy engine, which was not found. \
                               Open the download page?";
                if self.prompt.confirm_install(message).await {
                    self.prompt.open_download_page(ENGINE_DOWNLOAD_URL);
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobferry_engine::{EngineError, JobHandle, JobOutcome, JobStatus, StatusType};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct ScriptedEngine {
        available: bool,
        statuses: Mutex<VecDeque<JobStatus>>,
        last: Mutex<Option<JobStatus>>,
        submissions: AtomicUsize,
        submitted_options: Mutex<Vec<TransferOptions>>,
    }

    impl ScriptedEngine {
        fn new(statuses: Vec<JobStatus>) -> Self {
            Self {
                available: true,
                statuses: Mutex::new(statuses.into()),
                last: Mutex::new(None),
                submissions: AtomicUsize::new(0),
                submitted_options: Mutex::new(Vec::new()),
            }
        }

        fn unavailable() -> Self {
            let mut engine = Self::new(Vec::new());
            engine.available = false;
            engine
        }
    }

    impl CopyEngine for ScriptedEngine {
        fn probe(&self) -> Pin<Box<dyn Future<Output = Result<String, EngineError>> + Send + '_>> {
            let available = self.available;
            Box::pin(async move {
                if available {
                    Ok("10.21.2".to_string())
                } else {
                    Err(EngineError::Spawn("azcopy: not found".to_string()))
                }
            })
        }

        fn submit(
            &self,
            _source: &Location,
            _destination: &Location,
            options: &TransferOptions,
        ) -> Pin<Box<dyn Future<Output = Result<JobHandle, EngineError>> + Send + '_>> {
            self.submissions.fetch_add(1, Ordering::SeqCst);
            self.submitted_options.lock().unwrap().push(options.clone());
            Box::pin(async { Ok(JobHandle::new()) })
        }

        fn job_status(
            &self,
            _handle: &JobHandle,
        ) -> Pin<Box<dyn Future<Output = Result<Option<JobStatus>, EngineError>> + Send + '_>>
        {
            // Terminal statuses stay observable for the final re-fetch.
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.statuses.lock().unwrap().pop_front() {
                *last = Some(next);
            }
            let status = last.clone();
            Box::pin(async move { Ok(status) })
        }
    }

    struct RecordingPrompt {
        accept: bool,
        prompted: AtomicBool,
        opened: Mutex<Option<String>>,
    }

    impl RecordingPrompt {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                prompted: AtomicBool::new(false),
                opened: Mutex::new(None),
            }
        }
    }

    impl InstallPrompt for RecordingPrompt {
        fn confirm_install(
            &self,
            _message: &str,
        ) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
            self.prompted.store(true, Ordering::SeqCst);
            let accept = self.accept;
            Box::pin(async move { accept })
        }

        fn open_download_page(&self, url: &str) {
            *self.opened.lock().unwrap() = Some(url.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingLog {
        lines: Mutex<Vec<String>>,
    }

    impl LogSink for RecordingLog {
        fn append_line(&self, line: &str) {
            self.lines.lock().unwrap().push(line.to_string());
        }
    }

    fn completed(transfers: u64) -> JobStatus {
        JobStatus {
            status_type: StatusType::EndOfJob,
            job_status: Some(JobOutcome::Completed),
            error_msg: None,
            transfers_completed: Some(transfers),
            bytes_over_wire: None,
        }
    }

    fn failed(message: &str) -> JobStatus {
        JobStatus {
            status_type: StatusType::EndOfJob,
            job_status: Some(JobOutcome::Failed),
            error_msg: Some(message.to_string()),
            transfers_completed: None,
            bytes_over_wire: None,
        }
    }

    fn directory_request() -> UploadRequest {
        UploadRequest {
            source: Location::local_directory("/data/photos"),
            destination: Location::remote(
                "https://acct.blob.example.net/backups",
                "sig",
                "photos",
            ),
            total_units: 10,
        }
    }

    fn manager(
        engine: Arc<ScriptedEngine>,
        prompt: Arc<RecordingPrompt>,
        log: Arc<RecordingLog>,
    ) -> TransferManager {
        TransferManager::new(engine, prompt, log).with_poll_interval(Duration::ZERO)
    }

    #[tokio::test]
    async fn successful_upload_returns_ok() {
        let engine = Arc::new(ScriptedEngine::new(vec![completed(10)]));
        let prompt = Arc::new(RecordingPrompt::new(false));
        let log = Arc::new(RecordingLog::default());

        let result = manager(Arc::clone(&engine), prompt, log)
            .upload_to_blob(directory_request(), None, CancellationToken::new())
            .await;

        assert!(result.is_ok());
        assert_eq!(engine.submissions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_outcome_carries_engine_message() {
        let engine = Arc::new(ScriptedEngine::new(vec![failed("403 AuthorizationFailure")]));
        let prompt = Arc::new(RecordingPrompt::new(false));
        let log = Arc::new(RecordingLog::default());

        let result = manager(engine, prompt, log)
            .upload_to_blob(directory_request(), None, CancellationToken::new())
            .await;

        match result {
            Err(TransferError::JobFailed(message)) => {
                assert!(message.contains("403 AuthorizationFailure"));
            }
            other => panic!("expected JobFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_outcome_without_message_gets_generic_text() {
        let mut status = failed("ignored");
        status.error_msg = None;
        let engine = Arc::new(ScriptedEngine::new(vec![status]));
        let prompt = Arc::new(RecordingPrompt::new(false));
        let log = Arc::new(RecordingLog::default());

        let result = manager(engine, prompt, log)
            .upload_to_blob(directory_request(), None, CancellationToken::new())
            .await;

        assert!(matches!(result, Err(TransferError::JobFailed(_))));
    }

    #[tokio::test]
    async fn unavailable_engine_aborts_silently_without_submitting() {
        let engine = Arc::new(ScriptedEngine::unavailable());
        let prompt = Arc::new(RecordingPrompt::new(true));
        let log = Arc::new(RecordingLog::default());

        let result = manager(
            Arc::clone(&engine),
            Arc::clone(&prompt),
            Arc::clone(&log),
        )
        .upload_to_blob(directory_request(), None, CancellationToken::new())
        .await;

        assert!(result.is_ok());
        assert_eq!(engine.submissions.load(Ordering::SeqCst), 0);
        assert!(prompt.prompted.load(Ordering::SeqCst));
        assert_eq!(
            prompt.opened.lock().unwrap().as_deref(),
            Some(ENGINE_DOWNLOAD_URL)
        );
        assert!(!log.lines.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn declined_install_does_not_open_download_page() {
        let engine = Arc::new(ScriptedEngine::unavailable());
        let prompt = Arc::new(RecordingPrompt::new(false));
        let log = Arc::new(RecordingLog::default());

        let result = manager(engine, Arc::clone(&prompt), log)
            .upload_to_blob(directory_request(), None, CancellationToken::new())
            .await;

        assert!(result.is_ok());
        assert!(prompt.opened.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn cancellation_propagates_unwrapped() {
        let engine = Arc::new(ScriptedEngine::new(vec![completed(10)]));
        let prompt = Arc::new(RecordingPrompt::new(false));
        let log = Arc::new(RecordingLog::default());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = manager(engine, prompt, log)
            .upload_to_blob(directory_request(), None, cancel)
            .await;

        assert!(matches!(result, Err(TransferError::Cancelled)));
    }

    #[tokio::test]
    async fn directory_uploads_exclude_metadata_directories() {
        let engine = Arc::new(ScriptedEngine::new(vec![completed(10)]));
        let prompt = Arc::new(RecordingPrompt::new(false));
        let log = Arc::new(RecordingLog::default());

        manager(Arc::clone(&engine), prompt, log)
            .upload_to_blob(directory_request(), None, CancellationToken::new())
            .await
            .unwrap();

        let submitted = engine.submitted_options.lock().unwrap();
        assert_eq!(submitted[0].exclude_paths, vec![".git", ".vscode"]);
    }

    #[tokio::test]
    async fn single_file_uploads_have_no_exclusions() {
        let engine = Arc::new(ScriptedEngine::new(vec![completed(1)]));
        let prompt = Arc::new(RecordingPrompt::new(false));
        let log = Arc::new(RecordingLog::default());

        let request = UploadRequest {
            source: Location::local("/data/video.mp4"),
            destination: Location::remote(
                "https://acct.file.example.net/share",
                "sig",
                "video.mp4",
            ),
            total_units: 2048,
        };

        manager(Arc::clone(&engine), prompt, log)
            .upload_to_file_share(request, None, CancellationToken::new())
            .await
            .unwrap();

        let submitted = engine.submitted_options.lock().unwrap();
        assert!(submitted[0].exclude_paths.is_empty());
        assert_eq!(submitted[0].direction, Direction::LocalToFileShare);
    }
}
