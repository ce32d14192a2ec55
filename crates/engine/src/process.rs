//! Subprocess-backed engine client.
//!
//! Each submitted job spawns one engine process in JSON output mode. A
//! background task tails the process's stdout, parsing status lines into a
//! shared latest-status map that [`CopyEngine::job_status`] reads from. If
//! the process exits without emitting a terminal status, one is synthesized
//! from the exit code so pollers always observe an end of job.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::EngineError;
use crate::client::CopyEngine;
use crate::location::Location;
use crate::options::TransferOptions;
use crate::status::{JobHandle, JobOutcome, JobStatus, StatusType};

/// Drives the AzCopy binary as an asynchronous job runner.
pub struct AzCopyEngine {
    binary: PathBuf,
    jobs: Arc<RwLock<HashMap<JobHandle, JobStatus>>>,
}

impl AzCopyEngine {
    /// Creates a client for the engine binary at `binary`.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Path of the configured engine binary.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    async fn run_probe(&self) -> Result<String, EngineError> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| EngineError::Spawn(format!("{}: {e}", self.binary.display())))?;

        if !output.status.success() {
            return Err(EngineError::Probe(format!(
                "version probe exited with {}",
                output.status
            )));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            return Err(EngineError::Probe("version probe produced no output".into()));
        }

        debug!(%version, "engine probe succeeded");
        Ok(version)
    }

    async fn run_submit(
        &self,
        source: Location,
        destination: Location,
        options: TransferOptions,
    ) -> Result<JobHandle, EngineError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("copy")
            .arg(source.as_engine_arg())
            .arg(destination.as_engine_arg())
            .args(options.cli_args())
            .arg("--output-type=json")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = command
            .spawn()
            .map_err(|e| EngineError::Spawn(format!("{}: {e}", self.binary.display())))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Spawn("engine stdout unavailable".into()))?;

        let handle = JobHandle::new();
        self.jobs
            .write()
            .await
            .insert(handle.clone(), JobStatus::started());

        info!(job = %handle, "copy job submitted to engine");

        let jobs = Arc::clone(&self.jobs);
        let job = handle.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut last = JobStatus::started();

            while let Ok(Some(line)) = lines.next_line().await {
                match serde_json::from_str::<JobStatus>(&line) {
                    Ok(status) => {
                        last = status.clone();
                        jobs.write().await.insert(job.clone(), status);
                    }
                    Err(_) => {
                        // The engine interleaves banner and summary text
                        // with its JSON lines; skip whatever does not parse.
                        debug!(job = %job, %line, "ignoring non-status engine output");
                    }
                }
            }

            let exit = child.wait().await;
            if !last.is_terminal() {
                let (outcome, error_msg) = match exit {
                    Ok(code) if code.success() => (JobOutcome::Completed, None),
                    Ok(code) => (
                        JobOutcome::Failed,
                        Some(format!("engine exited with {code}")),
                    ),
                    Err(e) => (
                        JobOutcome::Failed,
                        Some(format!("failed to wait for engine: {e}")),
                    ),
                };
                let status = JobStatus {
                    status_type: StatusType::EndOfJob,
                    job_status: Some(outcome),
                    error_msg,
                    transfers_completed: last.transfers_completed,
                    bytes_over_wire: last.bytes_over_wire,
                };
                jobs.write().await.insert(job.clone(), status);
            }

            debug!(job = %job, "engine process finished");
        });

        Ok(handle)
    }

    async fn run_status(&self, handle: &JobHandle) -> Result<Option<JobStatus>, EngineError> {
        Ok(self.jobs.read().await.get(handle).cloned())
    }
}

impl CopyEngine for AzCopyEngine {
    fn probe(&self) -> Pin<Box<dyn Future<Output = Result<String, EngineError>> + Send + '_>> {
        Box::pin(self.run_probe())
    }

    fn submit(
        &self,
        source: &Location,
        destination: &Location,
        options: &TransferOptions,
    ) -> Pin<Box<dyn Future<Output = Result<JobHandle, EngineError>> + Send + '_>> {
        let source = source.clone();
        let destination = destination.clone();
        let options = options.clone();
        Box::pin(self.run_submit(source, destination, options))
    }

    fn job_status(
        &self,
        handle: &JobHandle,
    ) -> Pin<Box<dyn Future<Output = Result<Option<JobStatus>, EngineError>> + Send + '_>> {
        let handle = handle.clone();
        Box::pin(async move { self.run_status(&handle).await })
    }
}
