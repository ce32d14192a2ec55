//! Job identity and status as reported by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for one in-flight engine job.
///
/// Issued by [`CopyEngine::submit`](crate::CopyEngine::submit) and used for
/// all subsequent status polls. It carries no meaning once its job has
/// reached a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle(String);

impl JobHandle {
    /// Allocates a fresh handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a job is still running or done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusType {
    InProgress,
    EndOfJob,
}

/// Job-level outcome discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobOutcome {
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

/// One engine status snapshot, parsed from the engine's JSON output.
///
/// Counters are cumulative since job start and may be momentarily absent
/// or stale; callers treat a missing counter as zero rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub status_type: StatusType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_status: Option<JobOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
    /// Count of completed sub-transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfers_completed: Option<u64>,
    /// Bytes moved over the wire since job start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes_over_wire: Option<u64>,
}

impl JobStatus {
    /// Snapshot for a job that has started but reported nothing yet.
    pub fn started() -> Self {
        Self {
            status_type: StatusType::InProgress,
            job_status: Some(JobOutcome::InProgress),
            error_msg: None,
            transfers_completed: None,
            bytes_over_wire: None,
        }
    }

    /// Whether no further progress will occur for this job.
    pub fn is_terminal(&self) -> bool {
        self.status_type == StatusType::EndOfJob
    }

    /// Whether the job-level outcome reads as a failure.
    pub fn failed(&self) -> bool {
        matches!(self.job_status, Some(JobOutcome::Failed))
    }

    /// Selects the authoritative progress counter for this snapshot.
    ///
    /// Directory (wildcard) transfers are tracked by completed sub-transfer
    /// count; single-file transfers by bytes over the wire. Absent counters
    /// read as zero.
    pub fn progress_units(&self, wildcard_source: bool) -> u64 {
        if wildcard_source {
            self.transfers_completed.unwrap_or(0)
        } else {
            self.bytes_over_wire.unwrap_or(0)
        }
    }
}
