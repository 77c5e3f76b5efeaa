//! Job lifecycle types.
//!
//! The gateway reports a job as a `(status, sub_status)` pair. Clients see
//! the mapped state:
//!
//! ```text
//!   run() ──→ Queued ──→ Initializing ──→ Running(sub) ──→ Done
//!               │             │                │
//!               │             │                ├──→ Error
//!               │             │                │
//!               └─────────────┴────────────────┴──→ Canceled
//! ```
//!
//! `Done`, `Error` and `Canceled` are terminal. A result is only
//! meaningful once the job is terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Create a new job ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Client-side status of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// Waiting in the gateway queue.
    Queued,
    /// Resources are being provisioned.
    Initializing,
    /// Executing, optionally with a finer-grained phase (e.g. `WAITING_QPU`).
    Running(Option<String>),
    /// Finished successfully.
    Done,
    /// Finished with an error.
    Error,
    /// Stopped before finishing.
    Canceled,
    /// Status string this client does not know about.
    Unknown(String),
}

impl JobStatus {
    /// Map a gateway `(status, sub_status)` pair to a client status.
    ///
    /// Matching is case-insensitive. Sub-statuses are only kept for
    /// running jobs.
    pub fn from_gateway(status: &str, sub_status: Option<&str>) -> Self {
        match status.trim().to_uppercase().as_str() {
            "QUEUED" => JobStatus::Queued,
            "PENDING" => JobStatus::Initializing,
            "RUNNING" => JobStatus::Running(
                sub_status
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_uppercase),
            ),
            "STOPPED" => JobStatus::Canceled,
            "SUCCEEDED" => JobStatus::Done,
            "FAILED" => JobStatus::Error,
            _ => JobStatus::Unknown(status.to_string()),
        }
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error | JobStatus::Canceled)
    }

    /// Check if the job finished successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Done)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "QUEUED"),
            JobStatus::Initializing => write!(f, "INITIALIZING"),
            JobStatus::Running(None) => write!(f, "RUNNING"),
            JobStatus::Running(Some(sub)) => write!(f, "RUNNING: {sub}"),
            JobStatus::Done => write!(f, "DONE"),
            JobStatus::Error => write!(f, "ERROR"),
            JobStatus::Canceled => write!(f, "CANCELED"),
            JobStatus::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

/// A job as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    /// The job identifier.
    pub id: JobId,
    /// Current status.
    pub status: JobStatus,
    /// Title of the function the job runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Provider of the function the job runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Time the job was created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    /// Raw result text (JSON for finished jobs, error text for failed ones).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl JobInfo {
    /// Create a job record with only an id and status.
    pub fn new(id: impl Into<JobId>, status: JobStatus) -> Self {
        Self {
            id: id.into(),
            status,
            function: None,
            provider: None,
            created: None,
            result: None,
        }
    }
}

/// Query parameters for listing jobs.
///
/// Fields left as `None` are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobQuery {
    /// Maximum number of jobs to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Number of jobs to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Pre-filter keyword (`catalog` or `serverless`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    /// Gateway status to match (e.g. `SUCCEEDED`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Only jobs created after this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    /// Only jobs of this function title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl JobQuery {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the page offset.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Set the pre-filter keyword.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Match a gateway status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Only jobs created after `instant`.
    pub fn with_created_after(mut self, instant: DateTime<Utc>) -> Self {
        self.created_after = Some(instant);
        self
    }

    /// Only jobs of the given function title.
    pub fn with_function(mut self, title: impl Into<String>) -> Self {
        self.function = Some(title.into());
        self
    }
}

/// Worker sizing sent with a run request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Fixed number of workers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<u32>,
    /// Lower bound when auto-scaling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_workers: Option<u32>,
    /// Upper bound when auto-scaling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<u32>,
    /// Let the gateway scale workers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_scaling: Option<bool>,
}
