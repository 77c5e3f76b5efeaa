//! Gateway trait.
//!
//! The [`Gateway`] trait is the contract between the public facades and
//! the remote service. One implementation speaks the serverless REST
//! protocol; tests substitute recording fakes.
//!
//! | Method | Returns |
//! |--------|---------|
//! | `host()` | `&str` |
//! | `list_functions()` | `Vec<QiskitFunction>` |
//! | `get_function()` | `Option<QiskitFunction>` (`None` when unknown) |
//! | `run_function()` | `JobId` |
//! | `upload_function()` | `QiskitFunction` |
//! | `list_jobs()` | `Vec<JobInfo>` |
//! | `get_job()` | `Option<JobInfo>` (`None` when unknown) |
//! | `job_logs()` | `String` |
//! | `stop_job()` | gateway message |
//! | `list_files()` / `download_file()` / `delete_file()` / `upload_file()` | file operations scoped by [`FileScope`] |
//! | `job_status()` | provided, `JobStatus` |

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{CatalogError, CatalogResult};
use crate::function::{FunctionQuery, FunctionUpload, QiskitFunction};
use crate::job::{JobId, JobInfo, JobQuery, JobStatus, RunConfig};

/// Which per-function folder a file operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileScope {
    /// The calling user's folder.
    User,
    /// The function provider's folder.
    Provider,
}

impl FileScope {
    /// Gateway path segments of the folder root for this scope.
    pub fn path_segments(self) -> &'static [&'static str] {
        match self {
            FileScope::User => &["files"],
            FileScope::Provider => &["files", "provider"],
        }
    }
}

/// Remote operations needed by the catalog and serverless facades.
///
/// Implementations MUST be cheap to share (`Arc<dyn Gateway>`) and MUST
/// map "not found" lookups to `Ok(None)` rather than an error.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Base URL of the gateway.
    fn host(&self) -> &str;

    /// List functions visible to the user.
    async fn list_functions(&self, query: &FunctionQuery) -> CatalogResult<Vec<QiskitFunction>>;

    /// Look up a function by title and optional provider.
    async fn get_function(
        &self,
        title: &str,
        provider: Option<&str>,
    ) -> CatalogResult<Option<QiskitFunction>>;

    /// Start a job running `function` with the given JSON arguments.
    async fn run_function(
        &self,
        function: &QiskitFunction,
        arguments: &serde_json::Map<String, serde_json::Value>,
        config: Option<&RunConfig>,
    ) -> CatalogResult<JobId>;

    /// Upload a function definition.
    async fn upload_function(&self, upload: &FunctionUpload) -> CatalogResult<QiskitFunction>;

    /// List jobs.
    async fn list_jobs(&self, query: &JobQuery) -> CatalogResult<Vec<JobInfo>>;

    /// Fetch a job, including its stored result when present.
    async fn get_job(&self, job_id: &JobId) -> CatalogResult<Option<JobInfo>>;

    /// Fetch the log text of a job.
    async fn job_logs(&self, job_id: &JobId) -> CatalogResult<String>;

    /// Ask the gateway to stop a job.
    async fn stop_job(&self, job_id: &JobId) -> CatalogResult<String>;

    /// List files in a function folder.
    async fn list_files(
        &self,
        scope: FileScope,
        function: &QiskitFunction,
    ) -> CatalogResult<Vec<String>>;

    /// Download `file` from a function folder to `destination`.
    async fn download_file(
        &self,
        scope: FileScope,
        file: &str,
        function: &QiskitFunction,
        destination: &Path,
    ) -> CatalogResult<PathBuf>;

    /// Delete `file` from a function folder.
    async fn delete_file(
        &self,
        scope: FileScope,
        file: &str,
        function: &QiskitFunction,
    ) -> CatalogResult<String>;

    /// Upload a local file into a function folder.
    async fn upload_file(
        &self,
        scope: FileScope,
        path: &Path,
        function: &QiskitFunction,
    ) -> CatalogResult<String>;

    /// Fetch only the status of a job.
    async fn job_status(&self, job_id: &JobId) -> CatalogResult<JobStatus> {
        self.get_job(job_id)
            .await?
            .map(|job| job.status)
            .ok_or_else(|| CatalogError::JobNotFound(job_id.to_string()))
    }
}
