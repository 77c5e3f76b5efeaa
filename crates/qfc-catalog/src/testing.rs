//! Recording in-memory gateway for facade tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use qfc_core::{
    CatalogError, CatalogResult, FileScope, FunctionQuery, FunctionUpload, Gateway, JobId,
    JobInfo, JobQuery, QiskitFunction, RunConfig,
};

/// A file operation seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FileCall {
    pub op: &'static str,
    pub scope: FileScope,
    pub file: String,
    pub function: String,
}

#[derive(Default)]
pub(crate) struct RecordingGateway {
    /// Functions returned by listing and lookup.
    pub functions: Vec<QiskitFunction>,
    /// Jobs returned by `list_jobs`.
    pub listed_jobs: Vec<JobInfo>,
    /// Successive snapshots served by `get_job`; the last one repeats.
    pub job_script: Mutex<VecDeque<JobInfo>>,

    pub function_queries: Mutex<Vec<FunctionQuery>>,
    pub job_queries: Mutex<Vec<JobQuery>>,
    pub runs: Mutex<Vec<(String, serde_json::Map<String, serde_json::Value>)>>,
    pub uploads: Mutex<Vec<String>>,
    pub file_calls: Mutex<Vec<FileCall>>,
    pub get_job_calls: AtomicUsize,
}

impl RecordingGateway {
    pub fn with_functions(functions: Vec<QiskitFunction>) -> Self {
        Self {
            functions,
            ..Self::default()
        }
    }

    pub fn with_job_script(snapshots: Vec<JobInfo>) -> Self {
        Self {
            job_script: Mutex::new(snapshots.into()),
            ..Self::default()
        }
    }

    fn record_file(&self, op: &'static str, scope: FileScope, file: &str, function: &QiskitFunction) {
        self.file_calls.lock().unwrap().push(FileCall {
            op,
            scope,
            file: file.to_string(),
            function: function.display_name(),
        });
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    fn host(&self) -> &str {
        "memory://gateway"
    }

    async fn list_functions(&self, query: &FunctionQuery) -> CatalogResult<Vec<QiskitFunction>> {
        self.function_queries.lock().unwrap().push(query.clone());
        Ok(self.functions.clone())
    }

    async fn get_function(
        &self,
        title: &str,
        provider: Option<&str>,
    ) -> CatalogResult<Option<QiskitFunction>> {
        Ok(self
            .functions
            .iter()
            .find(|f| f.title == title && (provider.is_none() || f.provider.as_deref() == provider))
            .cloned())
    }

    async fn run_function(
        &self,
        function: &QiskitFunction,
        arguments: &serde_json::Map<String, serde_json::Value>,
        _config: Option<&RunConfig>,
    ) -> CatalogResult<JobId> {
        let mut runs = self.runs.lock().unwrap();
        runs.push((function.title.clone(), arguments.clone()));
        Ok(JobId::new(format!("job-{}", runs.len())))
    }

    async fn upload_function(&self, upload: &FunctionUpload) -> CatalogResult<QiskitFunction> {
        upload.validate()?;
        self.uploads.lock().unwrap().push(upload.title.clone());
        let mut function = QiskitFunction::new(upload.title.clone());
        function.provider = upload.provider.clone();
        Ok(function)
    }

    async fn list_jobs(&self, query: &JobQuery) -> CatalogResult<Vec<JobInfo>> {
        self.job_queries.lock().unwrap().push(query.clone());
        Ok(self.listed_jobs.clone())
    }

    async fn get_job(&self, job_id: &JobId) -> CatalogResult<Option<JobInfo>> {
        self.get_job_calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.job_script.lock().unwrap();
        let snapshot = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        Ok(snapshot.filter(|job| &job.id == job_id))
    }

    async fn job_logs(&self, job_id: &JobId) -> CatalogResult<String> {
        Ok(format!("logs of {job_id}"))
    }

    async fn stop_job(&self, job_id: &JobId) -> CatalogResult<String> {
        Ok(format!("stopped {job_id}"))
    }

    async fn list_files(
        &self,
        scope: FileScope,
        function: &QiskitFunction,
    ) -> CatalogResult<Vec<String>> {
        self.record_file("list", scope, "", function);
        Ok(vec!["a.txt".into()])
    }

    async fn download_file(
        &self,
        scope: FileScope,
        file: &str,
        function: &QiskitFunction,
        destination: &Path,
    ) -> CatalogResult<PathBuf> {
        self.record_file("download", scope, file, function);
        Ok(destination.to_path_buf())
    }

    async fn delete_file(
        &self,
        scope: FileScope,
        file: &str,
        function: &QiskitFunction,
    ) -> CatalogResult<String> {
        self.record_file("delete", scope, file, function);
        Ok("deleted".into())
    }

    async fn upload_file(
        &self,
        scope: FileScope,
        path: &Path,
        function: &QiskitFunction,
    ) -> CatalogResult<String> {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| CatalogError::InvalidUpload(path.display().to_string()))?;
        self.record_file("upload", scope, &file, function);
        Ok("uploaded".into())
    }
}
