//! [`Gateway`] implementation over the serverless REST client.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qfc_core::{
    CatalogError, CatalogResult, Credentials, FileScope, FunctionQuery, FunctionUpload, Gateway,
    JobId, JobInfo, JobQuery, JobStatus, QiskitFunction, RunConfig,
};

use crate::api::{JobResponse, ServerlessClient};
use crate::error::{GatewayError, GatewayResult};

/// Serverless gateway adapter.
#[derive(Debug, Clone)]
pub struct ServerlessGateway {
    client: Arc<ServerlessClient>,
}

impl ServerlessGateway {
    /// Wrap an existing client.
    pub fn new(client: ServerlessClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Build a client from credentials and verify the token.
    pub async fn connect(credentials: &Credentials) -> GatewayResult<Self> {
        tracing::info!("connecting to serverless gateway at {}", credentials.host);
        let client = ServerlessClient::connect(credentials).await?;
        Ok(Self::new(client))
    }

    /// The underlying REST client.
    pub fn client(&self) -> &ServerlessClient {
        &self.client
    }
}

/// Convert a wire job into the shared job record.
pub(crate) fn job_info(job: JobResponse) -> JobInfo {
    let status = JobStatus::from_gateway(&job.status, job.sub_status.as_deref());
    let (function, provider) = job.function();
    let created = job.created.as_deref().and_then(|text| {
        DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| tracing::debug!("unparseable job timestamp {text:?}: {e}"))
            .ok()
    });
    let result = job.result_text();

    JobInfo {
        id: JobId::new(job.id),
        status,
        function,
        provider,
        created,
        result,
    }
}

#[async_trait]
impl Gateway for ServerlessGateway {
    fn host(&self) -> &str {
        self.client.host()
    }

    async fn list_functions(&self, query: &FunctionQuery) -> CatalogResult<Vec<QiskitFunction>> {
        let raw = self.client.list_programs(query).await?;
        let mut functions = Vec::with_capacity(raw.len());
        for value in raw {
            match QiskitFunction::from_value(value) {
                Ok(function) => functions.push(function),
                Err(e) => tracing::warn!("skipping malformed function entry: {e}"),
            }
        }
        Ok(functions)
    }

    async fn get_function(
        &self,
        title: &str,
        provider: Option<&str>,
    ) -> CatalogResult<Option<QiskitFunction>> {
        match self.client.get_program_by_title(title, provider).await? {
            Some(value) => Ok(Some(QiskitFunction::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn run_function(
        &self,
        function: &QiskitFunction,
        arguments: &serde_json::Map<String, serde_json::Value>,
        config: Option<&RunConfig>,
    ) -> CatalogResult<JobId> {
        let response = self
            .client
            .run_program(
                &function.title,
                function.provider.as_deref(),
                arguments,
                config,
            )
            .await?;
        if response.id.is_empty() {
            return Err(GatewayError::UnexpectedResponse("empty job id".into()).into());
        }
        tracing::info!("submitted {} as job {}", function.display_name(), response.id);
        Ok(JobId::new(response.id))
    }

    async fn upload_function(&self, upload: &FunctionUpload) -> CatalogResult<QiskitFunction> {
        upload.validate()?;
        let value = self.client.upload_program(upload).await?;
        let mut function = QiskitFunction::from_value(value).unwrap_or_else(|e| {
            tracing::warn!("unexpected upload response for {}: {e}", upload.title);
            QiskitFunction::new(upload.title.clone())
        });
        if function.provider.is_none() {
            function.provider = upload.provider.clone();
        }
        tracing::info!("uploaded function {}", function.display_name());
        Ok(function)
    }

    async fn list_jobs(&self, query: &JobQuery) -> CatalogResult<Vec<JobInfo>> {
        let jobs = self.client.list_jobs(query).await?;
        Ok(jobs.into_iter().map(job_info).collect())
    }

    async fn get_job(&self, job_id: &JobId) -> CatalogResult<Option<JobInfo>> {
        Ok(self.client.get_job(job_id.as_str()).await?.map(job_info))
    }

    async fn job_logs(&self, job_id: &JobId) -> CatalogResult<String> {
        Ok(self.client.job_logs(job_id.as_str()).await?)
    }

    async fn stop_job(&self, job_id: &JobId) -> CatalogResult<String> {
        Ok(self.client.stop_job(job_id.as_str()).await?)
    }

    async fn list_files(
        &self,
        scope: FileScope,
        function: &QiskitFunction,
    ) -> CatalogResult<Vec<String>> {
        Ok(self
            .client
            .list_files(scope, &function.title, function.provider.as_deref())
            .await?)
    }

    async fn download_file(
        &self,
        scope: FileScope,
        file: &str,
        function: &QiskitFunction,
        destination: &Path,
    ) -> CatalogResult<PathBuf> {
        Ok(self
            .client
            .download_file(
                scope,
                file,
                &function.title,
                function.provider.as_deref(),
                destination,
            )
            .await?)
    }

    async fn delete_file(
        &self,
        scope: FileScope,
        file: &str,
        function: &QiskitFunction,
    ) -> CatalogResult<String> {
        Ok(self
            .client
            .delete_file(scope, file, &function.title, function.provider.as_deref())
            .await?)
    }

    async fn upload_file(
        &self,
        scope: FileScope,
        path: &Path,
        function: &QiskitFunction,
    ) -> CatalogResult<String> {
        if !path.is_file() {
            return Err(CatalogError::InvalidUpload(format!(
                "{} is not a file",
                path.display()
            )));
        }
        Ok(self
            .client
            .upload_file(scope, path, &function.title, function.provider.as_deref())
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_info_conversion() {
        let job: JobResponse = serde_json::from_value(serde_json::json!({
            "id": "job-1",
            "status": "RUNNING",
            "sub_status": "mapping",
            "program": {"title": "hamsim", "provider": "ibm"},
            "created": "2024-06-01T12:00:00+02:00"
        }))
        .unwrap();

        let info = job_info(job);
        assert_eq!(info.id.as_str(), "job-1");
        assert_eq!(info.status, JobStatus::Running(Some("MAPPING".into())));
        assert_eq!(info.function.as_deref(), Some("hamsim"));
        assert_eq!(info.provider.as_deref(), Some("ibm"));
        assert_eq!(
            info.created.unwrap().to_rfc3339(),
            "2024-06-01T10:00:00+00:00"
        );
        assert!(info.result.is_none());
    }

    #[test]
    fn test_job_info_bad_timestamp() {
        let job: JobResponse = serde_json::from_value(serde_json::json!({
            "id": "job-2",
            "status": "SUCCEEDED",
            "result": "{\"value\": 1}",
            "created": "yesterday"
        }))
        .unwrap();

        let info = job_info(job);
        assert_eq!(info.status, JobStatus::Done);
        assert!(info.created.is_none());
        assert_eq!(info.result.as_deref(), Some("{\"value\": 1}"));
    }
}
