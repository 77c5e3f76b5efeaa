//! Qiskit serverless gateway REST client.
//!
//! This module implements the client side of the gateway API under
//! `{host}/api/v1/`:
//! - Listing, looking up, running and uploading functions (`programs/`)
//! - Listing jobs, fetching status/results, logs and stopping (`jobs/`)
//! - Per-function user and provider file folders (`files/`)
//!
//! Every request carries `Authorization: Bearer <token>` plus the
//! `Service-Channel` header, and `Service-CRN` when an instance is set.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use qfc_core::{Channel, Credentials, FileScope, FunctionQuery, FunctionUpload, JobQuery, RunConfig};
use reqwest::{Client, Response, StatusCode, Url, header, multipart};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{GatewayError, GatewayResult};

/// Gateway API version segment.
pub const API_VERSION: &str = "v1";

/// User-Agent sent with requests.
const USER_AGENT: &str = concat!("qfc/", env!("CARGO_PKG_VERSION"), " (qiskit-functions-catalog)");

/// Request timeout. Job submission can be slow while the gateway builds
/// the job environment.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Serverless gateway API client.
pub struct ServerlessClient {
    /// HTTP client with authentication headers installed.
    client: Client,
    /// Gateway base URL as configured.
    host: String,
    /// `{host}/api/v1/` parsed once.
    base: Url,
    /// Access channel sent as `Service-Channel`.
    channel: Channel,
    /// Service instance sent as `Service-CRN`.
    instance: Option<String>,
}

impl fmt::Debug for ServerlessClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerlessClient")
            .field("host", &self.host)
            .field("token", &"[REDACTED]")
            .field("channel", &self.channel)
            .field("instance", &self.instance)
            .finish()
    }
}

impl ServerlessClient {
    /// Create a client without contacting the gateway.
    pub fn new(credentials: &Credentials) -> GatewayResult<Self> {
        let mut headers = header::HeaderMap::new();

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", credentials.token))
            .map_err(|_| GatewayError::InvalidToken)?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::HeaderName::from_static("service-channel"),
            header::HeaderValue::from_static(credentials.channel.as_str()),
        );
        if let Some(instance) = &credentials.instance {
            headers.insert(
                header::HeaderName::from_static("service-crn"),
                header::HeaderValue::from_str(instance)
                    .map_err(|_| GatewayError::InvalidHeader("service-crn"))?,
            );
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        let mut base =
            Url::parse(&credentials.host).map_err(|e| GatewayError::InvalidUrl(e.to_string()))?;
        base.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(credentials.host.clone()))?
            .pop_if_empty()
            .extend(["api", API_VERSION])
            .push("");

        Ok(Self {
            client,
            host: credentials.host.clone(),
            base,
            channel: credentials.channel,
            instance: credentials.instance.clone(),
        })
    }

    /// Create a client and check that the gateway accepts the token.
    pub async fn connect(credentials: &Credentials) -> GatewayResult<Self> {
        let client = Self::new(credentials)?;
        client.verify_token().await?;
        Ok(client)
    }

    /// Gateway base URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Build `{host}/api/v1/<segments>/` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> GatewayResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(self.host.clone()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    /// Check that the gateway accepts the configured token.
    pub async fn verify_token(&self) -> GatewayResult<()> {
        let url = self.endpoint(&["programs"])?;
        tracing::debug!("verifying token against {url}");
        let response = self.client.get(url).send().await?;
        check(response, "token verification").await?;
        Ok(())
    }

    /// List functions (raw gateway objects).
    pub async fn list_programs(
        &self,
        query: &FunctionQuery,
    ) -> GatewayResult<Vec<serde_json::Value>> {
        let url = self.endpoint(&["programs"])?;
        tracing::debug!("GET {url}");

        let response = self.client.get(url).query(query).send().await?;
        let response = check(response, "list functions").await?;
        let listing: Listing<serde_json::Value> = response.json().await?;
        Ok(listing.into_items())
    }

    /// Look up a function by title. `None` when the gateway answers 404.
    pub async fn get_program_by_title(
        &self,
        title: &str,
        provider: Option<&str>,
    ) -> GatewayResult<Option<serde_json::Value>> {
        let url = self.endpoint(&["programs", "get_by_title", title])?;
        tracing::debug!("GET {url}");

        let mut request = self.client.get(url);
        if let Some(provider) = provider {
            request = request.query(&[("provider", provider)]);
        }
        let response = request.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check(response, "load function").await?;
        Ok(Some(response.json().await?))
    }

    /// Start a job.
    ///
    /// Arguments travel as JSON text inside the JSON body, the way the
    /// gateway stores them.
    pub async fn run_program(
        &self,
        title: &str,
        provider: Option<&str>,
        arguments: &serde_json::Map<String, serde_json::Value>,
        config: Option<&RunConfig>,
    ) -> GatewayResult<RunResponse> {
        let url = self.endpoint(&["programs", "run"])?;
        tracing::debug!("POST {url}");

        let body = RunRequest {
            title,
            provider,
            arguments: serde_json::to_string(arguments)?,
            config: config.cloned().unwrap_or_default(),
        };

        let response = self.client.post(url).json(&body).send().await?;
        let response = check(response, "job submission").await?;
        response.json().await.map_err(GatewayError::from)
    }

    /// Upload a function definition as a multipart form.
    pub async fn upload_program(&self, upload: &FunctionUpload) -> GatewayResult<serde_json::Value> {
        let url = self.endpoint(&["programs", "upload"])?;
        tracing::debug!("POST {url}");

        let mut form = multipart::Form::new()
            .text("title", upload.title.clone())
            .text("dependencies", serde_json::to_string(&upload.dependencies)?)
            .text("env_vars", serde_json::to_string(&upload.env_vars)?);

        if let Some(provider) = &upload.provider {
            form = form.text("provider", provider.clone());
        }
        if let Some(description) = &upload.description {
            form = form.text("description", description.clone());
        }
        if let Some(image) = &upload.image {
            form = form.text("image", image.clone());
        }
        if let Some(entrypoint) = &upload.entrypoint {
            form = form.text("entrypoint", entrypoint.clone());
        }
        if let Some(artifact) = &upload.artifact {
            form = form.part("artifact", file_part(artifact).await?);
        }

        let response = self.client.post(url).multipart(form).send().await?;
        let response = check(response, "function upload").await?;
        Ok(response.json().await?)
    }

    /// List jobs.
    pub async fn list_jobs(&self, query: &JobQuery) -> GatewayResult<Vec<JobResponse>> {
        let url = self.endpoint(&["jobs"])?;
        tracing::debug!("GET {url}");

        let response = self.client.get(url).query(query).send().await?;
        let response = check(response, "list jobs").await?;
        let listing: Listing<JobResponse> = response.json().await?;
        Ok(listing.into_items())
    }

    /// Fetch a job with its stored result. `None` when the gateway answers 404.
    pub async fn get_job(&self, job_id: &str) -> GatewayResult<Option<JobResponse>> {
        let url = self.endpoint(&["jobs", job_id])?;
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .query(&[("with_result", "true")])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check(response, "job lookup").await?;
        Ok(Some(response.json().await?))
    }

    /// Fetch the log text of a job.
    pub async fn job_logs(&self, job_id: &str) -> GatewayResult<String> {
        let url = self.endpoint(&["jobs", job_id, "logs"])?;
        tracing::debug!("GET {url}");

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::JobNotFound(job_id.to_string()));
        }
        let response = check(response, "job logs").await?;
        let logs: LogsResponse = response.json().await?;
        Ok(logs.logs)
    }

    /// Ask the gateway to stop a job.
    pub async fn stop_job(&self, job_id: &str) -> GatewayResult<String> {
        let url = self.endpoint(&["jobs", job_id, "stop"])?;
        tracing::debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::JobNotFound(job_id.to_string()));
        }
        let response = check(response, "stop job").await?;
        let body: MessageResponse = response.json().await?;
        Ok(body.message.unwrap_or_default())
    }

    /// List file names in a function folder.
    pub async fn list_files(
        &self,
        scope: FileScope,
        title: &str,
        provider: Option<&str>,
    ) -> GatewayResult<Vec<String>> {
        let url = self.endpoint(scope.path_segments())?;
        tracing::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .query(&function_params(title, provider))
            .send()
            .await?;
        let response = check(response, "list files").await?;
        let listing: Listing<String> = response.json().await?;
        Ok(listing.into_items())
    }

    /// Stream a file from a function folder to `destination`.
    pub async fn download_file(
        &self,
        scope: FileScope,
        file: &str,
        title: &str,
        provider: Option<&str>,
        destination: &Path,
    ) -> GatewayResult<PathBuf> {
        let url = self.endpoint(&scoped(scope, "download"))?;
        tracing::debug!("GET {url}");

        let mut params = function_params(title, provider);
        params.push(("file", file));

        let response = self.client.get(url).query(&params).send().await?;
        let response = check(response, "file download").await?;

        let parent = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&parent).await?;

        // Stream into a sibling temp file; it is removed on drop if anything fails.
        let partial = tempfile::Builder::new()
            .prefix(".qfc-download-")
            .tempfile_in(&parent)?;
        let mut out = tokio::fs::File::from_std(partial.reopen()?);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            out.write_all(&chunk).await?;
        }
        out.flush().await?;
        drop(out);
        partial
            .persist(destination)
            .map_err(|e| GatewayError::IoError(e.error))?;

        tracing::info!("downloaded {file} ({written} bytes) to {}", destination.display());
        Ok(destination.to_path_buf())
    }

    /// Delete a file from a function folder.
    pub async fn delete_file(
        &self,
        scope: FileScope,
        file: &str,
        title: &str,
        provider: Option<&str>,
    ) -> GatewayResult<String> {
        let url = self.endpoint(&scoped(scope, "delete"))?;
        tracing::debug!("DELETE {url}");

        let mut params = function_params(title, provider);
        params.push(("file", file));

        let response = self.client.delete(url).query(&params).send().await?;
        let response = check(response, "file delete").await?;
        Ok(message_or_empty(response).await)
    }

    /// Upload a local file into a function folder.
    pub async fn upload_file(
        &self,
        scope: FileScope,
        path: &Path,
        title: &str,
        provider: Option<&str>,
    ) -> GatewayResult<String> {
        let url = self.endpoint(&scoped(scope, "upload"))?;
        tracing::debug!("POST {url}");

        let form = multipart::Form::new().part("file", file_part(path).await?);
        let response = self
            .client
            .post(url)
            .query(&function_params(title, provider))
            .multipart(form)
            .send()
            .await?;
        let response = check(response, "file upload").await?;
        Ok(message_or_empty(response).await)
    }
}

/// Turn a non-success response into an error.
async fn check(response: Response, action: &str) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body, status);
    tracing::debug!("{action} returned {status}: {message}");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(GatewayError::Unauthorized(message));
    }
    Err(GatewayError::ApiError {
        status: status.as_u16(),
        message: format!("{action} failed: {message}"),
    })
}

/// Pick the `message` or `detail` field of an error body, else the raw text.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(body) {
        if let Some(message) = parsed.message.or(parsed.detail) {
            return message;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status.canonical_reason().unwrap_or("no body").to_string()
    } else {
        trimmed.to_string()
    }
}

/// Body `message` of a success response, or an empty string.
async fn message_or_empty(response: Response) -> String {
    response
        .json::<MessageResponse>()
        .await
        .ok()
        .and_then(|m| m.message)
        .unwrap_or_default()
}

fn function_params<'a>(title: &'a str, provider: Option<&'a str>) -> Vec<(&'static str, &'a str)> {
    let mut params = vec![("function", title)];
    if let Some(provider) = provider {
        params.push(("provider", provider));
    }
    params
}

fn scoped(scope: FileScope, action: &'static str) -> Vec<&'static str> {
    let mut segments = scope.path_segments().to_vec();
    segments.push(action);
    segments
}

async fn file_part(path: &Path) -> GatewayResult<multipart::Part> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(multipart::Part::bytes(bytes).file_name(name))
}

// ============================================================================
// Request types
// ============================================================================

/// Run request body.
#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    /// Function title.
    title: &'a str,
    /// Function provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    provider: Option<&'a str>,
    /// JSON-encoded argument object.
    arguments: String,
    /// Worker configuration.
    config: RunConfig,
}

// ============================================================================
// Response types
// ============================================================================

/// A list endpoint answers either with a bare array or a paginated page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> Listing<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Paged { results: items } => items,
        }
    }
}

/// API error body.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Body carrying only a message.
#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Logs body.
#[derive(Debug, Deserialize)]
struct LogsResponse {
    #[serde(default)]
    logs: String,
}

/// Run response.
#[derive(Debug, Clone, Deserialize)]
pub struct RunResponse {
    /// New job ID.
    pub id: String,
}

/// Job object as returned by `jobs/` endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct JobResponse {
    /// Job ID.
    pub id: String,
    /// Gateway status (`QUEUED`, `PENDING`, `RUNNING`, `SUCCEEDED`, `FAILED`, `STOPPED`).
    pub status: String,
    /// Finer-grained running phase.
    #[serde(default)]
    pub sub_status: Option<String>,
    /// Stored result: usually JSON text, sometimes an inline object.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    /// Function the job runs (object with `title`/`provider`).
    #[serde(default)]
    pub program: Option<serde_json::Value>,
    /// Creation time (RFC 3339).
    #[serde(default)]
    pub created: Option<String>,
}

impl JobResponse {
    /// Result as text, `None` when absent or null.
    pub fn result_text(&self) -> Option<String> {
        match &self.result {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(text)) => Some(text.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    /// Title and provider of the job's function, when reported.
    pub fn function(&self) -> (Option<String>, Option<String>) {
        let field = |key: &str| {
            self.program
                .as_ref()
                .and_then(|p| p.get(key))
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        };
        (field("title"), field("provider"))
    }
}
