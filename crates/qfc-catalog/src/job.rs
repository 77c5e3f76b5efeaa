//! Job handle.
//!
//! A [`Job`] is returned by [`Function::run`](crate::Function::run) and by
//! the job listing/lookup operations of the facades. It keeps the last
//! snapshot the gateway reported and refreshes it on demand.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use qfc_core::{CatalogError, CatalogResult, Gateway, JobId, JobInfo, JobStatus};
use serde::de::DeserializeOwned;
use tokio::time::{Instant, sleep};

/// Default interval between status polls while waiting for a result.
pub const DEFAULT_CADENCE: Duration = Duration::from_secs(5);

/// Shortest interval between status polls. Smaller cadences are raised to it.
pub const MIN_CADENCE: Duration = Duration::from_millis(100);

/// How [`Job::result_with`] waits for a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultOptions {
    /// Interval between status polls. Polling uses at least [`MIN_CADENCE`].
    pub cadence: Duration,
    /// Give up after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ResultOptions {
    fn default() -> Self {
        Self {
            cadence: DEFAULT_CADENCE,
            timeout: None,
        }
    }
}

impl ResultOptions {
    /// Set the poll interval.
    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    /// Set the overall timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Handle to a remote job.
#[derive(Clone)]
pub struct Job {
    info: JobInfo,
    gateway: Arc<dyn Gateway>,
}

impl Job {
    /// Handle for a job that was just submitted.
    pub(crate) fn submitted(id: JobId, gateway: Arc<dyn Gateway>) -> Self {
        Self::from_info(JobInfo::new(id, JobStatus::Queued), gateway)
    }

    pub(crate) fn from_info(info: JobInfo, gateway: Arc<dyn Gateway>) -> Self {
        Self { info, gateway }
    }

    /// Job identifier.
    pub fn id(&self) -> &JobId {
        &self.info.id
    }

    /// Last snapshot received from the gateway. Not refreshed automatically.
    pub fn info(&self) -> &JobInfo {
        &self.info
    }

    /// Fetch a fresh snapshot.
    pub async fn refresh(&mut self) -> CatalogResult<&JobInfo> {
        self.info = self.fetch().await?;
        Ok(&self.info)
    }

    /// Fetch the current status.
    pub async fn status(&self) -> CatalogResult<JobStatus> {
        self.gateway.job_status(&self.info.id).await
    }

    /// Whether the job has finished, failed or been stopped.
    pub async fn in_terminal_state(&self) -> CatalogResult<bool> {
        Ok(self.status().await?.is_terminal())
    }

    /// Fetch the job's log text.
    pub async fn logs(&self) -> CatalogResult<String> {
        self.gateway.job_logs(&self.info.id).await
    }

    /// Ask the gateway to stop the job. Returns the gateway's message.
    pub async fn stop(&self) -> CatalogResult<String> {
        let message = self.gateway.stop_job(&self.info.id).await?;
        tracing::info!("stop requested for job {}: {message}", self.info.id);
        Ok(message)
    }

    /// Wait for the job with [`ResultOptions::default`] and return its result.
    pub async fn result(&self) -> CatalogResult<serde_json::Value> {
        self.result_with(ResultOptions::default()).await
    }

    /// Wait for the job and decode its result into `T`.
    pub async fn result_as<T: DeserializeOwned>(&self) -> CatalogResult<T> {
        Ok(serde_json::from_value(self.result().await?)?)
    }

    /// Wait for a terminal state and return the decoded result.
    ///
    /// A finished job yields its stored result parsed as JSON. Text that
    /// is not JSON comes back as a JSON string and an empty result as
    /// `null`. Failed jobs yield [`CatalogError::JobFailed`] and stopped
    /// ones [`CatalogError::JobCanceled`].
    pub async fn result_with(&self, options: ResultOptions) -> CatalogResult<serde_json::Value> {
        self.result_with_progress(options, |_| {}).await
    }

    /// Like [`Job::result_with`], calling `progress` with every snapshot polled.
    pub async fn result_with_progress<F>(
        &self,
        options: ResultOptions,
        progress: F,
    ) -> CatalogResult<serde_json::Value>
    where
        F: FnMut(&JobInfo),
    {
        let info = self.wait_with_progress(options, progress).await?;
        match info.status {
            JobStatus::Done => Ok(decode_result(info.result.as_deref())),
            JobStatus::Canceled => Err(CatalogError::JobCanceled(info.id.to_string())),
            _ => Err(CatalogError::JobFailed(
                info.result
                    .filter(|text| !text.trim().is_empty())
                    .unwrap_or_else(|| format!("job {} failed", info.id)),
            )),
        }
    }

    /// Poll until the job reaches a terminal state.
    pub async fn wait(&self, options: ResultOptions) -> CatalogResult<JobInfo> {
        self.wait_with_progress(options, |_| {}).await
    }

    /// Poll until the job reaches a terminal state, calling `progress`
    /// with every snapshot.
    ///
    /// Polls are `options.cadence` apart (at least [`MIN_CADENCE`]); the
    /// last poll before a timeout happens when the timeout expires.
    pub async fn wait_with_progress<F>(
        &self,
        options: ResultOptions,
        mut progress: F,
    ) -> CatalogResult<JobInfo>
    where
        F: FnMut(&JobInfo),
    {
        let cadence = options.cadence.max(MIN_CADENCE);
        let started = Instant::now();
        let mut last_status: Option<JobStatus> = None;

        loop {
            let info = self.fetch().await?;
            progress(&info);
            if info.status.is_terminal() {
                return Ok(info);
            }
            if last_status.as_ref() != Some(&info.status) {
                tracing::debug!("job {} is {}", info.id, info.status);
                last_status = Some(info.status.clone());
            }

            let pause = match options.timeout {
                Some(timeout) => {
                    let elapsed = started.elapsed();
                    if elapsed >= timeout {
                        return Err(CatalogError::Timeout(info.id.to_string()));
                    }
                    cadence.min(timeout - elapsed)
                }
                None => cadence,
            };
            sleep(pause).await;
        }
    }

    async fn fetch(&self) -> CatalogResult<JobInfo> {
        self.gateway
            .get_job(&self.info.id)
            .await?
            .ok_or_else(|| CatalogError::JobNotFound(self.info.id.to_string()))
    }
}

/// Parse a stored result.
fn decode_result(text: Option<&str>) -> serde_json::Value {
    match text.map(str::trim) {
        None | Some("") => serde_json::Value::Null,
        Some(text) => serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("info", &self.info)
            .field("gateway", &self.gateway.host())
            .finish()
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Job | {}>", self.info.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingGateway;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn snapshot(status: JobStatus, result: Option<&str>) -> JobInfo {
        let mut info = JobInfo::new("j1", status);
        info.result = result.map(str::to_string);
        info
    }

    fn job(gateway: &Arc<RecordingGateway>) -> Job {
        Job::submitted(JobId::new("j1"), gateway.clone())
    }

    #[test]
    fn test_decode_result() {
        assert_eq!(decode_result(None), serde_json::Value::Null);
        assert_eq!(decode_result(Some("  ")), serde_json::Value::Null);
        assert_eq!(decode_result(Some(r#"{"a": [1, 2]}"#)), json!({"a": [1, 2]}));
        assert_eq!(decode_result(Some("plain text")), json!("plain text"));
    }

    #[test]
    fn test_result_options() {
        let options = ResultOptions::default();
        assert_eq!(options.cadence, Duration::from_secs(5));
        assert!(options.timeout.is_none());

        let options = options
            .with_cadence(Duration::from_millis(10))
            .with_timeout(Duration::from_secs(1));
        assert_eq!(options.cadence, Duration::from_millis(10));
        assert_eq!(options.timeout, Some(Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_polls_until_done() {
        let gateway = Arc::new(RecordingGateway::with_job_script(vec![
            snapshot(JobStatus::Queued, None),
            snapshot(JobStatus::Running(Some("WAITING_QPU".into())), None),
            snapshot(JobStatus::Done, Some(r#"{"energy": -1.25}"#)),
        ]));

        let result = job(&gateway).result().await.unwrap();
        assert_eq!(result, json!({"energy": -1.25}));
        assert_eq!(gateway.get_job_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_as_struct() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Energy {
            energy: f64,
        }

        let gateway = Arc::new(RecordingGateway::with_job_script(vec![snapshot(
            JobStatus::Done,
            Some(r#"{"energy": 0.5}"#),
        )]));
        let energy: Energy = job(&gateway).result_as().await.unwrap();
        assert_eq!(energy, Energy { energy: 0.5 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_failed_job() {
        let gateway = Arc::new(RecordingGateway::with_job_script(vec![snapshot(
            JobStatus::Error,
            Some("Traceback: division by zero"),
        )]));
        let err = job(&gateway).result().await.unwrap_err();
        assert!(matches!(err, CatalogError::JobFailed(msg) if msg.contains("division by zero")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_failed_job_without_message() {
        let gateway = Arc::new(RecordingGateway::with_job_script(vec![snapshot(
            JobStatus::Error,
            None,
        )]));
        let err = job(&gateway).result().await.unwrap_err();
        assert!(matches!(err, CatalogError::JobFailed(msg) if msg == "job j1 failed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_canceled_job() {
        let gateway = Arc::new(RecordingGateway::with_job_script(vec![snapshot(
            JobStatus::Canceled,
            None,
        )]));
        let err = job(&gateway).result().await.unwrap_err();
        assert!(matches!(err, CatalogError::JobCanceled(id) if id == "j1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_timeout() {
        let gateway = Arc::new(RecordingGateway::with_job_script(vec![snapshot(
            JobStatus::Running(None),
            None,
        )]));
        let options = ResultOptions::default().with_timeout(Duration::from_secs(12));
        let started = Instant::now();
        let err = job(&gateway).result_with(options).await.unwrap_err();
        assert!(matches!(err, CatalogError::Timeout(id) if id == "j1"));
        // Polls at 0s, 5s, 10s and when the timeout expires at 12s.
        assert_eq!(started.elapsed(), Duration::from_secs(12));
        assert_eq!(gateway.get_job_calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_cadence_is_raised_to_minimum() {
        let gateway = Arc::new(RecordingGateway::with_job_script(vec![snapshot(
            JobStatus::Queued,
            None,
        )]));
        let options = ResultOptions::default()
            .with_cadence(Duration::ZERO)
            .with_timeout(Duration::from_secs(1));
        let err = job(&gateway).wait(options).await.unwrap_err();
        assert!(matches!(err, CatalogError::Timeout(_)));
        // One poll every 100ms from 0s to 1s inclusive.
        assert_eq!(gateway.get_job_calls.load(Ordering::SeqCst), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_sees_every_poll() {
        let gateway = Arc::new(RecordingGateway::with_job_script(vec![
            snapshot(JobStatus::Queued, None),
            snapshot(JobStatus::Running(None), None),
            snapshot(JobStatus::Done, Some("42")),
        ]));

        let mut seen = Vec::new();
        let result = job(&gateway)
            .result_with_progress(ResultOptions::default(), |info| {
                seen.push(info.status.clone())
            })
            .await
            .unwrap();
        assert_eq!(result, json!(42));
        assert_eq!(
            seen,
            vec![JobStatus::Queued, JobStatus::Running(None), JobStatus::Done]
        );
        assert_eq!(gateway.get_job_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unknown_job() {
        let gateway = Arc::new(RecordingGateway::default());
        let err = job(&gateway).status().await.unwrap_err();
        assert!(matches!(err, CatalogError::JobNotFound(id) if id == "j1"));
    }

    #[tokio::test]
    async fn test_status_logs_stop() {
        let gateway = Arc::new(RecordingGateway::with_job_script(vec![snapshot(
            JobStatus::Done,
            None,
        )]));
        let mut job = job(&gateway);
        assert_eq!(job.info().status, JobStatus::Queued);

        assert_eq!(job.status().await.unwrap(), JobStatus::Done);
        assert!(job.in_terminal_state().await.unwrap());
        assert_eq!(job.logs().await.unwrap(), "logs of j1");
        assert_eq!(job.stop().await.unwrap(), "stopped j1");

        job.refresh().await.unwrap();
        assert_eq!(job.info().status, JobStatus::Done);
        assert_eq!(job.to_string(), "<Job | j1>");
    }
}
