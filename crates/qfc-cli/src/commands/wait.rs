//! Wait for a job with a progress spinner.

use std::time::Duration;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qfc_catalog::{CatalogError, Job, ResultOptions};

/// Poll `job` until it reaches a terminal state, then return its result.
pub async fn wait_for_result(
    job: &Job,
    timeout: Option<u64>,
    cadence: Duration,
) -> Result<serde_json::Value> {
    println!(
        "{} Waiting for job {}{}",
        style("→").cyan().bold(),
        style(job.id()).dim(),
        timeout.map(|t| format!(" (timeout: {t}s)")).unwrap_or_default()
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message("Waiting for job to complete...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut options = ResultOptions::default().with_cadence(cadence);
    if let Some(timeout) = timeout {
        options = options.with_timeout(Duration::from_secs(timeout));
    }

    let mut last_status = None;
    let outcome = job
        .result_with_progress(options, |info| {
            spinner.set_message(format!("Status: {} ...", info.status));
            last_status = Some(info.status.clone());
        })
        .await;
    spinner.finish_and_clear();

    match outcome {
        Ok(value) => Ok(value),
        Err(CatalogError::JobFailed(message)) => {
            anyhow::bail!("Job {} failed:\n{message}", job.id())
        }
        Err(CatalogError::Timeout(_)) => {
            let status = last_status
                .map(|status| status.to_string())
                .unwrap_or_else(|| "pending".to_string());
            anyhow::bail!(
                "Timeout after {}s. Job {} is still {status}. Use 'qfc result {}' to check later.",
                timeout.unwrap_or_default(),
                job.id(),
                job.id()
            )
        }
        Err(e) => Err(e.into()),
    }
}
