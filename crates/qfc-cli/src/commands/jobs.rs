//! Job commands: list, status, logs, result and stop.

use std::time::Duration;

use anyhow::Result;
use console::style;

use qfc_catalog::JobQuery;

use super::common::{Connection, print_result, style_status};
use super::wait::wait_for_result;

/// Execute the jobs command.
pub async fn execute_list(
    conn: &Connection,
    limit: u32,
    offset: Option<u32>,
    status: Option<String>,
    function: Option<String>,
) -> Result<()> {
    let mut query = JobQuery::new().with_limit(limit);
    query.offset = offset;
    query.status = status;
    query.function = function;

    let session = conn.open().await?;
    let jobs = session.jobs(query).await?;

    if jobs.is_empty() {
        println!("No jobs found.");
        return Ok(());
    }

    println!("{} {} job(s):\n", style("→").cyan().bold(), jobs.len());
    println!(
        "  {:<38}  {:<30}  {:<24}  {}",
        style("JOB ID").bold(),
        style("FUNCTION").bold(),
        style("STATUS").bold(),
        style("CREATED").bold()
    );
    println!("  {}", "-".repeat(110));

    for job in &jobs {
        let info = job.info();
        println!(
            "  {:<38}  {:<30}  {:<24}  {}",
            style(&info.id).dim(),
            info.function.as_deref().unwrap_or("-"),
            style_status(&info.status),
            info.created
                .map(|c| c.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}

/// Execute the status command.
pub async fn execute_status(conn: &Connection, job_id: &str) -> Result<()> {
    let session = conn.open().await?;
    let job = session.job(job_id).await?;
    let info = job.info();

    println!("{} Job {}", style("→").cyan().bold(), style(&info.id).yellow());
    println!("  Status:   {}", style_status(&info.status));
    if let Some(function) = &info.function {
        match &info.provider {
            Some(provider) => println!("  Function: {provider}/{function}"),
            None => println!("  Function: {function}"),
        }
    }
    if let Some(created) = info.created {
        println!("  Created:  {}", created.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}

/// Execute the logs command.
pub async fn execute_logs(conn: &Connection, job_id: &str) -> Result<()> {
    let session = conn.open().await?;
    let job = session.job(job_id).await?;
    let logs = job.logs().await?;

    if logs.trim().is_empty() {
        println!("No logs for job {job_id}.");
    } else {
        print!("{logs}");
        if !logs.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}

/// Execute the result command.
pub async fn execute_result(
    conn: &Connection,
    job_id: &str,
    timeout: Option<u64>,
    cadence: u64,
) -> Result<()> {
    let session = conn.open().await?;
    let job = session.job(job_id).await?;
    let result = wait_for_result(&job, timeout, Duration::from_secs(cadence.max(1))).await?;
    print_result(&result)
}

/// Execute the stop command.
pub async fn execute_stop(conn: &Connection, job_id: &str) -> Result<()> {
    let session = conn.open().await?;
    let job = session.job(job_id).await?;

    if job.info().status.is_terminal() {
        println!(
            "{} Job {} already finished ({})",
            style("!").yellow().bold(),
            style(job_id).dim(),
            style_status(&job.info().status)
        );
        return Ok(());
    }

    let message = job.stop().await?;
    println!("{} {}", style("✓").green().bold(), message);
    Ok(())
}
