//! File commands for serverless functions.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use console::style;

use qfc_catalog::{Function, QiskitServerless};

use super::common::Connection;

/// Selects the function folder a file command works on.
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Function provider
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Use the provider's folder instead of your own
    #[arg(long)]
    pub provider_scope: bool,
}

async fn open(
    conn: &Connection,
    title: &str,
    scope: &ScopeArgs,
) -> Result<(QiskitServerless, Function)> {
    let serverless = conn.open_serverless().await?;
    let function = serverless
        .load(title, scope.provider.as_deref())
        .await?
        .ok_or_else(|| anyhow::anyhow!("Function not found: {title}"))?;
    Ok((serverless, function))
}

/// Execute the files command.
pub async fn execute_list(conn: &Connection, title: &str, scope: &ScopeArgs) -> Result<()> {
    let (serverless, function) = open(conn, title, scope).await?;
    let files = if scope.provider_scope {
        serverless.provider_files(&function).await?
    } else {
        serverless.files(&function).await?
    };

    if files.is_empty() {
        println!("No files for {}.", function.info().display_name());
        return Ok(());
    }
    println!("{} {} file(s):", style("→").cyan().bold(), files.len());
    for file in &files {
        println!("  {file}");
    }
    Ok(())
}

/// Execute the download command.
pub async fn execute_download(
    conn: &Connection,
    file: &str,
    title: &str,
    scope: &ScopeArgs,
    target_name: Option<&str>,
    location: &Path,
) -> Result<()> {
    let (serverless, function) = open(conn, title, scope).await?;
    let path = if scope.provider_scope {
        serverless
            .provider_file_download(file, &function, target_name, location)
            .await?
    } else {
        serverless
            .file_download(file, &function, target_name, location)
            .await?
    };
    println!(
        "{} Downloaded {} to {}",
        style("✓").green().bold(),
        style(file).cyan(),
        style(path.display()).dim()
    );
    Ok(())
}

/// Execute the delete command.
pub async fn execute_delete(
    conn: &Connection,
    file: &str,
    title: &str,
    scope: &ScopeArgs,
) -> Result<()> {
    let (serverless, function) = open(conn, title, scope).await?;
    let message = if scope.provider_scope {
        serverless.provider_file_delete(file, &function).await?
    } else {
        serverless.file_delete(file, &function).await?
    };
    println!("{} Deleted {} {}", style("✓").green().bold(), style(file).cyan(), message);
    Ok(())
}

/// Execute the upload command.
pub async fn execute_upload(
    conn: &Connection,
    path: &Path,
    title: &str,
    scope: &ScopeArgs,
) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("File not found: {}", path.display());
    }
    let (serverless, function) = open(conn, title, scope).await?;
    let message = if scope.provider_scope {
        serverless.provider_file_upload(path, &function).await?
    } else {
        serverless.file_upload(path, &function).await?
    };
    println!(
        "{} Uploaded {} {}",
        style("✓").green().bold(),
        style(path.display()).cyan(),
        message
    );
    Ok(())
}
