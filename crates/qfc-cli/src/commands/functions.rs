//! Function commands: list, show, run and publish.

use std::path::{Path, PathBuf};

use anyhow::Result;
use console::style;

use qfc_catalog::{DEFAULT_CADENCE, FunctionUpload, RunConfig};

use super::common::{Connection, parse_arguments, parse_env_var, print_result};
use super::wait::wait_for_result;

/// Execute the list command.
pub async fn execute_list(conn: &Connection) -> Result<()> {
    let session = conn.open().await?;
    let functions = session.list().await?;

    if functions.is_empty() {
        println!("No functions available.");
        return Ok(());
    }

    println!("{} {} function(s):\n", style("→").cyan().bold(), functions.len());
    println!(
        "  {:<40}  {:<20}  {}",
        style("TITLE").bold(),
        style("PROVIDER").bold(),
        style("DESCRIPTION").bold()
    );
    println!("  {}", "-".repeat(90));

    for function in &functions {
        println!(
            "  {:<40}  {:<20}  {}",
            style(function.title()).cyan(),
            function.provider().unwrap_or("-"),
            function
                .description()
                .map(first_line)
                .unwrap_or_default()
        );
    }
    Ok(())
}

/// Execute the show command.
pub async fn execute_show(conn: &Connection, title: &str, provider: Option<&str>) -> Result<()> {
    let session = conn.open().await?;
    let function = session.load(title, provider).await?;
    let info = function.info();

    println!("{} {}", style("→").cyan().bold(), style(info.display_name()).cyan().bold());
    if let Some(function_type) = &info.function_type {
        println!("  Type:        {function_type}");
    }
    if let Some(version) = &info.version {
        println!("  Version:     {version}");
    }
    if let Some(description) = &info.description {
        println!("  Description: {description}");
    }
    if !info.raw.is_null() {
        println!("\n{}", serde_json::to_string_pretty(&info.raw)?);
    }
    Ok(())
}

/// Execute the run command.
#[allow(clippy::too_many_arguments)]
pub async fn execute_run(
    conn: &Connection,
    title: &str,
    provider: Option<&str>,
    args: Option<&str>,
    args_file: Option<&Path>,
    workers: Option<u32>,
    wait: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let arguments = parse_arguments(args, args_file)?;
    let config = workers.map(|workers| RunConfig {
        workers: Some(workers),
        ..RunConfig::default()
    });

    let session = conn.open().await?;
    let function = session.load(title, provider).await?;

    println!(
        "{} Running {} with {} argument(s)",
        style("→").cyan().bold(),
        style(function.info().display_name()).cyan(),
        arguments.len()
    );

    let job = function.run(&arguments, config.as_ref()).await?;
    println!("{} Submitted job {}", style("✓").green().bold(), style(job.id()).yellow());

    if !wait {
        println!("  Use 'qfc result {}' to fetch the result.", job.id());
        return Ok(());
    }

    let result = wait_for_result(&job, timeout, DEFAULT_CADENCE).await?;
    print_result(&result)
}

/// Arguments of the publish command.
pub struct PublishArgs {
    pub title: String,
    pub image: Option<String>,
    pub entrypoint: Option<String>,
    pub artifact: Option<PathBuf>,
    pub provider: Option<String>,
    pub description: Option<String>,
    pub dependencies: Vec<String>,
    pub env_vars: Vec<String>,
}

impl PublishArgs {
    fn into_upload(self) -> Result<FunctionUpload> {
        let mut upload = FunctionUpload {
            title: self.title,
            provider: self.provider,
            description: self.description,
            image: self.image,
            entrypoint: self.entrypoint,
            artifact: self.artifact,
            dependencies: self.dependencies,
            ..FunctionUpload::default()
        };
        for pair in &self.env_vars {
            let (key, value) = parse_env_var(pair)?;
            upload.env_vars.insert(key, value);
        }
        upload.validate()?;
        Ok(upload)
    }
}

/// Execute the publish command.
pub async fn execute_publish(conn: &Connection, args: PublishArgs) -> Result<()> {
    let upload = args.into_upload()?;
    let serverless = conn.open_serverless().await?;

    println!(
        "{} Uploading {}",
        style("→").cyan().bold(),
        style(&upload.title).cyan()
    );
    let function = serverless.upload(&upload).await?;
    println!(
        "{} Published {}",
        style("✓").green().bold(),
        style(function.info().display_name()).cyan().bold()
    );
    Ok(())
}

/// First line of a possibly multi-line description.
fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publish_args() -> PublishArgs {
        PublishArgs {
            title: "my-func".into(),
            image: Some("icr.io/acme/my-func:1".into()),
            entrypoint: None,
            artifact: None,
            provider: Some("acme".into()),
            description: None,
            dependencies: vec!["numpy>=1.26".into()],
            env_vars: vec!["LOG_LEVEL=debug".into()],
        }
    }

    #[test]
    fn test_publish_args_into_upload() {
        let upload = publish_args().into_upload().unwrap();
        assert_eq!(upload.title, "my-func");
        assert_eq!(upload.provider.as_deref(), Some("acme"));
        assert_eq!(upload.dependencies, vec!["numpy>=1.26"]);
        assert_eq!(upload.env_vars.get("LOG_LEVEL").map(String::as_str), Some("debug"));
    }

    #[test]
    fn test_publish_args_invalid() {
        let mut args = publish_args();
        args.image = None;
        assert!(args.into_upload().is_err());

        let mut args = publish_args();
        args.env_vars = vec!["broken".into()];
        assert!(args.into_upload().is_err());
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("Simulates Hamiltonians\nMore text"), "Simulates Hamiltonians");
        assert_eq!(first_line(""), "");
    }
}
