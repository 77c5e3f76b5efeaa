//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use console::{StyledObject, style};

use qfc_catalog::{Function, Job, JobQuery, JobStatus, QiskitFunctionsCatalog, QiskitServerless};

/// Connection options shared by every remote command.
#[derive(Clone, Default)]
pub struct Connection {
    pub token: Option<String>,
    pub account: Option<String>,
    pub serverless: bool,
}

/// Either facade, chosen by `--serverless`.
pub enum Session {
    Catalog(QiskitFunctionsCatalog),
    Serverless(QiskitServerless),
}

impl Connection {
    /// Open the facade selected by `--serverless`.
    pub async fn open(&self) -> Result<Session> {
        if self.serverless {
            return Ok(Session::Serverless(self.open_serverless().await?));
        }
        let catalog =
            QiskitFunctionsCatalog::new(self.token.as_deref(), self.account.as_deref())
                .await
                .context("Failed to connect to the functions catalog")?;
        Ok(Session::Catalog(catalog))
    }

    /// Open the serverless facade regardless of `--serverless`.
    pub async fn open_serverless(&self) -> Result<QiskitServerless> {
        QiskitServerless::new(self.token.as_deref(), self.account.as_deref())
            .await
            .context("Failed to connect to Qiskit Serverless")
    }
}

impl Session {
    pub async fn list(&self) -> Result<Vec<Function>> {
        Ok(match self {
            Session::Catalog(c) => c.list().await?,
            Session::Serverless(s) => s.list().await?,
        })
    }

    pub async fn load(&self, title: &str, provider: Option<&str>) -> Result<Function> {
        let function = match self {
            Session::Catalog(c) => c.load(title, provider).await?,
            Session::Serverless(s) => s.load(title, provider).await?,
        };
        function.ok_or_else(|| match provider {
            Some(provider) => anyhow::anyhow!("Function not found: {provider}/{title}"),
            None => anyhow::anyhow!("Function not found: {title}"),
        })
    }

    pub async fn jobs(&self, query: JobQuery) -> Result<Vec<Job>> {
        Ok(match self {
            Session::Catalog(c) => c.jobs(query).await?,
            Session::Serverless(s) => s.jobs(query).await?,
        })
    }

    pub async fn job(&self, job_id: &str) -> Result<Job> {
        let job = match self {
            Session::Catalog(c) => c.get_job_by_id(job_id).await?,
            Session::Serverless(s) => s.job(job_id).await?,
        };
        job.ok_or_else(|| anyhow::anyhow!("Job not found: {job_id}"))
    }
}

/// Parse run arguments from inline JSON or a JSON file.
///
/// No arguments at all is an empty object.
pub fn parse_arguments(
    inline: Option<&str>,
    file: Option<&Path>,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let source = match (inline, file) {
        (Some(inline), _) => inline.to_string(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read arguments file: {}", path.display()))?,
        (None, None) => return Ok(serde_json::Map::new()),
    };

    let value: serde_json::Value =
        serde_json::from_str(&source).context("Arguments are not valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Arguments must be a JSON object, e.g. '{{\"circuit\": \"...\"}}'"),
    }
}

/// Parse a `KEY=VALUE` pair.
pub fn parse_env_var(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => anyhow::bail!("Invalid environment variable '{pair}', expected KEY=VALUE"),
    }
}

/// Colour a job status for terminal output.
pub fn style_status(status: &JobStatus) -> StyledObject<String> {
    let text = status.to_string();
    match status {
        JobStatus::Done => style(text).green(),
        JobStatus::Error | JobStatus::Canceled => style(text).red(),
        JobStatus::Queued | JobStatus::Initializing => style(text).yellow(),
        _ => style(text).cyan(),
    }
}

/// An error with its full chain of causes, outermost first.
pub fn error_chain(error: &anyhow::Error) -> String {
    format!("{error:#}")
}

/// Print a job result as pretty JSON.
pub fn print_result(result: &serde_json::Value) -> Result<()> {
    println!("\n{} Result:", style("✓").green().bold());
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inline_arguments() {
        let args = parse_arguments(Some(r#"{"circuit": "OPENQASM 3.0;", "shots": 100}"#), None)
            .unwrap();
        assert_eq!(args["shots"], 100);
    }

    #[test]
    fn test_parse_arguments_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("args.json");
        fs::write(&path, r#"{"observable": "ZZ"}"#).unwrap();

        let args = parse_arguments(None, Some(&path)).unwrap();
        assert_eq!(args["observable"], "ZZ");
    }

    #[test]
    fn test_parse_no_arguments() {
        assert!(parse_arguments(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_parse_arguments_rejects_non_object() {
        let err = parse_arguments(Some("[1, 2]"), None).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
        assert!(parse_arguments(Some("{not json"), None).is_err());
        assert!(parse_arguments(None, Some(Path::new("/nonexistent/args.json"))).is_err());
    }

    #[test]
    fn test_error_chain_includes_cause() {
        let error = anyhow::Error::new(qfc_catalog::CatalogError::MissingToken)
            .context("Failed to connect to the functions catalog");
        let message = error_chain(&error);
        assert!(message.starts_with("Failed to connect to the functions catalog: "));
        assert!(message.contains("QISKIT_IBM_TOKEN"));
    }

    #[test]
    fn test_parse_env_var() {
        assert_eq!(
            parse_env_var("LOG_LEVEL=debug").unwrap(),
            ("LOG_LEVEL".to_string(), "debug".to_string())
        );
        assert_eq!(
            parse_env_var("EMPTY=").unwrap(),
            ("EMPTY".to_string(), String::new())
        );
        assert!(parse_env_var("novalue").is_err());
        assert!(parse_env_var("=x").is_err());
    }
}
