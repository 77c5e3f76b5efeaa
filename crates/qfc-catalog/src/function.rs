//! Runnable function handle.

use std::fmt;
use std::sync::Arc;

use qfc_core::{CatalogError, CatalogResult, Gateway, QiskitFunction, RunConfig};
use serde::Serialize;

use crate::job::Job;

/// A function that can be run on the gateway it was loaded from.
#[derive(Clone)]
pub struct Function {
    info: QiskitFunction,
    gateway: Arc<dyn Gateway>,
}

impl Function {
    pub(crate) fn new(info: QiskitFunction, gateway: Arc<dyn Gateway>) -> Self {
        Self { info, gateway }
    }

    /// Function title.
    pub fn title(&self) -> &str {
        &self.info.title
    }

    /// Publishing provider.
    pub fn provider(&self) -> Option<&str> {
        self.info.provider.as_deref()
    }

    /// Description, if the gateway reported one.
    pub fn description(&self) -> Option<&str> {
        self.info.description.as_deref()
    }

    /// The function reference as returned by the gateway.
    pub fn info(&self) -> &QiskitFunction {
        &self.info
    }

    /// Run the function.
    ///
    /// `arguments` must serialize to a JSON object (or to `null` for a
    /// run without arguments), e.g. `json!({"circuit": qasm})` or a
    /// `#[derive(Serialize)]` struct.
    pub async fn run<A>(&self, arguments: &A, config: Option<&RunConfig>) -> CatalogResult<Job>
    where
        A: Serialize + ?Sized,
    {
        let arguments = match serde_json::to_value(arguments)? {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                return Err(CatalogError::InvalidArguments(format!(
                    "arguments must be a JSON object, got {}",
                    json_kind(&other)
                )));
            }
        };

        tracing::debug!(
            "running {} with {} argument(s)",
            self.info.display_name(),
            arguments.len()
        );
        let job_id = self
            .gateway
            .run_function(&self.info, &arguments, config)
            .await?;
        Ok(Job::submitted(job_id, self.gateway.clone()))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("info", &self.info)
            .field("gateway", &self.gateway.host())
            .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.info, f)
    }
}
