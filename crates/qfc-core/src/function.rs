//! Function references, list queries and upload descriptions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// Kind of a function as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FunctionType {
    /// Plain user code.
    Generic,
    /// Application function (domain inputs, domain outputs).
    Application,
    /// Circuit function (circuits in, results out).
    Circuit,
    /// Type string this client does not know about.
    Other(String),
}

impl From<String> for FunctionType {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "GENERIC" => FunctionType::Generic,
            "APPLICATION" => FunctionType::Application,
            "CIRCUIT" => FunctionType::Circuit,
            _ => FunctionType::Other(s),
        }
    }
}

impl From<FunctionType> for String {
    fn from(t: FunctionType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionType::Generic => write!(f, "GENERIC"),
            FunctionType::Application => write!(f, "APPLICATION"),
            FunctionType::Circuit => write!(f, "CIRCUIT"),
            FunctionType::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Reference to a remotely hosted function.
///
/// Identity is the `(provider, title)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QiskitFunction {
    /// Function title.
    pub title: String,
    /// Publishing provider, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Function kind.
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub function_type: Option<FunctionType>,
    /// Function version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Full object as returned by the gateway.
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl QiskitFunction {
    /// Create a bare reference from a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            provider: None,
            description: None,
            function_type: None,
            version: None,
            raw: serde_json::Value::Null,
        }
    }

    /// Set the provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Parse a gateway function object, keeping the raw value.
    pub fn from_value(value: serde_json::Value) -> CatalogResult<Self> {
        let mut function: QiskitFunction = serde_json::from_value(value.clone())?;
        if function.title.is_empty() {
            return Err(CatalogError::Configuration(
                "function object has an empty title".into(),
            ));
        }
        function.raw = value;
        Ok(function)
    }

    /// `provider/title`, or just `title` without a provider.
    pub fn display_name(&self) -> String {
        match &self.provider {
            Some(provider) => format!("{provider}/{}", self.title),
            None => self.title.clone(),
        }
    }
}

impl PartialEq for QiskitFunction {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.provider == other.provider
    }
}

impl Eq for QiskitFunction {}

impl fmt::Display for QiskitFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QiskitFunction({})", self.display_name())
    }
}

/// Query parameters for listing functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FunctionQuery {
    /// Pre-filter keyword (`catalog` or `serverless`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl FunctionQuery {
    /// Query with a pre-filter keyword.
    pub fn filtered(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
        }
    }
}

/// Description of a function to upload.
///
/// Either `image` (a container image reference) or `entrypoint` plus a
/// pre-built `artifact` archive must be given.
#[derive(Debug, Clone, Default)]
pub struct FunctionUpload {
    /// Function title.
    pub title: String,
    /// Provider to publish under.
    pub provider: Option<String>,
    /// Human readable description.
    pub description: Option<String>,
    /// Container image reference.
    pub image: Option<String>,
    /// Entrypoint script inside the artifact.
    pub entrypoint: Option<String>,
    /// Path to a pre-built archive with the function sources.
    pub artifact: Option<PathBuf>,
    /// Requirement strings installed before running.
    pub dependencies: Vec<String>,
    /// Environment variables set for the function.
    pub env_vars: BTreeMap<String, String>,
}

impl FunctionUpload {
    /// Upload a function packaged as a container image.
    pub fn image(title: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            image: Some(image.into()),
            ..Self::default()
        }
    }

    /// Upload a function from an entrypoint inside an archive.
    pub fn entrypoint(
        title: impl Into<String>,
        entrypoint: impl Into<String>,
        artifact: impl Into<PathBuf>,
    ) -> Self {
        Self {
            title: title.into(),
            entrypoint: Some(entrypoint.into()),
            artifact: Some(artifact.into()),
            ..Self::default()
        }
    }

    /// Set the provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a dependency.
    pub fn with_dependency(mut self, requirement: impl Into<String>) -> Self {
        self.dependencies.push(requirement.into());
        self
    }

    /// Add an environment variable.
    pub fn with_env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Check that the description can be uploaded.
    pub fn validate(&self) -> CatalogResult<()> {
        if self.title.trim().is_empty() {
            return Err(CatalogError::InvalidUpload("title must not be empty".into()));
        }
        match (&self.image, &self.entrypoint) {
            (Some(_), Some(_)) => Err(CatalogError::InvalidUpload(
                "set either image or entrypoint, not both".into(),
            )),
            (None, None) => Err(CatalogError::InvalidUpload(
                "one of image or entrypoint is required".into(),
            )),
            (None, Some(_)) if self.artifact.is_none() => Err(CatalogError::InvalidUpload(
                "an entrypoint upload needs an artifact archive".into(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_keeps_raw() {
        let value = json!({
            "title": "hamiltonian-simulation",
            "provider": "ibm",
            "type": "APPLICATION",
            "description": "Simulates Hamiltonians",
            "available": true
        });
        let function = QiskitFunction::from_value(value.clone()).unwrap();
        assert_eq!(function.title, "hamiltonian-simulation");
        assert_eq!(function.provider.as_deref(), Some("ibm"));
        assert_eq!(function.function_type, Some(FunctionType::Application));
        assert_eq!(function.raw, value);
    }

    #[test]
    fn test_from_value_requires_title() {
        assert!(QiskitFunction::from_value(json!({"provider": "ibm"})).is_err());
        assert!(QiskitFunction::from_value(json!({"title": ""})).is_err());
    }

    #[test]
    fn test_unknown_type_preserved() {
        let function = QiskitFunction::from_value(json!({"title": "f", "type": "QUANTUM"})).unwrap();
        assert_eq!(
            function.function_type,
            Some(FunctionType::Other("QUANTUM".into()))
        );
    }

    #[test]
    fn test_identity_is_provider_and_title() {
        let a = QiskitFunction::new("answer").with_provider("deep-thought");
        let mut b = QiskitFunction::new("answer").with_provider("deep-thought");
        b.description = Some("different".into());
        assert_eq!(a, b);
        assert_ne!(a, QiskitFunction::new("answer"));
        assert_eq!(a.display_name(), "deep-thought/answer");
        assert_eq!(QiskitFunction::new("answer").display_name(), "answer");
    }

    #[test]
    fn test_upload_validation() {
        assert!(FunctionUpload::image("f", "icr.io/f:latest").validate().is_ok());
        assert!(
            FunctionUpload::entrypoint("f", "main.py", "/tmp/f.tar")
                .validate()
                .is_ok()
        );

        let mut both = FunctionUpload::image("f", "icr.io/f:latest");
        both.entrypoint = Some("main.py".into());
        assert!(matches!(both.validate(), Err(CatalogError::InvalidUpload(_))));

        let neither = FunctionUpload {
            title: "f".into(),
            ..FunctionUpload::default()
        };
        assert!(neither.validate().is_err());

        let mut no_artifact = FunctionUpload::entrypoint("f", "main.py", "/tmp/f.tar");
        no_artifact.artifact = None;
        assert!(no_artifact.validate().is_err());

        assert!(FunctionUpload::image(" ", "img").validate().is_err());
    }
}
