//! Error types for the serverless gateway adapter.

use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur when talking to the serverless gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Token cannot be sent as a header.
    #[error("Invalid IBM Quantum token")]
    InvalidToken,

    /// A header value other than the token is malformed.
    #[error("Invalid header value for {0}")]
    InvalidHeader(&'static str),

    /// Gateway URL cannot be used as a base URL.
    #[error("Invalid gateway URL: {0}")]
    InvalidUrl(String),

    /// Gateway rejected the credentials (401/403).
    #[error("Gateway rejected the credentials: {0}")]
    Unauthorized(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Gateway returned a non-success status.
    #[error("Gateway error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// Response body had an unexpected shape.
    #[error("Unexpected gateway response: {0}")]
    UnexpectedResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Local file error during upload or download.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),
}

impl From<GatewayError> for qfc_core::CatalogError {
    fn from(e: GatewayError) -> Self {
        use qfc_core::CatalogError;

        match e {
            GatewayError::InvalidToken => CatalogError::InvalidToken,
            GatewayError::InvalidHeader(_) | GatewayError::InvalidUrl(_) => {
                CatalogError::Configuration(e.to_string())
            }
            GatewayError::Unauthorized(msg) => CatalogError::Unauthorized(msg),
            GatewayError::ApiError { status, message } => CatalogError::Api { status, message },
            GatewayError::JsonError(err) => CatalogError::Serialization(err),
            GatewayError::IoError(err) => CatalogError::Io(err),
            GatewayError::JobNotFound(id) => CatalogError::JobNotFound(id),
            GatewayError::HttpError(_) | GatewayError::UnexpectedResponse(_) => {
                CatalogError::Network(e.to_string())
            }
        }
    }
}
