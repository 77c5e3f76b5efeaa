//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur when talking to the functions service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// No token was given and none could be resolved from the environment
    /// or the account store.
    #[error(
        "No IBM Quantum token found. Pass a token, set QISKIT_IBM_TOKEN, or save an account first."
    )]
    MissingToken,

    /// Token is empty or cannot be sent as a header.
    #[error("Invalid IBM Quantum token")]
    InvalidToken,

    /// Named account is not in the account store.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Named account already exists with different data.
    #[error("Named account ({0}) already exists. Set overwrite to replace it.")]
    AccountExists(String),

    /// Gateway rejected the credentials.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Function does not exist or is not visible to the user.
    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    /// Job does not exist or is not visible to the user.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job reached the error state.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was stopped before finishing.
    #[error("Job was canceled: {0}")]
    JobCanceled(String),

    /// Timeout waiting for a job to reach a terminal state.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// Function arguments could not be encoded as a JSON object.
    #[error("Invalid function arguments: {0}")]
    InvalidArguments(String),

    /// Upload description is incomplete or contradictory.
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Gateway returned a non-success status.
    #[error("Gateway error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
