//! Qiskit serverless gateway adapter.
//!
//! This crate implements [`qfc_core::Gateway`] over the serverless REST
//! API that hosts Qiskit Functions. Both the catalog and the serverless
//! facades talk to the same gateway; they differ only in the pre-filter
//! keyword they send.
//!
//! # Endpoints
//!
//! | Operation | Method | Path (under `{host}/api/v1/`) |
//! |-----------|--------|-------------------------------|
//! | list functions | GET | `programs/` |
//! | load function | GET | `programs/get_by_title/{title}/` |
//! | run | POST | `programs/run/` |
//! | upload | POST | `programs/upload/` |
//! | list jobs | GET | `jobs/` |
//! | job status/result | GET | `jobs/{id}/?with_result=true` |
//! | logs | GET | `jobs/{id}/logs/` |
//! | stop | POST | `jobs/{id}/stop/` |
//! | files | GET/DELETE/POST | `files/`, `files/provider/` (+ `download/`, `delete/`, `upload/`) |
//!
//! # Authentication
//!
//! ```bash
//! export QISKIT_IBM_TOKEN="your-api-token"
//! export QISKIT_IBM_INSTANCE="crn:v1:..."     # optional
//! export ENV_GATEWAY_PROVIDER_HOST="https://..." # optional, overrides the default gateway
//! ```
//!
//! # Example
//!
//! ```ignore
//! use qfc_adapter_serverless::ServerlessGateway;
//! use qfc_core::{Credentials, FunctionQuery, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gateway = ServerlessGateway::connect(&Credentials::from_token("...")).await?;
//!     for function in gateway.list_functions(&FunctionQuery::filtered("catalog")).await? {
//!         println!("{function}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod error;
pub mod gateway;

pub use api::ServerlessClient;
pub use error::{GatewayError, GatewayResult};
pub use gateway::ServerlessGateway;
