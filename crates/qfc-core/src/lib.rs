//! Core types for the Qiskit Functions catalog client.
//!
//! This crate holds everything the public facades and the transport
//! adapters agree on:
//! - [`QiskitFunction`] references and the queries used to list them
//! - [`JobId`], [`JobStatus`] and the gateway status mapping
//! - the [`Gateway`] trait implemented by transport adapters
//! - saved [`Account`]s and [`Credentials`] resolution
//! - the shared [`CatalogError`] type
//!
//! # Implementing a Gateway
//!
//! ```ignore
//! use qfc_core::{Gateway, CatalogResult, FunctionQuery, QiskitFunction};
//! use async_trait::async_trait;
//!
//! struct InMemoryGateway { functions: Vec<QiskitFunction> }
//!
//! #[async_trait]
//! impl Gateway for InMemoryGateway {
//!     fn host(&self) -> &str { "memory://" }
//!
//!     async fn list_functions(&self, _query: &FunctionQuery) -> CatalogResult<Vec<QiskitFunction>> {
//!         Ok(self.functions.clone())
//!     }
//!
//!     // ... remaining operations
//! }
//! ```

pub mod account;
pub mod error;
pub mod function;
pub mod gateway;
pub mod job;

pub use account::{Account, AccountStore, Channel, Credentials, DEFAULT_ACCOUNT_NAME, DEFAULT_HOST};
pub use error::{CatalogError, CatalogResult};
pub use function::{FunctionQuery, FunctionType, FunctionUpload, QiskitFunction};
pub use gateway::{FileScope, Gateway};
pub use job::{JobId, JobInfo, JobQuery, JobStatus, RunConfig};
