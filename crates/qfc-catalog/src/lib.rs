//! Client for the Qiskit Functions catalog.
//!
//! Two facades share one gateway connection model:
//! - [`QiskitFunctionsCatalog`] lists, loads and runs published functions
//!   (pre-filter keyword `catalog`)
//! - [`QiskitServerless`] additionally uploads functions and manages the
//!   per-function file folders (pre-filter keyword `serverless`)
//!
//! Loaded functions are [`Function`] handles; running one yields a [`Job`]
//! whose status, logs and result can be fetched later.
//!
//! # Example
//!
//! ```ignore
//! use qfc_catalog::{QiskitFunctionsCatalog, ResultOptions};
//! use qfc_core::JobQuery;
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Token from QISKIT_IBM_TOKEN or the default saved account.
//!     let catalog = QiskitFunctionsCatalog::new(None, None).await?;
//!
//!     for function in catalog.list().await? {
//!         println!("{function}");
//!     }
//!
//!     let Some(function) = catalog.load("hamiltonian-simulation", Some("ibm")).await? else {
//!         anyhow::bail!("function not available");
//!     };
//!     let job = function.run(&json!({"circuit": "OPENQASM 3.0; ..."}), None).await?;
//!     let options = ResultOptions::default().with_timeout(Duration::from_secs(600));
//!     println!("{}", job.result_with(options).await?);
//!
//!     for job in catalog.jobs(JobQuery::new().with_limit(10)).await? {
//!         println!("{} {}", job.id(), job.info().status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
mod client;
pub mod function;
pub mod job;
pub mod serverless;

#[cfg(test)]
mod testing;

pub use catalog::{CATALOG_FILTER, QiskitFunctionsCatalog};
pub use function::Function;
pub use job::{DEFAULT_CADENCE, Job, MIN_CADENCE, ResultOptions};
pub use serverless::{DEFAULT_DOWNLOAD_LOCATION, QiskitServerless, SERVERLESS_FILTER};

pub use qfc_core::{
    Account, AccountStore, CatalogError, CatalogResult, Channel, Credentials, FileScope,
    FunctionUpload, Gateway, JobId, JobInfo, JobQuery, JobStatus, QiskitFunction, RunConfig,
};
