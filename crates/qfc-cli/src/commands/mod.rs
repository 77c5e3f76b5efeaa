//! CLI command implementations.

pub mod account;
pub mod common;
pub mod files;
pub mod functions;
pub mod jobs;
pub mod version;
pub mod wait;
