//! Sage MSSQL adapter: read-only SQL access and schema introspection over a
//! single tiberius connection serialized behind a mutex.

pub mod client;
pub mod config;
pub mod error;
pub mod rows;
pub mod tools;

pub use client::{QueryBackend, SageClient};
pub use config::SageConfig;
pub use error::{SageError, SageResult};
pub use tools::{SageTool, SageToolSet};
