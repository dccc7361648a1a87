//! Odoo 16 adapter: CRUD and schema-introspection tools over the external
//! XML-RPC API, including the minimal codec the transport needs.

pub mod client;
pub mod config;
pub mod error;
pub mod tools;
pub mod xmlrpc;

pub use client::{OdooApi, OdooClient};
pub use config::OdooConfig;
pub use error::{OdooError, OdooResult};
pub use tools::{OdooTool, OdooToolSet};
