//! Shared MCP (Model Context Protocol) core for the toolbridge adapter servers.
//!
//! Each server crate supplies a [`ToolSet`] (catalog plus dispatch) and hands it
//! to [`serve_stdio`]; this crate owns the JSON-RPC framing, the MCP handshake,
//! and the line-delimited stdio loop.

pub mod catalog;
pub mod error;
pub mod jsonrpc;
pub mod protocol;
pub mod server;
pub mod toolset;

pub use catalog::ToolCatalog;
pub use error::{McpError, McpResult};
pub use protocol::{CallToolResult, Tool, ToolContent};
pub use server::{serve_stdio, McpServer};
pub use toolset::{parse_args, ToolSet};
