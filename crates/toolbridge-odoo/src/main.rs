//! MCP server exposing an Odoo 16 instance as tools over stdio.

use anyhow::Result;
use std::sync::Arc;
use toolbridge_mcp::{serve_stdio, McpServer};
use toolbridge_odoo::{OdooClient, OdooConfig, OdooToolSet};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for JSON-RPC frames
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = OdooConfig::from_env();
    let client = OdooClient::new(&config)?;
    let tools = OdooToolSet::new(Arc::new(client));

    let server = McpServer::new("toolbridge-odoo", env!("CARGO_PKG_VERSION"), tools);
    serve_stdio(server).await?;
    Ok(())
}
