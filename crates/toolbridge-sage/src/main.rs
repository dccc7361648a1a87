//! MCP server exposing the Sage MSSQL database as read-only tools over stdio.

use anyhow::Result;
use std::sync::Arc;
use toolbridge_mcp::{serve_stdio, McpServer};
use toolbridge_sage::{SageClient, SageConfig, SageToolSet};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for JSON-RPC frames
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = SageConfig::from_env()?;
    let backend = Arc::new(SageClient::connect(&config).await?);

    let tools = SageToolSet::new(backend);
    let server = McpServer::new("toolbridge-sage", env!("CARGO_PKG_VERSION"), tools);
    serve_stdio(server).await?;

    Ok(())
}
