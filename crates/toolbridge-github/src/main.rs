//! MCP server exposing the GitHub REST API as tools over stdio.

use anyhow::Result;
use std::sync::Arc;
use toolbridge_github::{GithubClient, GithubConfig, GithubToolSet};
use toolbridge_mcp::{serve_stdio, McpServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for JSON-RPC frames
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = GithubConfig::from_env()?;
    let client = GithubClient::new(&config)?;
    let tools = GithubToolSet::new(Arc::new(client));

    let server = McpServer::new("toolbridge-github", env!("CARGO_PKG_VERSION"), tools);
    serve_stdio(server).await?;
    Ok(())
}
