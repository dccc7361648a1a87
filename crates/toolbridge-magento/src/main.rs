//! MCP server exposing the Magento paint-colour database as tools over stdio.

use anyhow::Result;
use std::sync::Arc;
use toolbridge_magento::{config, MagentoToolSet};
use toolbridge_mcp::{serve_stdio, McpServer};
use toolbridge_mysql::{MysqlBackend, QueryBackend};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for JSON-RPC frames
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let connection = config::connection_from_env()?;
    let backend = Arc::new(MysqlBackend::connect(&connection).await?);

    // Close the pool on Ctrl-C; the serve loop itself ends when stdin does.
    let shutdown_backend = backend.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutting down");
            shutdown_backend.close().await;
            std::process::exit(0);
        }
    });

    let tools = MagentoToolSet::new(backend.clone());
    let server = McpServer::new("toolbridge-magento", env!("CARGO_PKG_VERSION"), tools);
    serve_stdio(server).await?;

    backend.close().await;
    Ok(())
}
