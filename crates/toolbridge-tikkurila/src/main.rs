//! MCP server exposing the Tikkurila paint-mixing databases as tools over stdio.

use anyhow::Result;
use std::sync::Arc;
use toolbridge_mcp::{serve_stdio, McpServer};
use toolbridge_mysql::{MysqlBackend, QueryBackend};
use toolbridge_tikkurila::{TikkurilaConfig, TikkurilaToolSet};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for JSON-RPC frames
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = TikkurilaConfig::from_env()?;
    let db1 = Arc::new(MysqlBackend::connect(&config.database1).await?);
    let db2 = Arc::new(MysqlBackend::connect(&config.database2).await?);

    // Close both pools on Ctrl-C; the serve loop itself ends when stdin does.
    let (shutdown_db1, shutdown_db2) = (db1.clone(), db2.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutting down");
            shutdown_db1.close().await;
            shutdown_db2.close().await;
            std::process::exit(0);
        }
    });

    let tools = TikkurilaToolSet::new(db1.clone(), db2.clone());
    let server = McpServer::new("toolbridge-tikkurila", env!("CARGO_PKG_VERSION"), tools);
    serve_stdio(server).await?;

    db1.close().await;
    db2.close().await;
    Ok(())
}
