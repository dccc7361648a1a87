//! MCP server exposing the WhatsApp Cloud API as tools over stdio.

use anyhow::Result;
use std::sync::Arc;
use toolbridge_mcp::{serve_stdio, McpServer};
use toolbridge_whatsapp::{WhatsappClient, WhatsappConfig, WhatsappToolSet};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for JSON-RPC frames
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = WhatsappConfig::from_env()?;
    let client = WhatsappClient::new(&config)?;
    let tools = WhatsappToolSet::new(Arc::new(client), config.webhook_settings());

    let server = McpServer::new("toolbridge-whatsapp", env!("CARGO_PKG_VERSION"), tools);
    serve_stdio(server).await?;
    Ok(())
}
