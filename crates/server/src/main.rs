//! subscope server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use std::sync::Arc;
use subscope_client::SubstanceLookup;
use subscope_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        psychonaut_wiki = config.enable_psychonaut_wiki,
        tripsit = config.enable_tripsit,
        "Starting subscope server on stdio transport"
    );

    let lookup = Arc::new(SubstanceLookup::from_config(&config)?);
    let handler = handler::SubscopeServer::new(lookup);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
