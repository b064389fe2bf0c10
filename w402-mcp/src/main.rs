//! x402-paying MCP tool server over stdio.
//!
//! # Usage
//!
//! ```bash
//! EVM_PRIVATE_KEY=0x... \
//! RESOURCE_SERVER_URL=http://localhost:4021 \
//! ENDPOINT_PATH=/weather \
//! cargo run -p w402-mcp
//! ```
//!
//! Logs go to stderr; stdout carries the MCP protocol. See [`w402_mcp::config`]
//! for every option.

use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing_subscriber::EnvFilter;

use w402_mcp::{Config, StartupError, bootstrap};

#[tokio::main]
async fn main() {
    let config = Config::load();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if let Err(e) = run(&config).await {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run(config: &Config) -> Result<(), StartupError> {
    tracing::debug!(?config, "Loaded configuration");
    let tools = bootstrap(config)?;

    tracing::info!(endpoint = %tools.endpoint(), "Serving MCP tools on stdio");
    let service = tools
        .serve(stdio())
        .await
        .map_err(|e| StartupError::Server(e.to_string()))?;
    service
        .waiting()
        .await
        .map_err(|e| StartupError::Server(e.to_string()))?;

    tracing::info!("MCP client disconnected");
    Ok(())
}
