/// Gateway Entry Point
///
/// Loads `.env`, initializes logging, builds the immutable configuration
/// and the tool registry, then runs the HTTP server.
///
/// Environment variables (see core::config for the full list):
/// - SERVER_NAME / SERVER_VERSION: identity reported to consumers
/// - HOST / PORT: bind address (default 0.0.0.0:8000)
/// - MCP_BEARER_TOKEN: bearer secret; unset disables authentication
/// - MCP_WRAP_RULES: path to a JSON wrap-rule file
/// - RUST_LOG: tracing filter (default "info")

mod core;
mod tools;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::core::server;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let provider = Arc::new(tools::build_registry());

    server::run(config, provider).await
}
