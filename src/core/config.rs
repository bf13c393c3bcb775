/// Gateway Configuration
///
/// All process configuration is collected once at startup into an
/// immutable `Config` that is passed into the dispatcher and auth gate.
/// Values come from environment variables (a `.env` file is loaded by the
/// entry point before this runs):
///
/// - SERVER_NAME / SERVER_VERSION: identity reported by `initialize`
/// - HOST / PORT: HTTP bind address (default 0.0.0.0:8000)
/// - MCP_BEARER_TOKEN: bearer secret; unset means unauthenticated
/// - MCP_WRAP_RULES: path to a JSON wrap-rule file; unset means the
///   built-in analytics defaults

use std::env;
use std::fs;
use std::path::Path;

use crate::core::wrap::{WrapRules, WrapTable};

/// Immutable startup configuration shared by all workers.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server name as reported in initialize responses
    pub server_name: String,
    /// Server version string as reported in initialize responses
    pub server_version: String,
    /// HTTP bind address
    pub host: String,
    /// HTTP bind port
    pub port: u16,
    /// Bearer token required on every request; None disables auth
    pub bearer_token: Option<String>,
    /// Tool-name -> wrap-category table
    pub wrap_table: WrapTable,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        let wrap_table = match env::var("MCP_WRAP_RULES") {
            Ok(path) if !path.trim().is_empty() => match load_wrap_rules(path.trim()) {
                Ok(table) => table,
                Err(e) => {
                    tracing::warn!("failed to load wrap rules from {path}: {e}; using defaults");
                    default_wrap_table()
                }
            },
            _ => default_wrap_table(),
        };

        Self {
            server_name: env_or("SERVER_NAME", "mcp-gateway"),
            server_version: env_or("SERVER_VERSION", env!("CARGO_PKG_VERSION")),
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "8000").parse::<u16>().unwrap_or(8000),
            bearer_token: env::var("MCP_BEARER_TOKEN")
                .ok()
                .filter(|token| !token.is_empty()),
            wrap_table,
        }
    }
}

/// Get an environment variable with a default fallback.
fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load wrap rules from a JSON file:
/// `{"array_result": [...], "object_result": [...]}`.
fn load_wrap_rules(path: impl AsRef<Path>) -> Result<WrapTable, String> {
    let raw = fs::read_to_string(path.as_ref()).map_err(|e| e.to_string())?;
    parse_wrap_rules(&raw)
}

fn parse_wrap_rules(raw: &str) -> Result<WrapTable, String> {
    let rules: WrapRules = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    Ok(WrapTable::from_rules(&rules))
}

/// Built-in classification for the analytics tool surface the gateway
/// fronts by default. List-shaped admin lookups wrap as arrays; report
/// and detail lookups wrap as objects.
fn default_wrap_table() -> WrapTable {
    let rules = WrapRules {
        array_result: vec![
            "get_account_summaries".to_string(),
            "list_google_ads_links".to_string(),
        ],
        object_result: vec![
            "get_property_details".to_string(),
            "run_realtime_report".to_string(),
            "run_report".to_string(),
            "get_custom_dimensions_and_metrics".to_string(),
        ],
    };
    WrapTable::from_rules(&rules)
}
