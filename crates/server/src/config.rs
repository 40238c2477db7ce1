//! Oracle configuration

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Oracle configuration
///
/// Fields missing from a config file fall back to the environment, then to
/// built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Bind address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Path of the JSON-RPC endpoint
    pub rpc_path: String,
    /// Route POSTs to any unmatched path to the JSON-RPC endpoint
    pub accept_any_path: bool,
    /// Price returned for `fetchEthPrice`, as a field element string
    pub eth_price: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5555),
            rpc_path: env::var("ORACLE_PATH").unwrap_or_else(|_| "/".to_string()),
            accept_any_path: env::var("ORACLE_ANY_PATH")
                .ok()
                .and_then(|s| {
                    let flag = parse_flag(&s);
                    if flag.is_none() {
                        tracing::warn!("Ignoring ORACLE_ANY_PATH={:?}: expected true or false", s);
                    }
                    flag
                })
                .unwrap_or(true),
            eth_price: env::var("ETH_PRICE")
                .unwrap_or_else(|_| oracle_feeds::DEFAULT_ETH_PRICE.to_string()),
        }
    }
}

impl OracleConfig {
    /// Load configuration from a YAML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        serde_yaml::from_str(&text).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            is_field_literal(&self.eth_price),
            "eth_price {:?} is not a field element (expected decimal digits or 0x-prefixed hex)",
            self.eth_price
        );
        ensure!(
            self.rpc_path.starts_with('/'),
            "rpc_path {:?} must start with '/'",
            self.rpc_path
        );
        ensure!(
            !self.rpc_path.contains(['*', ':', '{', '}']),
            "rpc_path {:?} must be a literal path (no '*', ':', '{{' or '}}')",
            self.rpc_path
        );
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Boolean spellings accepted from the environment
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// The circuit decodes returned values into field elements, so only
/// integers survive the trip.
fn is_field_literal(value: &str) -> bool {
    match value.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()),
    }
}
