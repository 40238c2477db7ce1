//! Oracle Server
//!
//! Main entry point for the mock price oracle.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults: 0.0.0.0:5555, price 2850
//! cargo run --bin oracle-server
//!
//! # Custom port and price
//! ETH_PRICE=3100 cargo run --bin oracle-server -- --port 6000
//!
//! # From a config file
//! cargo run --bin oracle-server -- --config oracle.yaml
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use oracle_server::{serve, AppState, OracleConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI arguments
#[derive(Parser)]
#[command(name = "oracle-server")]
#[command(about = "Mock price oracle resolving JSON-RPC foreign calls")]
struct CliArgs {
    /// Path to oracle configuration file
    #[arg(short, long, default_value = "oracle.yaml")]
    config: PathBuf,

    /// Bind address (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port for the HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Price returned for fetchEthPrice (overrides config)
    #[arg(long)]
    price: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,oracle_server=debug,oracle_rpc=debug".into()),
        )
        .init();

    tracing::info!("Starting Oracle Server...");

    let args = CliArgs::parse();

    let mut config = if args.config.exists() {
        OracleConfig::load_from(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?
    } else {
        tracing::debug!("Config file {:?} not found, using environment", args.config);
        OracleConfig::default()
    };

    // Apply CLI overrides
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(price) = args.price {
        config.eth_price = price;
    }

    config.validate().context("Invalid configuration")?;

    tracing::info!(
        "Configuration: addr={}, rpc_path={}, accept_any_path={}, eth_price={}",
        config.bind_addr(),
        config.rpc_path,
        config.accept_any_path,
        config.eth_price
    );

    let state = AppState::new(config);
    let addr = state.config.bind_addr();

    tracing::info!("Serving foreign functions: {:?}", state.registry.functions());
    tracing::info!("HTTP server listening on {}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  POST {:<8} - JSON-RPC resolve_foreign_call", state.config.rpc_path);
    tracing::info!("  GET  /test     - Liveness check");
    tracing::info!("  GET  /health   - Health check");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve(listener, state).await
}
