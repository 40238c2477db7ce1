//! Mock price oracle server
//!
//! Resolves JSON-RPC foreign calls from a proving toolchain over HTTP.
//!
//! Endpoints:
//! - `POST <rpc_path>` (and any other POST path unless disabled): JSON-RPC
//! - `GET /test`: liveness string
//! - `GET /health`: supported functions and methods

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use oracle_feeds::OracleRegistry;
use oracle_models::{ForeignCallRequest, ForeignCallResult, RESOLVE_FOREIGN_CALL};
use oracle_rpc::{RpcError, RpcServer};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
mod handlers;

pub use config::OracleConfig;
pub use handlers::LIVENESS_MESSAGE;

/// Largest request body accepted
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers
///
/// Built once at startup and never mutated.
pub struct AppState {
    /// JSON-RPC dispatcher
    pub rpc: RpcServer,
    /// Foreign functions served
    pub registry: Arc<OracleRegistry>,
    /// Configuration
    pub config: OracleConfig,
}

impl AppState {
    pub fn new(config: OracleConfig) -> Arc<Self> {
        let registry = Arc::new(OracleRegistry::with_eth_price(config.eth_price.clone()));
        Arc::new(Self {
            rpc: build_rpc_server(registry.clone()),
            registry,
            config,
        })
    }
}

/// Register the JSON-RPC methods backed by `registry`
pub fn build_rpc_server(registry: Arc<OracleRegistry>) -> RpcServer {
    let mut rpc = RpcServer::new();
    rpc.add_method(RESOLVE_FOREIGN_CALL, move |params: Vec<Value>| {
        resolve_foreign_call(&registry, params)
    });
    rpc
}

/// Only `params[0]` is read; anything after it is ignored.
fn resolve_foreign_call(
    registry: &OracleRegistry,
    params: Vec<Value>,
) -> Result<ForeignCallResult, RpcError> {
    let first = params.into_iter().next().ok_or_else(|| {
        RpcError::InvalidParams("expected a foreign call object as the first param".to_string())
    })?;
    let call: ForeignCallRequest =
        serde_json::from_value(first).map_err(|e| RpcError::InvalidParams(e.to_string()))?;

    tracing::info!("Oracle called: {} ({} inputs)", call.function, call.input_count());

    registry.resolve(&call).map_err(|e| {
        tracing::warn!("Foreign call rejected [{}]: {}", e.code(), e);
        RpcError::application(e)
    })
}

/// Build the HTTP router
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/test", get(handlers::liveness))
        .route("/health", get(handlers::health_check))
        .route(&state.config.rpc_path, post(handlers::handle_rpc));

    if state.config.accept_any_path {
        app = app.fallback(post(handlers::handle_rpc));
    }

    app.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
    .layer(TraceLayer::new_for_http())
    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    .with_state(state)
}

/// Serve the oracle on an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}
