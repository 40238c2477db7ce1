//! HTTP client for the mock price oracle
//!
//! Speaks the same `resolve_foreign_call` protocol a proving toolchain uses,
//! so tests and scripts can drive the oracle without one.

use anyhow::{bail, Context};
use oracle_models::{
    ForeignCallRequest, ForeignCallResult, JsonRpcRequest, JsonRpcResponse, RESOLVE_FOREIGN_CALL,
};
use reqwest::Client;
use std::sync::atomic::{AtomicI64, Ordering};

/// Client for one oracle instance
pub struct OracleClient {
    /// HTTP client
    client: Client,
    /// Base URL, e.g. `http://127.0.0.1:5555`
    base_url: String,
    /// Path of the JSON-RPC endpoint
    rpc_path: String,
    /// Next request id
    next_id: AtomicI64,
}

impl OracleClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            rpc_path: "/".to_string(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Post to a different JSON-RPC path
    pub fn with_rpc_path(mut self, rpc_path: &str) -> Self {
        self.rpc_path = rpc_path.to_string();
        self
    }

    pub fn rpc_url(&self) -> String {
        format!("{}{}", self.base_url, self.rpc_path)
    }

    /// Send a raw JSON-RPC request and return the response envelope
    pub async fn call(&self, request: &JsonRpcRequest) -> anyhow::Result<JsonRpcResponse> {
        let response = self
            .client
            .post(self.rpc_url())
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let response: JsonRpcResponse = response
            .json()
            .await
            .context("Oracle returned a non JSON-RPC body")?;
        Ok(response)
    }

    /// Resolve one foreign call
    pub async fn resolve_foreign_call(
        &self,
        call: &ForeignCallRequest,
    ) -> anyhow::Result<ForeignCallResult> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(RESOLVE_FOREIGN_CALL, serde_json::json!([call]), id);

        tracing::debug!("Resolving {} (id={})", call.function, id);
        match self.call(&request).await?.into_result() {
            Ok(result) => serde_json::from_value(result).context("Malformed foreign call result"),
            Err(error) => bail!("Oracle error {}: {}", error.code, error.message),
        }
    }

    /// Ask for the ETH price
    pub async fn fetch_eth_price(&self) -> anyhow::Result<String> {
        let result = self
            .resolve_foreign_call(&ForeignCallRequest::new("fetchEthPrice"))
            .await?;
        result
            .as_single()
            .map(str::to_string)
            .context("fetchEthPrice did not return a single field")
    }

    /// Hit the liveness route
    pub async fn liveness(&self) -> anyhow::Result<String> {
        let text = self
            .client
            .get(format!("{}/test", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(text)
    }
}
