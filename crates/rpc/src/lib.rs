//! JSON-RPC 2.0 dispatcher
//!
//! Methods are registered by name with typed handlers. The dispatcher decodes
//! params into the handler's input type, encodes its output, and turns every
//! failure into a JSON-RPC error object so nothing escapes to the transport.

use oracle_models::{
    error_codes, JsonRpcError, JsonRpcReply, JsonRpcRequest, JsonRpcResponse, RequestId,
    JSONRPC_VERSION,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),
    #[error("Method not found: {0}")]
    MethodNotFound(String),
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Internal error: {0}")]
    Internal(String),
    /// Failure reported by the method itself; the message is passed through
    #[error("{0}")]
    Application(String),
}

impl RpcError {
    /// Wrap a handler's own error
    pub fn application(err: impl Display) -> Self {
        Self::Application(err.to_string())
    }

    /// JSON-RPC error code for this error
    pub fn code(&self) -> i64 {
        match self {
            Self::Parse(_) => error_codes::PARSE_ERROR,
            Self::InvalidRequest(_) => error_codes::INVALID_REQUEST,
            Self::MethodNotFound(_) => error_codes::METHOD_NOT_FOUND,
            Self::InvalidParams(_) => error_codes::INVALID_PARAMS,
            Self::Internal(_) => error_codes::INTERNAL_ERROR,
            Self::Application(_) => error_codes::APPLICATION_ERROR,
        }
    }

    pub fn to_error_object(&self) -> JsonRpcError {
        JsonRpcError::new(self.code(), self.to_string())
    }
}

type MethodHandler = Box<dyn Fn(Value) -> Result<Value, RpcError> + Send + Sync>;

/// Method registry and dispatcher
#[derive(Default)]
pub struct RpcServer {
    methods: HashMap<String, MethodHandler>,
}

impl std::fmt::Debug for RpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcServer")
            .field("methods", &self.methods())
            .finish()
    }
}

impl RpcServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed handler under `name`
    ///
    /// Params that do not decode into `P` are answered with Invalid params.
    pub fn add_method<P, R, E, F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        P: DeserializeOwned + 'static,
        R: Serialize + 'static,
        E: Into<RpcError> + 'static,
        F: Fn(P) -> Result<R, E> + Send + Sync + 'static,
    {
        let boxed = move |params: Value| -> Result<Value, RpcError> {
            let params: P = serde_json::from_value(params)
                .map_err(|e| RpcError::InvalidParams(e.to_string()))?;
            let result = handler(params).map_err(|e| -> RpcError { e.into() })?;
            serde_json::to_value(result).map_err(|e| RpcError::Internal(e.to_string()))
        };
        self.methods.insert(name.to_string(), Box::new(boxed));
        self
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Handle a raw request body
    ///
    /// Bytes that are not valid UTF-8 JSON are answered with a Parse error.
    pub fn receive_slice(&self, body: &[u8]) -> Option<JsonRpcReply> {
        match serde_json::from_slice::<Value>(body) {
            Ok(message) => self.receive(message),
            Err(e) => {
                tracing::warn!("Rejecting unparseable JSON-RPC body: {}", e);
                Some(JsonRpcReply::Single(error_response(
                    None,
                    RpcError::Parse(e.to_string()),
                )))
            }
        }
    }

    /// Handle a decoded message: a single call or a batch
    ///
    /// Returns `None` when nothing should be sent back (notifications only).
    pub fn receive(&self, message: Value) -> Option<JsonRpcReply> {
        match message {
            Value::Array(calls) if calls.is_empty() => Some(JsonRpcReply::Single(
                error_response(None, RpcError::InvalidRequest("empty batch".to_string())),
            )),
            Value::Array(calls) => {
                let responses: Vec<_> = calls
                    .into_iter()
                    .filter_map(|call| self.handle_call(call))
                    .collect();
                if responses.is_empty() {
                    None
                } else {
                    Some(JsonRpcReply::Batch(responses))
                }
            }
            call => self.handle_call(call).map(JsonRpcReply::Single),
        }
    }

    fn handle_call(&self, call: Value) -> Option<JsonRpcResponse> {
        let id = call
            .get("id")
            .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

        let request: JsonRpcRequest = match serde_json::from_value(call) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Invalid JSON-RPC request: {}", e);
                return Some(error_response(id, RpcError::InvalidRequest(e.to_string())));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(error_response(
                request.id.flatten(),
                RpcError::InvalidRequest(format!("unsupported jsonrpc version {:?}", request.jsonrpc)),
            ));
        }

        let outcome = self.dispatch(&request.method, request.params);
        // Absent id: notification. `Some(None)` is an explicit null and is answered.
        let id = request.id?;

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(e) => {
                tracing::warn!("RPC {} failed: {}", request.method, e);
                error_response(id, e)
            }
        })
    }

    fn dispatch(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let handler = self
            .methods
            .get(method)
            .ok_or_else(|| RpcError::MethodNotFound(method.to_string()))?;
        tracing::debug!("Dispatching {}", method);
        handler(params)
    }
}

fn error_response(id: Option<RequestId>, error: RpcError) -> JsonRpcResponse {
    JsonRpcResponse::error(id, error.to_error_object())
}
