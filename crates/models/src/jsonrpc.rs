//! JSON-RPC 2.0 envelope models
//!
//! Only the shapes that travel over the wire live here. Dispatch lives in
//! `oracle-rpc`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only protocol version accepted and emitted
pub const JSONRPC_VERSION: &str = "2.0";

/// Error codes reported in [`JsonRpcError::code`]
pub mod error_codes {
    /// Invalid JSON was received
    pub const PARSE_ERROR: i64 = -32700;
    /// The JSON sent is not a valid request object
    pub const INVALID_REQUEST: i64 = -32600;
    /// The method does not exist
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Invalid method parameters
    pub const INVALID_PARAMS: i64 = -32602;
    /// Internal JSON-RPC error
    pub const INTERNAL_ERROR: i64 = -32603;
    /// Error raised by a method handler itself
    pub const APPLICATION_ERROR: i64 = 0;
}

/// Request identifier, echoed back on the response
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

/// A single JSON-RPC call
///
/// A request without an `id` member is a notification and gets no response.
/// An explicit `"id": null` is a call like any other and is answered with
/// `"id": null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
    /// Outer `None`: member absent. `Some(None)`: `"id": null`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<Option<RequestId>>,
}

/// Marks a member as present even when its value is `null`
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    pub fn new(method: &str, params: Value, id: impl Into<RequestId>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id: Some(Some(id.into())),
        }
    }

    pub fn notification(method: &str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params,
            id: None,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Error object carried by a failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

/// Either `result` or `error`, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponsePayload {
    Result(Value),
    Error(JsonRpcError),
}

/// A single JSON-RPC response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(flatten)]
    pub payload: ResponsePayload,
    /// `null` when the request id could not be determined
    pub id: Option<RequestId>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            payload: ResponsePayload::Result(result),
            id,
        }
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            payload: ResponsePayload::Error(error),
            id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, ResponsePayload::Error(_))
    }

    /// Split the response into its result or error object
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        match self.payload {
            ResponsePayload::Result(value) => Ok(value),
            ResponsePayload::Error(error) => Err(error),
        }
    }
}

/// What the server sends back for a single call or a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcReply {
    Single(JsonRpcResponse),
    Batch(Vec<JsonRpcResponse>),
}
