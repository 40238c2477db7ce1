//! Foreign call models
//!
//! A foreign call is how a proving toolchain asks for off-circuit data. The
//! toolchain posts `resolve_foreign_call` with a single [`ForeignCallRequest`]
//! and expects a [`ForeignCallResult`] back.
//!
//! ## Shape of `values`
//!
//! Every entry in [`ForeignCallResult::values`] is one return slot of the
//! foreign function. A function returning one field element answers with a
//! flat `["2850"]`; a function returning an array answers with
//! `[["1", "2"]]`. The caller decodes slots by the function's declared return
//! type, so the shape is part of each function's contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC method the toolchain uses for every foreign call
pub const RESOLVE_FOREIGN_CALL: &str = "resolve_foreign_call";

/// One argument or return slot: a field element or an array of them
///
/// Field elements travel as strings (decimal or `0x` hex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForeignCallValue {
    Single(String),
    Array(Vec<String>),
}

/// First element of the `resolve_foreign_call` params
///
/// Only `function` is required. Toolchain metadata sent alongside
/// (`session_id`, `root_path`, `package_name`, ...) is ignored, and `inputs`
/// is kept as raw JSON so an argument layout a function does not read can
/// never fail the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignCallRequest {
    /// Name of the foreign function, e.g. `fetchEthPrice`
    pub function: String,
    /// Arguments passed by the circuit, `null` when absent
    #[serde(default)]
    pub inputs: Value,
}

impl ForeignCallRequest {
    pub fn new(function: &str) -> Self {
        Self {
            function: function.to_string(),
            inputs: Value::Null,
        }
    }

    pub fn with_inputs(mut self, inputs: Value) -> Self {
        self.inputs = inputs;
        self
    }

    /// Number of top-level arguments
    pub fn input_count(&self) -> usize {
        match &self.inputs {
            Value::Array(inputs) => inputs.len(),
            Value::Null => 0,
            _ => 1,
        }
    }
}

/// Successful result of a foreign call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignCallResult {
    pub values: Vec<ForeignCallValue>,
}

impl ForeignCallResult {
    /// Result of a function returning exactly one field element
    pub fn single(value: impl Into<String>) -> Self {
        Self {
            values: vec![ForeignCallValue::Single(value.into())],
        }
    }

    /// Result of a function returning one array of field elements
    pub fn array(values: Vec<String>) -> Self {
        Self {
            values: vec![ForeignCallValue::Array(values)],
        }
    }

    /// The lone field element, if this result is a single-field return
    pub fn as_single(&self) -> Option<&str> {
        match self.values.as_slice() {
            [ForeignCallValue::Single(value)] => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_ignores_toolchain_metadata() {
        let request: ForeignCallRequest = serde_json::from_value(json!({
            "session_id": 7,
            "function": "fetchEthPrice",
            "inputs": ["0x01", ["0x02", "0x03"]],
            "root_path": "/tmp/circuit",
            "package_name": "price_check"
        }))
        .unwrap();

        assert_eq!(request.function, "fetchEthPrice");
        assert_eq!(request.inputs, json!(["0x01", ["0x02", "0x03"]]));
        assert_eq!(request.input_count(), 2);
    }

    #[test]
    fn test_request_tolerates_any_input_layout() {
        for inputs in [json!(null), json!([1]), json!([["0x1", ["0x2"]]]), json!({ "x": 1 })] {
            let request: ForeignCallRequest = serde_json::from_value(json!({
                "function": "fetchEthPrice",
                "inputs": inputs.clone()
            }))
            .unwrap();
            assert_eq!(request.inputs, inputs);
        }
    }

    #[test]
    fn test_request_without_inputs() {
        let request: ForeignCallRequest =
            serde_json::from_value(json!({ "function": "fetchEthPrice" })).unwrap();
        assert!(request.inputs.is_null());
        assert_eq!(request.input_count(), 0);
    }

    #[test]
    fn test_request_requires_function() {
        let result = serde_json::from_value::<ForeignCallRequest>(json!({ "inputs": [] }));
        assert!(result.is_err());
    }

    #[test]
    fn test_single_field_result_is_flat() {
        let result = ForeignCallResult::single("2850");
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "values": ["2850"] }));
        assert_eq!(result.as_single(), Some("2850"));
    }

    #[test]
    fn test_array_result_is_nested() {
        let result = ForeignCallResult::array(vec!["1".into(), "2".into()]);
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({ "values": [["1", "2"]] }));
        assert_eq!(result.as_single(), None);
    }
}
