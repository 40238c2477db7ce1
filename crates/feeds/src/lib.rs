//! Mock price feeds for the oracle
//!
//! Foreign functions the oracle can answer are registered in an
//! [`OracleRegistry`] keyed by name. Today the only one is `fetchEthPrice`,
//! served by [`EthPriceOracle`] from a price fixed at startup.

use oracle_models::{ForeignCallRequest, ForeignCallResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Name the circuit uses to ask for the ETH price
pub const FETCH_ETH_PRICE: &str = "fetchEthPrice";

/// Price served when none is configured
pub const DEFAULT_ETH_PRICE: &str = "2850";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("Unknown oracle: {0}")]
    UnknownOracleFunction(String),
}

impl OracleError {
    /// Get a machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownOracleFunction(_) => "UNKNOWN_ORACLE_FUNCTION",
        }
    }
}

/// A foreign function the oracle knows how to answer
pub trait ForeignFunction: Send + Sync {
    /// Name the circuit calls this function by
    fn name(&self) -> &'static str;

    /// Resolve a call. The result shape must match the function's return type.
    ///
    /// `inputs` is the raw argument JSON; functions decode what they read.
    fn call(&self, inputs: &Value) -> Result<ForeignCallResult, OracleError>;
}

/// Static ETH price, returned as a single field element
#[derive(Debug, Clone)]
pub struct EthPriceOracle {
    price: String,
}

impl EthPriceOracle {
    pub fn new(price: impl Into<String>) -> Self {
        Self {
            price: price.into(),
        }
    }
}

impl ForeignFunction for EthPriceOracle {
    fn name(&self) -> &'static str {
        FETCH_ETH_PRICE
    }

    fn call(&self, _inputs: &Value) -> Result<ForeignCallResult, OracleError> {
        Ok(ForeignCallResult::single(self.price.clone()))
    }
}

/// Registry of foreign functions, keyed by name
#[derive(Clone, Default)]
pub struct OracleRegistry {
    functions: HashMap<&'static str, Arc<dyn ForeignFunction>>,
}

impl std::fmt::Debug for OracleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleRegistry")
            .field("functions", &self.functions())
            .finish()
    }
}

impl OracleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry serving `fetchEthPrice` with the given price
    pub fn with_eth_price(price: impl Into<String>) -> Self {
        let mut registry = Self::new();
        registry.register(EthPriceOracle::new(price));
        registry
    }

    /// Add a function, replacing any previous one with the same name
    pub fn register<F: ForeignFunction + 'static>(&mut self, function: F) {
        let name = function.name();
        if self.functions.insert(name, Arc::new(function)).is_some() {
            tracing::warn!("Replaced foreign function {}", name);
        }
    }

    /// Names of all registered functions, sorted
    pub fn functions(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Resolve a foreign call against the registered functions
    pub fn resolve(&self, request: &ForeignCallRequest) -> Result<ForeignCallResult, OracleError> {
        let function = self
            .functions
            .get(request.function.as_str())
            .ok_or_else(|| OracleError::UnknownOracleFunction(request.function.clone()))?;

        let result = function.call(&request.inputs)?;
        tracing::debug!("Resolved {} -> {:?}", request.function, result.values);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstantArray;

    impl ForeignFunction for ConstantArray {
        fn name(&self) -> &'static str {
            "fetchPricePair"
        }

        fn call(&self, _inputs: &Value) -> Result<ForeignCallResult, OracleError> {
            Ok(ForeignCallResult::array(vec!["1".into(), "2".into()]))
        }
    }

    #[test]
    fn test_fetch_eth_price() {
        let registry = OracleRegistry::with_eth_price("2850");
        let result = registry
            .resolve(&ForeignCallRequest::new(FETCH_ETH_PRICE))
            .unwrap();
        assert_eq!(result, ForeignCallResult::single("2850"));
    }

    #[test]
    fn test_fetch_eth_price_ignores_inputs_and_repeats() {
        let registry = OracleRegistry::with_eth_price("3100");
        let inputs = [
            serde_json::json!(["0x01", ["0x02"]]),
            serde_json::json!(null),
            serde_json::json!([1]),
            serde_json::json!([["0x1", ["0x2"]]]),
        ];

        for inputs in inputs {
            let request = ForeignCallRequest::new(FETCH_ETH_PRICE).with_inputs(inputs);
            let result = registry.resolve(&request).unwrap();
            assert_eq!(result.as_single(), Some("3100"));
        }
    }

    #[test]
    fn test_unknown_function_rejection() {
        let registry = OracleRegistry::with_eth_price(DEFAULT_ETH_PRICE);
        let err = registry
            .resolve(&ForeignCallRequest::new("fetchBtcPrice"))
            .unwrap_err();
        assert_eq!(err, OracleError::UnknownOracleFunction("fetchBtcPrice".into()));
        assert_eq!(err.to_string(), "Unknown oracle: fetchBtcPrice");
        assert_eq!(err.code(), "UNKNOWN_ORACLE_FUNCTION");
    }

    #[test]
    fn test_empty_function_name_rejection() {
        let registry = OracleRegistry::with_eth_price(DEFAULT_ETH_PRICE);
        let err = registry.resolve(&ForeignCallRequest::new("")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown oracle: ");
    }

    #[test]
    fn test_function_names_are_case_sensitive() {
        let registry = OracleRegistry::with_eth_price(DEFAULT_ETH_PRICE);
        assert!(registry.resolve(&ForeignCallRequest::new("fetchethprice")).is_err());
    }

    #[test]
    fn test_register_additional_function() {
        let mut registry = OracleRegistry::with_eth_price(DEFAULT_ETH_PRICE);
        registry.register(ConstantArray);

        assert_eq!(registry.functions(), vec!["fetchEthPrice", "fetchPricePair"]);
        let result = registry
            .resolve(&ForeignCallRequest::new("fetchPricePair"))
            .unwrap();
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({ "values": [["1", "2"]] })
        );
    }

    #[test]
    fn test_register_replaces_existing() {
        let mut registry = OracleRegistry::with_eth_price("1");
        registry.register(EthPriceOracle::new("2"));
        let result = registry
            .resolve(&ForeignCallRequest::new(FETCH_ETH_PRICE))
            .unwrap();
        assert_eq!(result.as_single(), Some("2"));
        assert_eq!(registry.functions().len(), 1);
    }
}
