use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::CoreError;

use super::RpcProvider;

/// A canned-response provider for testing consumers of [`RpcProvider`]
/// without a proxy or a network. Responses are keyed by method name and
/// populated via the builder pattern.
pub struct MockProvider {
    results: HashMap<String, serde_json::Value>,
    errors: HashMap<String, (i64, String)>,
}

impl MockProvider {
    pub fn builder() -> MockProviderBuilder {
        MockProviderBuilder {
            results: HashMap::new(),
            errors: HashMap::new(),
        }
    }
}

pub struct MockProviderBuilder {
    results: HashMap<String, serde_json::Value>,
    errors: HashMap<String, (i64, String)>,
}

impl MockProviderBuilder {
    pub fn with_result(mut self, method: &str, result: serde_json::Value) -> Self {
        self.results.insert(method.to_owned(), result);
        self
    }

    pub fn with_error(mut self, method: &str, code: i64, message: &str) -> Self {
        self.errors
            .insert(method.to_owned(), (code, message.to_owned()));
        self
    }

    pub fn build(self) -> MockProvider {
        MockProvider {
            results: self.results,
            errors: self.errors,
        }
    }
}

#[async_trait]
impl RpcProvider for MockProvider {
    async fn call(
        &self,
        method: &str,
        _params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError> {
        if let Some((code, message)) = self.errors.get(method) {
            return Err(CoreError::Server {
                code: *code,
                message: message.clone(),
            });
        }
        self.results
            .get(method)
            .cloned()
            .ok_or_else(|| CoreError::Server {
                code: -32601,
                message: format!("method not found: {method}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_canned_result() {
        let provider = MockProvider::builder()
            .with_result("eth_blockNumber", serde_json::json!("0x4b7"))
            .build();
        let result = provider
            .call("eth_blockNumber", Vec::new())
            .await
            .expect("canned method must succeed");
        assert_eq!(result, serde_json::json!("0x4b7"));
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let provider = MockProvider::builder().build();
        let err = provider
            .call("eth_gasPrice", Vec::new())
            .await
            .expect_err("unknown method must fail");
        assert!(matches!(err, CoreError::Server { code: -32601, .. }));
    }

    #[tokio::test]
    async fn injected_error_surfaces_as_server_error() {
        let provider = MockProvider::builder()
            .with_error("eth_sendRawTransaction", -32000, "rate limited")
            .build();
        let err = provider
            .call("eth_sendRawTransaction", Vec::new())
            .await
            .expect_err("injected error must surface");
        match err {
            CoreError::Server { code, message } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected Server error, got {other:?}"),
        }
    }
}
