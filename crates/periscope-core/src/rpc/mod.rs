//! JSON-RPC provider abstraction.
//!
//! Defines the [`RpcProvider`] trait and provides the proxy-tunneled
//! implementation ([`TunnelRpcClient`]) plus a test mock (`mock::MockProvider`).

#[cfg(test)]
pub mod mock;
mod tunnel_adapter;
pub mod types;

pub use tunnel_adapter::TunnelRpcClient;
pub use types::ProxyTarget;

use async_trait::async_trait;

use crate::error::CoreError;

/// Generic remote-procedure-call contract, independent of any particular
/// blockchain method set.
///
/// This trait is the single integration point for higher layers (contract
/// glue, transaction builders); they hold a provider and never construct
/// sockets themselves. Implementations surface the peer's JSON-RPC `error`
/// field as [`CoreError::Server`] and add no retry logic of their own.
#[async_trait]
pub trait RpcProvider: Send + Sync {
    /// Invoke `method` with positional `params`, returning the response's
    /// `result` value.
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError>;
}
