//! Proxy-tunneled JSON-RPC client for HTTPS endpoints.
//!
//! Implements [`RpcProvider`](super::RpcProvider) without an HTTP client
//! library: the adapter dials a local forward proxy over plain TCP, runs the
//! TLS handshake itself with SNI set to the upstream host, frames the
//! HTTP/1.1 POST by hand, reads until the peer closes, and undoes chunked
//! transfer-encoding before parsing the JSON-RPC envelope.

mod client;
mod connection;
mod parsing;
mod protocol;

pub use client::TunnelRpcClient;
