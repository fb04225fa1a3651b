use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::time::{timeout_at, Instant};
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::TlsConnector;
use tracing::{debug, trace};

use crate::error::{CoreError, TransportError};

use super::super::types::ProxyTarget;
use super::super::RpcProvider;
use super::connection::{build_tls_connector, open_tunnel, resolve_server_name};
use super::parsing::{build_post_request, decode_chunked, parse_response};
use super::protocol::{extract_result, JsonRpcRequest};

/// JSON-RPC client tunneling HTTPS through an SNI pass-through proxy.
///
/// Every call is single-shot: one TCP connection, one TLS handshake, one
/// request, read to EOF, done. No pooling, no keep-alive, no retries —
/// resilience belongs to the caller. Calls share nothing but the request-id
/// counter, so issuing them concurrently from separate tasks needs no
/// coordination; dropping an in-flight call drops its socket.
pub struct TunnelRpcClient {
    target: ProxyTarget,
    server_name: ServerName<'static>,
    connector: TlsConnector,
    timeout: Duration,
    next_id: AtomicU64,
}

impl std::fmt::Debug for TunnelRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // `TlsConnector` is not `Debug`; omit it.
        f.debug_struct("TunnelRpcClient")
            .field("target", &self.target)
            .field("server_name", &self.server_name)
            .field("timeout", &self.timeout)
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl TunnelRpcClient {
    /// Create a client for `target`. `timeout` is one overall deadline per
    /// call: dial, handshake, write, and the read loop all count against it.
    ///
    /// Fails fast if `upstream_host` is not a valid TLS server name.
    pub fn new(target: ProxyTarget, timeout: Duration) -> Result<Self, CoreError> {
        let server_name = resolve_server_name(&target.upstream_host)?;
        Ok(Self {
            target,
            server_name,
            connector: build_tls_connector(),
            timeout,
            next_id: AtomicU64::new(initial_request_id()),
        })
    }

    /// One full transport cycle: connect, handshake, write the framed
    /// request, read to peer close, split, de-chunk if needed, parse JSON.
    async fn send(&self, body: &[u8]) -> Result<serde_json::Value, TransportError> {
        let deadline = Instant::now() + self.timeout;

        let mut stream = open_tunnel(
            &self.target,
            &self.connector,
            self.server_name.clone(),
            deadline,
        )
        .await?;

        let request = build_post_request(&self.target.upstream_host, body);
        timeout_at(deadline, stream.write_all(&request))
            .await
            .map_err(|_| TransportError::Write(io::Error::from(io::ErrorKind::TimedOut)))?
            .map_err(TransportError::Write)?;

        let raw = self.read_to_close(&mut stream, deadline).await?;
        trace!(raw_len = raw.len(), "raw response received");

        let response = parse_response(&raw)?;
        debug!(
            status = response.status,
            chunked = response.is_chunked(),
            body_len = response.body.len(),
            "http response"
        );

        let decoded = if response.is_chunked() {
            decode_chunked(&response.body)?
        } else {
            // Content-Length framing: the read loop already ran to EOF, so
            // the body is complete as-is.
            response.body
        };

        Ok(serde_json::from_slice(&decoded)?)
    }

    /// Accumulate response bytes until the peer closes the connection.
    ///
    /// `Connection: close` makes peer close the authoritative end-of-response
    /// signal. Some peers drop the TCP connection without sending a TLS
    /// close_notify; that surfaces as `UnexpectedEof` and is also treated as
    /// end-of-response.
    async fn read_to_close(
        &self,
        stream: &mut (impl AsyncRead + Unpin),
        deadline: Instant,
    ) -> Result<Vec<u8>, TransportError> {
        let mut response = Vec::with_capacity(4096);
        let mut buf = [0u8; 4096];
        loop {
            let read = timeout_at(deadline, stream.read(&mut buf))
                .await
                .map_err(|_| TransportError::ReadTimeout(self.timeout))?;
            match read {
                Ok(0) => return Ok(response),
                Ok(n) => response.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(response),
                Err(e) => return Err(TransportError::Read(e)),
            }
        }
    }
}

#[async_trait]
impl RpcProvider for TunnelRpcClient {
    async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value, CoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );

        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };
        let body = serde_json::to_vec(&request)
            .expect("JSON-RPC envelope of JSON values always serializes");

        let decoded = self.send(&body).await?;
        trace!(rpc.id = id, rpc.method = method, body = %decoded, "rpc response body");

        extract_result(decoded)
    }
}

fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}
