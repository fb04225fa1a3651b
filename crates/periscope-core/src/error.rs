use std::time::Duration;

/// Failures inside a single transport cycle (dial, handshake, write, read,
/// framing, decode). Each variant is a distinct, inspectable condition; the
/// transport never retries and never suppresses any of them.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect to proxy {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("TLS handshake for `{server_name}` failed: {source}")]
    TlsHandshake {
        server_name: String,
        source: std::io::Error,
    },

    /// Certificate validation failed. Kept separate from [`Self::TlsHandshake`]
    /// so a mis-spelled upstream host is diagnosable apart from a proxy that
    /// does not forward TLS at all.
    #[error("peer certificate rejected for `{server_name}`: {source}")]
    CertificateRejected {
        server_name: String,
        source: std::io::Error,
    },

    #[error("write request: {0}")]
    Write(std::io::Error),

    #[error("read response: {0}")]
    Read(std::io::Error),

    /// The peer never closed the connection within the deadline. Whatever
    /// bytes arrived so far are discarded.
    #[error("no end-of-response within {0:?}")]
    ReadTimeout(Duration),

    #[error("malformed HTTP response: {0}")]
    MalformedResponse(String),

    #[error("malformed chunked body: {0}")]
    MalformedChunk(String),

    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The remote peer's own JSON-RPC error object. Distinct from transport
    /// failures: the TLS and HTTP layers succeeded.
    #[error("RPC server error {code}: {message}")]
    Server { code: i64, message: String },

    #[error("JSON-RPC protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
