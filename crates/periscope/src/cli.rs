use clap::Parser;

/// Periscope — single-shot JSON-RPC probe through an SNI pass-through proxy.
#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Proxy host to dial over plain TCP.
    #[arg(long, default_value = "127.0.0.1", env = "PERISCOPE_PROXY_HOST")]
    pub proxy_host: String,

    /// Proxy port.
    #[arg(long, default_value = "8080", env = "PERISCOPE_PROXY_PORT")]
    pub proxy_port: u16,

    /// Upstream host the TLS handshake and Host header are addressed to.
    /// Never resolved locally; the proxy routes the encrypted stream to it.
    #[arg(long, env = "PERISCOPE_UPSTREAM_HOST")]
    pub upstream_host: String,

    /// JSON-RPC method to invoke.
    #[arg(long, default_value = "eth_blockNumber")]
    pub method: String,

    /// Positional parameters as a JSON array.
    #[arg(long, default_value = "[]")]
    pub params: String,

    /// Overall call deadline in seconds (dial, handshake, and read loop).
    #[arg(long, default_value = "50")]
    pub timeout_secs: u64,
}
