mod cli;

use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;

use periscope_core::rpc::{ProxyTarget, RpcProvider, TunnelRpcClient};
use periscope_core::{CoreError, TransportError};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let params: Vec<serde_json::Value> =
        serde_json::from_str(&args.params).wrap_err("parse --params as a JSON array")?;

    let target = ProxyTarget {
        proxy_host: args.proxy_host,
        proxy_port: args.proxy_port,
        upstream_host: args.upstream_host,
    };

    tracing::info!(
        proxy = %target.proxy_addr(),
        upstream = %target.upstream_host,
        method = %args.method,
        "sending JSON-RPC call through the proxy tunnel"
    );

    let client = TunnelRpcClient::new(target.clone(), Duration::from_secs(args.timeout_secs))
        .wrap_err("construct tunnel client")?;

    let result = match client.call(&args.method, params).await {
        Ok(result) => result,
        Err(err) => {
            let message = format_call_error(&target, &err);
            return Err(eyre::eyre!(message).wrap_err("JSON-RPC call failed"));
        }
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&result).wrap_err("render result")?
    );

    Ok(())
}

/// Attach an actionable hint to the most common failure shapes.
fn format_call_error(target: &ProxyTarget, err: &CoreError) -> String {
    let mut lines = vec![err.to_string()];

    match err {
        CoreError::Transport(TransportError::Connect { .. }) => lines.push(format!(
            "hint: nothing accepted the TCP dial on {}; is the proxy running?",
            target.proxy_addr()
        )),
        CoreError::Transport(TransportError::CertificateRejected { .. }) => lines.push(format!(
            "hint: the peer's certificate does not match `{}`; check the upstream host spelling \
             and that the proxy forwards to the right destination",
            target.upstream_host
        )),
        CoreError::Transport(TransportError::TlsHandshake { .. }) => lines.push(
            "hint: the proxy accepted the dial but the TLS handshake failed; verify it passes \
             raw TLS through based on SNI rather than answering HTTP itself"
                .into(),
        ),
        CoreError::Transport(TransportError::ReadTimeout(_)) => lines.push(
            "hint: the upstream never closed the connection; raise --timeout-secs or check the \
             proxy's upstream connectivity"
                .into(),
        ),
        CoreError::Server { code, .. } if *code == -32000 => lines.push(
            "hint: the upstream node rejected the call; it may be rate limiting this endpoint"
                .into(),
        ),
        _ => {}
    }

    lines.join("\n")
}
