use std::io;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::error::{CoreError, TransportError};

use super::super::types::ProxyTarget;

/// Validate `upstream_host` as a TLS server name up front, so a bad target
/// fails at construction instead of on the first call.
pub(super) fn resolve_server_name(upstream_host: &str) -> Result<ServerName<'static>, CoreError> {
    ServerName::try_from(upstream_host.to_owned())
        .map_err(|e| CoreError::Config(format!("invalid upstream host `{upstream_host}`: {e}")))
}

/// TLS connector validating peers against the bundled web-PKI roots.
pub(super) fn build_tls_connector() -> TlsConnector {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

/// Dial the proxy and run the TLS handshake addressed to the upstream host.
///
/// The proxy sees nothing but an opaque encrypted stream whose SNI names the
/// upstream; the certificate validated here must belong to the upstream, not
/// to the dialed endpoint.
pub(super) async fn open_tunnel(
    target: &ProxyTarget,
    connector: &TlsConnector,
    server_name: ServerName<'static>,
    deadline: Instant,
) -> Result<TlsStream<TcpStream>, TransportError> {
    let addr = target.proxy_addr();
    let tcp = timeout_at(deadline, TcpStream::connect(&addr))
        .await
        .map_err(|_| TransportError::Connect {
            addr: addr.clone(),
            source: io::Error::from(io::ErrorKind::TimedOut),
        })?
        .map_err(|source| TransportError::Connect {
            addr: addr.clone(),
            source,
        })?;

    debug!(proxy = %addr, upstream = %target.upstream_host, "tcp connected, starting handshake");

    let tls = timeout_at(deadline, connector.connect(server_name, tcp))
        .await
        .map_err(|_| TransportError::TlsHandshake {
            server_name: target.upstream_host.clone(),
            source: io::Error::from(io::ErrorKind::TimedOut),
        })?
        .map_err(|source| classify_tls_error(&target.upstream_host, source))?;

    Ok(tls)
}

/// Split certificate-validation failures from every other handshake failure.
/// tokio-rustls surfaces rustls errors wrapped in `io::Error`.
fn classify_tls_error(server_name: &str, source: io::Error) -> TransportError {
    let invalid_cert = source
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<tokio_rustls::rustls::Error>())
        .is_some_and(|e| matches!(e, tokio_rustls::rustls::Error::InvalidCertificate(_)));

    if invalid_cert {
        TransportError::CertificateRejected {
            server_name: server_name.to_owned(),
            source,
        }
    } else {
        TransportError::TlsHandshake {
            server_name: server_name.to_owned(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_server_name_accepts_hostname() {
        resolve_server_name("rpc.example.org").expect("hostname must be a valid server name");
    }

    #[test]
    fn resolve_server_name_accepts_ip_literal() {
        resolve_server_name("203.0.113.7").expect("IP literal must be a valid server name");
    }

    #[test]
    fn resolve_server_name_rejects_garbage() {
        let err = resolve_server_name("not a host name").expect_err("must reject spaces");
        assert!(err.to_string().contains("invalid upstream host"));
    }

    #[test]
    fn classify_tls_error_detects_certificate_failures() {
        let rustls_err = tokio_rustls::rustls::Error::InvalidCertificate(
            tokio_rustls::rustls::CertificateError::NotValidForName,
        );
        let io_err = io::Error::new(io::ErrorKind::InvalidData, rustls_err);
        let classified = classify_tls_error("rpc.example.org", io_err);
        assert!(matches!(
            classified,
            TransportError::CertificateRejected { .. }
        ));
    }

    #[test]
    fn classify_tls_error_other_failures_are_handshake() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "peer closed");
        let classified = classify_tls_error("rpc.example.org", io_err);
        assert!(matches!(classified, TransportError::TlsHandshake { .. }));
    }
}
