//! Byte-level HTTP/1.1 framing: request construction, header/body splitting,
//! and chunked transfer decoding.
//!
//! Everything here is a plain function over byte slices so that each stage of
//! the transport pipeline is testable without a socket.

use crate::error::TransportError;

// ==============================================================================
// Request Framing
// ==============================================================================

/// Frame a single-shot HTTP/1.1 POST carrying `body` to `/` on `host`.
///
/// `Connection: close` is load-bearing: the read side treats peer close as
/// the authoritative end-of-response signal, so every request announces it.
pub(super) fn build_post_request(host: &str, body: &[u8]) -> Vec<u8> {
    let mut request = format!(
        "POST / HTTP/1.1\r\n\
         Host: {host}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n",
        body.len()
    )
    .into_bytes();
    request.extend_from_slice(body);
    request
}

// ==============================================================================
// Response Splitting
// ==============================================================================

/// One parsed HTTP response. Lives only for the duration of a call.
#[derive(Debug)]
pub(super) struct HttpResponse {
    pub(super) status: u16,
    headers: Vec<(String, String)>,
    pub(super) body: Vec<u8>,
}

impl HttpResponse {
    /// Case-insensitive header lookup; first match wins.
    pub(super) fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub(super) fn is_chunked(&self) -> bool {
        self.header("transfer-encoding")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("chunked"))
    }
}

/// Split raw response bytes at the first blank line into header block and
/// body, and parse the status line and header fields.
pub(super) fn parse_response(raw: &[u8]) -> Result<HttpResponse, TransportError> {
    if raw.is_empty() {
        return Err(TransportError::MalformedResponse(
            "peer closed the connection without sending any bytes".into(),
        ));
    }

    let split = find_subsequence(raw, b"\r\n\r\n").ok_or_else(|| {
        TransportError::MalformedResponse("missing header/body separator".into())
    })?;
    let body = raw[split + 4..].to_vec();

    let head = std::str::from_utf8(&raw[..split]).map_err(|_| {
        TransportError::MalformedResponse("header block is not valid UTF-8".into())
    })?;
    let mut lines = head.split("\r\n");

    // `split` always yields at least one item, even on empty input.
    let status_line = lines.next().unwrap_or_default();
    let status = parse_status_line(status_line)?;

    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
        .collect();

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

/// Extract the numeric status code from a line like `HTTP/1.1 200 OK`.
fn parse_status_line(line: &str) -> Result<u16, TransportError> {
    line.split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| TransportError::MalformedResponse(format!("invalid status line `{line}`")))
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

// ==============================================================================
// Chunked Transfer Decoding
// ==============================================================================

/// Decode an HTTP chunked body: a hex size line, that many payload bytes, a
/// CRLF, repeated until a zero-size chunk. Trailers after the terminal chunk
/// are discarded. Chunk extensions (after `;`) are tolerated and ignored.
///
/// Truncation is an error: a declared size larger than the remaining bytes
/// yields `MalformedChunk` rather than a best-effort partial decode.
pub(super) fn decode_chunked(body: &[u8]) -> Result<Vec<u8>, TransportError> {
    let mut decoded = Vec::with_capacity(body.len());
    let mut rest = body;

    loop {
        let line_end = find_subsequence(rest, b"\r\n").ok_or_else(|| {
            TransportError::MalformedChunk("missing chunk-size line terminator".into())
        })?;
        let size_line = std::str::from_utf8(&rest[..line_end]).map_err(|_| {
            TransportError::MalformedChunk("chunk-size line is not valid UTF-8".into())
        })?;
        let size_str = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_str, 16).map_err(|_| {
            TransportError::MalformedChunk(format!("invalid chunk size `{size_str}`"))
        })?;
        rest = &rest[line_end + 2..];

        if size == 0 {
            return Ok(decoded);
        }
        if rest.len() < size {
            return Err(TransportError::MalformedChunk(format!(
                "chunk declares {size} bytes but only {} remain",
                rest.len()
            )));
        }
        decoded.extend_from_slice(&rest[..size]);
        rest = &rest[size..];

        if !rest.starts_with(b"\r\n") {
            return Err(TransportError::MalformedChunk(
                "chunk payload not followed by CRLF".into(),
            ));
        }
        rest = &rest[2..];
    }
}
