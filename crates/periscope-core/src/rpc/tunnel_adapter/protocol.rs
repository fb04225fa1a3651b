use crate::error::CoreError;

/// Outbound JSON-RPC 2.0 envelope.
#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: Vec<serde_json::Value>,
}

/// Pull the single `result` value out of a decoded JSON-RPC response.
///
/// Field *presence* is what matters here: `"result": null` is a legal
/// success, so the response is inspected as an object map rather than
/// deserialized into `Option` fields (which would conflate `null` with
/// absent). Exactly one of `result`/`error` must be present.
pub(super) fn extract_result(response: serde_json::Value) -> Result<serde_json::Value, CoreError> {
    let serde_json::Value::Object(mut map) = response else {
        return Err(CoreError::ProtocolViolation(format!(
            "response is not a JSON object: {response}"
        )));
    };

    match (map.remove("result"), map.remove("error")) {
        (Some(result), None) => Ok(result),
        (None, Some(error)) => Err(parse_jsonrpc_error(error)),
        (Some(_), Some(_)) => Err(CoreError::ProtocolViolation(
            "response carries both result and error".into(),
        )),
        (None, None) => Err(CoreError::ProtocolViolation(
            "response carries neither result nor error".into(),
        )),
    }
}

/// Parse a JSON-RPC error value into a structured `CoreError`.
///
/// The JSON-RPC spec defines errors as `{"code": <int>, "message": <string>}`;
/// anything else is a protocol violation rather than a server error.
fn parse_jsonrpc_error(error: serde_json::Value) -> CoreError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    match serde_json::from_value::<JsonRpcError>(error.clone()) {
        Ok(parsed) => CoreError::Server {
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => CoreError::ProtocolViolation(format!("non-standard JSON-RPC error: {error}")),
    }
}
