//! Wire types for the local JSON-RPC dialect.
//!
//! Requests carry `{jsonrpc, method, params, id}`; a null or absent `id`
//! marks a fire-and-forget call that must never produce response bytes.
//! Responses carry exactly one of `result` or `error`. Notifications are
//! outbound-only envelopes with no `id` at all.

use serde::Serialize;
use serde_json::Value;

use log::error;

pub const PROTOCOL_VERSION: &str = "2.0";

// JSON-RPC reserved error codes.
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// Application-level handler failures, outside the reserved protocol range.
pub const SERVER_ERROR: i64 = -32000;

/// One decoded inbound request.
#[derive(Debug, Clone)]
pub struct RpcRequest {
    pub method: String,
    pub params: Value,
    pub id: Value,
}

impl RpcRequest {
    /// Validate the envelope shape of an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns a ready-to-send `InvalidRequest` response when the envelope
    /// is not an object or `method` is missing or not a string. The `id` is
    /// echoed back when one could be extracted, null otherwise.
    pub fn from_value(value: Value) -> Result<Self, RpcResponse> {
        let Value::Object(mut fields) = value else {
            return Err(RpcResponse::failure(
                Value::Null,
                RpcErrorBody::new(INVALID_REQUEST, "Request must be a JSON object"),
            ));
        };

        let id = fields.get("id").cloned().unwrap_or(Value::Null);

        let method = match fields.remove("method") {
            Some(Value::String(method)) => method,
            Some(_) => {
                return Err(RpcResponse::failure(
                    id,
                    RpcErrorBody::new(INVALID_REQUEST, "Field 'method' must be a string"),
                ));
            }
            None => {
                return Err(RpcResponse::failure(
                    id,
                    RpcErrorBody::new(INVALID_REQUEST, "Field 'method' is missing"),
                ));
            }
        };

        let params = fields.remove("params").unwrap_or(Value::Null);

        Ok(Self { method, params, id })
    }

    /// A null `id` marks a fire-and-forget call: no response is expected.
    pub fn is_notification(&self) -> bool {
        self.id.is_null()
    }
}

/// Structured error carried in a response (and returned by handlers for
/// domain failures).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

impl RpcErrorBody {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Domain failure reported by a handler.
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(SERVER_ERROR, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }
}

/// One outbound response envelope. Exactly one of `result`/`error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorBody>,

    pub id: Value,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION,
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Value, error: RpcErrorBody) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION,
            result: None,
            error: Some(error),
            id,
        }
    }

    /// Serialize for the wire.
    ///
    /// Serialization of these types cannot fail for well-formed `Value`s; if
    /// it ever does, a minimal internal-error envelope is produced instead of
    /// panicking across a transport boundary.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!("Failed to serialize response envelope: {e}");
            format!(
                r#"{{"jsonrpc":"{PROTOCOL_VERSION}","error":{{"code":{INTERNAL_ERROR},"message":"Response serialization failed"}},"id":null}}"#
            )
        })
    }
}

/// One-way outbound message: structurally a request without an `id`.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: Value,
}

impl Notification {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION,
            method: method.into(),
            params,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            error!("Failed to serialize notification envelope: {e}");
            format!(
                r#"{{"jsonrpc":"{PROTOCOL_VERSION}","method":"{}","params":null}}"#,
                self.method
            )
        })
    }
}
