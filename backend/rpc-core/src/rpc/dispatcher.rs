//! RPC dispatcher: raw request bytes in, optional response bytes out.
//!
//! Decoding and handler resolution happen on the calling transport's task;
//! the handler itself runs on the task runtime, and awaiting its completion
//! is the system's primary suspension point. The dispatcher is also the last
//! line of defense against escaping failures: a panicking handler becomes a
//! generic server-error response, never a dead worker or a dead process.

use crate::rpc::protocol::{
    INTERNAL_ERROR, METHOD_NOT_FOUND, PARSE_ERROR, RpcErrorBody, RpcRequest, RpcResponse,
    SERVER_ERROR,
};
use crate::rpc::registry::MethodRegistry;
use crate::runtime::TaskRuntime;

use serde_json::Value;

use std::sync::Arc;

use log::{error, warn};

pub struct RpcDispatcher {
    registry: Arc<MethodRegistry>,
    runtime: Arc<TaskRuntime>,
}

impl RpcDispatcher {
    /// Build the dispatcher over a frozen registry. Registration must be
    /// finished before the first dispatch; the registry is read-only from
    /// here on.
    pub fn new(registry: Arc<MethodRegistry>, runtime: Arc<TaskRuntime>) -> Self {
        Self { registry, runtime }
    }

    /// Decode one raw request, run its handler on the task runtime, and
    /// produce the serialized response.
    ///
    /// Returns `None` for fire-and-forget requests (`id == null`): the
    /// handler is submitted without awaiting so the caller is never blocked,
    /// and no response bytes are produced even when the handler fails.
    pub async fn dispatch(&self, raw: &str) -> Option<String> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding unparseable request: {e}");
                let error = RpcErrorBody::new(PARSE_ERROR, format!("Parse error: {e}"));
                return Some(RpcResponse::failure(Value::Null, error).to_json());
            }
        };

        let request = match RpcRequest::from_value(value) {
            Ok(request) => request,
            Err(response) => {
                warn!("Rejected malformed request envelope");
                return Some(response.to_json());
            }
        };

        let Some(descriptor) = self.registry.lookup(&request.method) else {
            if request.is_notification() {
                warn!(
                    "Dropping fire-and-forget call to unknown method {:?}",
                    request.method
                );
                return None;
            }
            let error = RpcErrorBody::new(
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            );
            return Some(RpcResponse::failure(request.id, error).to_json());
        };

        let RpcRequest { method, params, id } = request;
        let invocation = descriptor.invoke(params);

        if id.is_null() {
            match self.runtime.submit(async move {
                if let Err(e) = invocation.await {
                    warn!(
                        "Fire-and-forget handler {method:?} failed: {} (code {})",
                        e.message, e.code
                    );
                }
            }) {
                Ok(_) => {}
                Err(e) => error!("Failed to submit fire-and-forget handler: {e}"),
            }
            return None;
        }

        let joined = match self.runtime.submit(invocation) {
            Ok(handle) => handle.await,
            Err(e) => {
                error!("Failed to submit handler {method:?}: {e}");
                let error = RpcErrorBody::new(INTERNAL_ERROR, "Task runtime unavailable");
                return Some(RpcResponse::failure(id, error).to_json());
            }
        };

        let response = match joined {
            Ok(Ok(result)) => RpcResponse::success(id, result),
            Ok(Err(error)) => {
                warn!(
                    "Handler {method:?} returned error {}: {}",
                    error.code, error.message
                );
                RpcResponse::failure(id, error)
            }
            Err(join_error) => {
                // The worker survives a panicking handler; the caller gets a
                // structured error instead of silence.
                error!("Handler {method:?} aborted: {join_error}");
                let error = RpcErrorBody::new(SERVER_ERROR, "Internal handler failure");
                RpcResponse::failure(id, error)
            }
        };

        Some(response.to_json())
    }
}
