use crate::helpers::{
    OBSERVE_TIMEOUT, client_runtime, dispatcher_with, echo_registry, started_runtime,
};

use rpc_core::rpc::MethodRegistry;
use rpc_core::rpc::protocol::{
    INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, RpcErrorBody, SERVER_ERROR,
};

use serde::Deserialize;
use serde_json::{Value, json};
use tokio::sync::mpsc::unbounded_channel;
use tokio::time::timeout;

/// **VALUE**: Verifies the full request/response round trip for a registered
/// method.
///
/// **WHY THIS MATTERS**: This is the spine of the system: decode, registry
/// lookup, execution on the worker pool, and response encoding all have to
/// line up, including id correlation.
///
/// **BUG THIS CATCHES**: Would catch broken params plumbing, a lost id, or a
/// response that carries both result and error.
#[test]
fn given_echo_method_when_dispatched_then_result_mirrors_params() {
    // GIVEN: A dispatcher with an echo method on a running pool
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let client = client_runtime();

    // WHEN: A well-formed request is dispatched
    let raw = r#"{"jsonrpc":"2.0","method":"echo","params":{"x":1},"id":7}"#;
    let response = client
        .block_on(dispatcher.dispatch(raw))
        .expect("addressed request must produce a response");

    // THEN: The response mirrors the params under the same id
    let wire: Value = serde_json::from_str(&response).expect("valid JSON");
    assert_eq!(wire["jsonrpc"], "2.0");
    assert_eq!(wire["result"], json!({"x": 1}));
    assert_eq!(wire["id"], json!(7));
    assert!(wire.get("error").is_none());

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies the MethodNotFound protocol error.
#[test]
fn given_unknown_method_when_dispatched_then_method_not_found() {
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let client = client_runtime();

    let raw = r#"{"jsonrpc":"2.0","method":"no.such.method","params":null,"id":"abc"}"#;
    let response = client
        .block_on(dispatcher.dispatch(raw))
        .expect("addressed request must produce a response");

    let wire: Value = serde_json::from_str(&response).expect("valid JSON");
    assert_eq!(wire["error"]["code"], json!(METHOD_NOT_FOUND));
    assert_eq!(wire["id"], "abc");

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies the ParseError path for bytes that are not JSON.
///
/// **WHY THIS MATTERS**: The id of an unparseable request is unknowable, so
/// the error must go out with a null id instead of being dropped or panicking
/// the transport task.
#[test]
fn given_malformed_json_when_dispatched_then_parse_error_with_null_id() {
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let client = client_runtime();

    let response = client
        .block_on(dispatcher.dispatch("{this is not json"))
        .expect("parse failures must produce a response");

    let wire: Value = serde_json::from_str(&response).expect("valid JSON");
    assert_eq!(wire["error"]["code"], json!(PARSE_ERROR));
    assert_eq!(wire["id"], Value::Null);

    runtime.stop();
}

// -------------------------------------------------------------------------- //

#[test]
fn given_envelope_without_method_when_dispatched_then_invalid_request() {
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let client = client_runtime();

    let response = client
        .block_on(dispatcher.dispatch(r#"{"jsonrpc":"2.0","params":{},"id":2}"#))
        .expect("invalid envelopes must produce a response");

    let wire: Value = serde_json::from_str(&response).expect("valid JSON");
    assert_eq!(wire["error"]["code"], json!(INVALID_REQUEST));
    assert_eq!(wire["id"], json!(2));

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that typed-handler params mismatches surface as
/// InvalidParams.
#[test]
fn given_typed_method_when_params_wrong_shape_then_invalid_params() {
    #[derive(Deserialize)]
    struct ResizeParams {
        #[allow(dead_code)]
        width: u32,
        #[allow(dead_code)]
        height: u32,
    }

    let mut registry = MethodRegistry::new();
    registry.register("window.resize", "", |_params: ResizeParams| async move {
        Ok::<_, RpcErrorBody>(true)
    });

    let runtime = started_runtime();
    let dispatcher = dispatcher_with(registry, &runtime);
    let client = client_runtime();

    let raw = r#"{"jsonrpc":"2.0","method":"window.resize","params":"huge","id":4}"#;
    let response = client
        .block_on(dispatcher.dispatch(raw))
        .expect("addressed request must produce a response");

    let wire: Value = serde_json::from_str(&response).expect("valid JSON");
    assert_eq!(wire["error"]["code"], json!(INVALID_PARAMS));

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that fire-and-forget requests execute without ever
/// producing response bytes.
///
/// **WHY THIS MATTERS**: A null id means the caller will never read a reply;
/// producing one anyway would desynchronize transports that frame responses
/// strictly by request.
///
/// **BUG THIS CATCHES**: Would catch a dispatcher that answers notifications,
/// or one that "optimizes" them by not running the handler at all.
#[test]
fn given_null_id_when_dispatched_then_no_response_but_handler_runs() {
    // GIVEN: A method that reports its execution on a channel
    let (tx, mut rx) = unbounded_channel();
    let mut registry = MethodRegistry::new();
    registry.register("capture.trigger", "", move |_: Value| {
        let tx = tx.clone();
        async move {
            let _ = tx.send("ran");
            Ok::<_, RpcErrorBody>(Value::Null)
        }
    });

    let runtime = started_runtime();
    let dispatcher = dispatcher_with(registry, &runtime);
    let client = client_runtime();

    // WHEN: The method is called with a null id
    let raw = r#"{"jsonrpc":"2.0","method":"capture.trigger","params":null,"id":null}"#;
    let response = client.block_on(dispatcher.dispatch(raw));

    // THEN: No response bytes, but the handler did run
    assert!(response.is_none(), "Fire-and-forget must not produce bytes");
    let ran = client
        .block_on(async { timeout(OBSERVE_TIMEOUT, rx.recv()).await })
        .expect("Timed out waiting for handler execution")
        .expect("Handler channel closed");
    assert_eq!(ran, "ran");

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies silence on the fire-and-forget path even when the
/// handler fails.
#[test]
fn given_null_id_when_handler_fails_then_still_no_response() {
    let mut registry = MethodRegistry::new();
    registry.register("always.fails", "", |_: Value| async move {
        Err::<Value, _>(RpcErrorBody::server_error("deliberate failure"))
    });

    let runtime = started_runtime();
    let dispatcher = dispatcher_with(registry, &runtime);
    let client = client_runtime();

    let raw = r#"{"jsonrpc":"2.0","method":"always.fails","params":null,"id":null}"#;
    let response = client.block_on(dispatcher.dispatch(raw));

    assert!(response.is_none());

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that a panicking handler becomes a ServerError
/// response.
///
/// **WHY THIS MATTERS**: The dispatcher is the last line of defense; a
/// handler bug must cost one request, not a worker thread or the process.
///
/// **BUG THIS CATCHES**: Would catch a dispatch path that unwinds into the
/// transport task or leaves the caller waiting forever.
#[test]
fn given_panicking_handler_when_dispatched_then_server_error_response() {
    let mut registry = MethodRegistry::new();
    registry.register("explosive", "", |params: Value| async move {
        if params.is_null() {
            panic!("handler exploded");
        }
        Ok::<Value, RpcErrorBody>(params)
    });

    let runtime = started_runtime();
    let dispatcher = dispatcher_with(registry, &runtime);
    let client = client_runtime();

    let raw = r#"{"jsonrpc":"2.0","method":"explosive","params":null,"id":11}"#;
    let response = client
        .block_on(dispatcher.dispatch(raw))
        .expect("addressed request must produce a response");

    let wire: Value = serde_json::from_str(&response).expect("valid JSON");
    assert_eq!(wire["error"]["code"], json!(SERVER_ERROR));
    assert_eq!(wire["id"], json!(11));

    // The pool survives: a follow-up request still works
    let echo = client
        .block_on(dispatcher.dispatch(r#"{"jsonrpc":"2.0","method":"explosive","params":1,"id":12}"#))
        .expect("pool must still serve requests");
    let wire: Value = serde_json::from_str(&echo).expect("valid JSON");
    assert_eq!(wire["id"], json!(12));

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that handler-chosen error codes pass through verbatim.
#[test]
fn given_domain_error_when_dispatched_then_code_and_message_preserved() {
    let mut registry = MethodRegistry::new();
    registry.register("gallery.open", "", |_: Value| async move {
        Err::<Value, _>(RpcErrorBody::new(-31999, "gallery index locked"))
    });

    let runtime = started_runtime();
    let dispatcher = dispatcher_with(registry, &runtime);
    let client = client_runtime();

    let raw = r#"{"jsonrpc":"2.0","method":"gallery.open","params":null,"id":5}"#;
    let response = client
        .block_on(dispatcher.dispatch(raw))
        .expect("addressed request must produce a response");

    let wire: Value = serde_json::from_str(&response).expect("valid JSON");
    assert_eq!(wire["error"]["code"], json!(-31999));
    assert_eq!(wire["error"]["message"], "gallery index locked");

    runtime.stop();
}
