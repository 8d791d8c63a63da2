// Unit tests for the wire envelope types

use crate::rpc::protocol::{
    INVALID_REQUEST, Notification, RpcErrorBody, RpcRequest, RpcResponse, SERVER_ERROR,
};

use serde_json::{Value, json};

/// **VALUE**: Verifies the success envelope shape on the wire.
///
/// **WHY THIS MATTERS**: The frontend pattern-matches on the presence of
/// `result` vs `error`; emitting both (or neither) breaks every caller.
#[test]
fn given_success_response_when_serialized_then_result_present_and_error_absent() {
    let response = RpcResponse::success(json!(7), json!({"x": 1}));
    let wire: Value = serde_json::from_str(&response.to_json()).expect("valid JSON");

    assert_eq!(wire["jsonrpc"], "2.0");
    assert_eq!(wire["result"], json!({"x": 1}));
    assert_eq!(wire["id"], json!(7));
    assert!(
        wire.get("error").is_none(),
        "Success envelope must not carry an error field"
    );
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies the error envelope shape on the wire.
#[test]
fn given_failure_response_when_serialized_then_error_present_and_result_absent() {
    let response = RpcResponse::failure(
        json!("req-9"),
        RpcErrorBody::new(SERVER_ERROR, "capture device busy"),
    );
    let wire: Value = serde_json::from_str(&response.to_json()).expect("valid JSON");

    assert_eq!(wire["error"]["code"], json!(SERVER_ERROR));
    assert_eq!(wire["error"]["message"], "capture device busy");
    assert_eq!(wire["id"], "req-9");
    assert!(
        wire.get("result").is_none(),
        "Error envelope must not carry a result field"
    );
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that notifications carry no `id` at all.
#[test]
fn given_notification_when_serialized_then_no_id_field() {
    let notification = Notification::new("capture.finished", json!({"path": "shot.png"}));
    let wire: Value = serde_json::from_str(&notification.to_json()).expect("valid JSON");

    assert_eq!(wire["jsonrpc"], "2.0");
    assert_eq!(wire["method"], "capture.finished");
    assert!(
        wire.get("id").is_none(),
        "Notifications must not carry an id"
    );
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies envelope validation failures and the echoed id.
///
/// **BUG THIS CATCHES**: Would catch validation that loses the caller's id,
/// making the error impossible to correlate on the frontend.
#[test]
fn given_missing_method_when_validated_then_invalid_request_with_echoed_id() {
    let result = RpcRequest::from_value(json!({"jsonrpc": "2.0", "id": 3}));

    let response = result.expect_err("missing method must be rejected");
    let wire: Value = serde_json::from_str(&response.to_json()).expect("valid JSON");
    assert_eq!(wire["error"]["code"], json!(INVALID_REQUEST));
    assert_eq!(wire["id"], json!(3));
}

// -------------------------------------------------------------------------- //

#[test]
fn given_non_string_method_when_validated_then_invalid_request() {
    let result = RpcRequest::from_value(json!({"method": 12, "id": 1}));
    assert!(result.is_err());
}

// -------------------------------------------------------------------------- //

#[test]
fn given_non_object_envelope_when_validated_then_invalid_request_with_null_id() {
    let result = RpcRequest::from_value(json!([1, 2, 3]));

    let response = result.expect_err("array envelope must be rejected");
    let wire: Value = serde_json::from_str(&response.to_json()).expect("valid JSON");
    assert_eq!(wire["id"], Value::Null);
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies the fire-and-forget marker for both null and absent id.
#[test]
fn given_null_or_absent_id_when_validated_then_notification() {
    let explicit = RpcRequest::from_value(json!({"method": "app.shutdown", "id": null}))
        .expect("valid envelope");
    assert!(explicit.is_notification());

    let absent = RpcRequest::from_value(json!({"method": "app.shutdown"})).expect("valid envelope");
    assert!(absent.is_notification());

    let addressed = RpcRequest::from_value(json!({"method": "app.version", "id": 1}))
        .expect("valid envelope");
    assert!(!addressed.is_notification());
}
