use crate::helpers::{
    OBSERVE_TIMEOUT, client_runtime, dispatcher_with, echo_registry, started_runtime,
};

use rpc_core::hub::{NotificationHub, NotificationSink};
use rpc_core::transport::start_bridge;

use serde_json::{Value, json};
use tokio::time::timeout;

use std::sync::Arc;
use std::time::Duration;

/// **VALUE**: Verifies the request/response loop through the in-process
/// bridge.
///
/// **WHY THIS MATTERS**: The bridge is the embedded UI's only path to the
/// native process; a broken inbound loop means a frozen frontend.
///
/// **BUG THIS CATCHES**: Would catch a dispatch loop that drops messages,
/// never posts responses, or deadlocks on its own channels.
#[test]
fn given_bridge_started_when_peer_sends_request_then_response_posted() {
    // GIVEN: A bridge over an echo dispatcher
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let (_bridge, mut peer) =
        start_bridge(&runtime, dispatcher).expect("Failed to start bridge");

    // WHEN: The page side feeds a raw request in
    peer.send(r#"{"jsonrpc":"2.0","method":"echo","params":{"x":1},"id":7}"#)
        .expect("send");

    // THEN: The response arrives on the outbound channel
    let client = client_runtime();
    let response = client
        .block_on(async { timeout(OBSERVE_TIMEOUT, peer.outbound.recv()).await })
        .expect("Timed out waiting for bridge response")
        .expect("Bridge outbound channel closed");

    let wire: Value = serde_json::from_str(&response).expect("valid JSON");
    assert_eq!(wire["result"], json!({"x": 1}));
    assert_eq!(wire["id"], json!(7));

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that fire-and-forget calls over the bridge stay
/// silent.
#[test]
fn given_bridge_when_notification_sent_then_no_response_posted() {
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let (_bridge, mut peer) =
        start_bridge(&runtime, dispatcher).expect("Failed to start bridge");

    peer.send(r#"{"jsonrpc":"2.0","method":"echo","params":{"x":1},"id":null}"#)
        .expect("send");

    let client = client_runtime();
    let result =
        client.block_on(async { timeout(Duration::from_millis(300), peer.outbound.recv()).await });
    assert!(
        result.is_err(),
        "Fire-and-forget must not produce a bridge response"
    );

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that a missing peer surfaces as a send error, which
/// the hub absorbs without skipping other sinks.
#[test]
fn given_peer_dropped_when_posting_then_send_error() {
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let (bridge, peer) = start_bridge(&runtime, dispatcher).expect("Failed to start bridge");

    drop(peer);

    assert!(
        bridge.post("{}").is_err(),
        "Posting to a dropped peer must fail, not silently succeed"
    );

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies the bridge as a notification hub sink end to end.
#[test]
fn given_bridge_sink_when_hub_sends_then_peer_receives_notification() {
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let (bridge, mut peer) =
        start_bridge(&runtime, dispatcher).expect("Failed to start bridge");

    let mut hub = NotificationHub::new();
    hub.add_sink(Arc::new(bridge) as Arc<dyn NotificationSink>);

    hub.send("window.resized", json!({"width": 100, "height": 50}));

    let client = client_runtime();
    let payload = client
        .block_on(async { timeout(OBSERVE_TIMEOUT, peer.outbound.recv()).await })
        .expect("Timed out waiting for notification")
        .expect("Bridge outbound channel closed");

    let wire: Value = serde_json::from_str(&payload).expect("valid JSON");
    assert_eq!(wire["method"], "window.resized");
    assert_eq!(wire["params"]["width"], 100);
    assert!(wire.get("id").is_none());

    runtime.stop();
}
