use crate::helpers::{
    OBSERVE_TIMEOUT, client_runtime, dispatcher_with, echo_registry, started_runtime, wait_until,
};

use rpc_core::mailbox::{Event, EventKind, EventMailbox};
use rpc_core::transport::start_broadcast_server;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use std::sync::{Arc, Mutex};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(port: u16) -> WsClient {
    let url = format!("ws://127.0.0.1:{port}");
    let (ws_stream, _) = connect_async(&url)
        .await
        .expect("Failed to connect to broadcast server");
    ws_stream
}

async fn receive_text(ws: &mut WsClient) -> String {
    loop {
        let message = timeout(OBSERVE_TIMEOUT, ws.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Connection closed unexpectedly")
            .expect("Read error");
        if let Message::Text(text) = message {
            return text.to_string();
        }
    }
}

/// **VALUE**: Verifies RPC request/response over a real subscriber socket.
///
/// **WHY THIS MATTERS**: Same-host subscribers are full RPC callers, not just
/// listeners. If the inbound path through the WebSocket layer breaks, remote
/// tooling loses every operation.
///
/// **BUG THIS CATCHES**: Would catch broken text-frame handling, responses
/// sent to the wrong connection, or a dispatcher that never replies.
#[test]
fn given_connected_subscriber_when_request_sent_then_response_received() {
    // GIVEN: A broadcast server with an echo method on an ephemeral port
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let mailbox = Arc::new(EventMailbox::new());
    let handle = runtime.handle().expect("runtime is running");
    let server = handle
        .block_on(start_broadcast_server(0, dispatcher, Arc::clone(&mailbox)))
        .expect("Failed to start broadcast server");

    let client = client_runtime();
    client.block_on(async {
        // WHEN: A subscriber connects and sends a request
        let mut ws = connect(server.local_addr().port()).await;
        ws.send(Message::Text(
            r#"{"jsonrpc":"2.0","method":"echo","params":{"x":1},"id":7}"#.into(),
        ))
        .await
        .expect("send");

        // THEN: The response comes back on the same connection
        let response = receive_text(&mut ws).await;
        let wire: Value = serde_json::from_str(&response).expect("valid JSON");
        assert_eq!(wire["result"], json!({"x": 1}));
        assert_eq!(wire["id"], json!(7));
    });

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies fan-out of one payload to every live subscriber.
///
/// **WHY THIS MATTERS**: Notifications must reach all subscribers without one
/// slow consumer blocking another; the broadcast primitive is the only path
/// the hub has to them.
#[test]
fn given_two_subscribers_when_broadcast_then_both_receive_payload() {
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let mailbox = Arc::new(EventMailbox::new());
    let handle = runtime.handle().expect("runtime is running");
    let server = handle
        .block_on(start_broadcast_server(0, dispatcher, Arc::clone(&mailbox)))
        .expect("Failed to start broadcast server");

    let client = client_runtime();
    let (mut first, mut second) = client.block_on(async {
        let first = connect(server.local_addr().port()).await;
        let second = connect(server.local_addr().port()).await;
        (first, second)
    });

    wait_until("both subscribers registered", || {
        server.connection_count() == 2
    });

    server.broadcast(String::from(
        r#"{"jsonrpc":"2.0","method":"capture.finished","params":{"path":"shot.png"}}"#,
    ));

    client.block_on(async {
        for ws in [&mut first, &mut second] {
            let payload = receive_text(ws).await;
            let wire: Value = serde_json::from_str(&payload).expect("valid JSON");
            assert_eq!(wire["method"], "capture.finished");
        }
    });

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies the connection-count accessor and the
/// ConnectionsChanged events published on connect/disconnect.
///
/// **WHY THIS MATTERS**: The UI surfaces the subscriber count, and a dead
/// subscriber must be dropped by the transport so the hub never has to care.
#[test]
fn given_subscriber_lifecycle_then_count_tracks_and_events_published() {
    let runtime = started_runtime();
    let dispatcher = dispatcher_with(echo_registry(), &runtime);
    let mailbox = Arc::new(EventMailbox::new());

    // GIVEN: A UI-affine subscriber recording count changes
    let observed = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&observed);
    mailbox.subscribe(EventKind::ConnectionsChanged, move |event| {
        if let Event::ConnectionsChanged { count } = event {
            recorder.lock().unwrap().push(*count);
        }
    });

    let handle = runtime.handle().expect("runtime is running");
    let server = handle
        .block_on(start_broadcast_server(0, dispatcher, Arc::clone(&mailbox)))
        .expect("Failed to start broadcast server");
    assert_eq!(server.connection_count(), 0);

    // WHEN: A subscriber connects and then disconnects
    let client = client_runtime();
    let ws = client.block_on(connect(server.local_addr().port()));
    wait_until("subscriber connected", || server.connection_count() == 1);

    drop(ws);
    wait_until("subscriber dropped", || server.connection_count() == 0);

    // THEN: Draining on the consumer thread observes both transitions
    mailbox.drain();
    assert_eq!(*observed.lock().unwrap(), vec![1, 0]);

    runtime.stop();
}
