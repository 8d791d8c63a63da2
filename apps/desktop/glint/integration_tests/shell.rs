//! Full composition test: the shell wired exactly as `main` does it (minus
//! the logger and the real sockets), driven through the bridge transport.

use glint::context::AppContext;
use glint::features;

use rpc_core::config::AppConfig;
use rpc_core::hub::{NotificationHub, NotificationSink};
use rpc_core::rpc::{MethodRegistry, RpcDispatcher};
use rpc_core::runtime::TaskRuntime;
use rpc_core::transport::{BridgePeer, start_bridge};

use serde_json::Value;
use tokio::time::timeout;

use std::sync::Arc;
use std::time::{Duration, Instant};

const OBSERVE_TIMEOUT: Duration = Duration::from_secs(5);

struct ComposedShell {
    context: Arc<AppContext>,
    runtime: Arc<TaskRuntime>,
    peer: BridgePeer,
    client: tokio::runtime::Runtime,
}

/// Wire the stack the way `main` does: runtime, feature registration,
/// dispatcher, bridge, hub, subscribers.
fn compose() -> ComposedShell {
    let context = Arc::new(AppContext::new(AppConfig::default()));

    let runtime = Arc::new(TaskRuntime::new());
    runtime.start(2).expect("Failed to start task runtime");

    let mut registry = MethodRegistry::new();
    features::register_methods(&mut registry, &context);
    let registry = Arc::new(registry);

    let dispatcher = Arc::new(RpcDispatcher::new(
        Arc::clone(&registry),
        Arc::clone(&runtime),
    ));

    let (bridge, peer) = start_bridge(&runtime, dispatcher).expect("Failed to start bridge");

    let mut hub = NotificationHub::new();
    hub.add_sink(Arc::new(bridge) as Arc<dyn NotificationSink>);
    let hub = Arc::new(hub);

    features::register_subscribers(&context, &hub);

    let client = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build client runtime");

    ComposedShell {
        context,
        runtime,
        peer,
        client,
    }
}

impl ComposedShell {
    fn roundtrip(&mut self, raw: &str) -> Value {
        self.peer.send(raw).expect("bridge send");
        let response = self
            .client
            .block_on(async { timeout(OBSERVE_TIMEOUT, self.peer.outbound.recv()).await })
            .expect("Timed out waiting for bridge payload")
            .expect("Bridge outbound channel closed");
        serde_json::from_str(&response).expect("valid JSON")
    }
}

/// **VALUE**: Verifies the composed shell answers its built-in methods.
///
/// **WHY THIS MATTERS**: This is the same wiring `main` performs; if feature
/// registration, dispatch, or the bridge loop regress, the frontend's very
/// first call (`app.version`) fails.
#[test]
fn given_composed_shell_when_version_requested_then_name_and_version_returned() {
    let mut shell = compose();

    let wire =
        shell.roundtrip(r#"{"jsonrpc":"2.0","method":"app.version","params":null,"id":1}"#);

    assert_eq!(wire["result"]["name"], "glint");
    assert!(
        wire["result"]["version"]
            .as_str()
            .is_some_and(|v| !v.is_empty())
    );

    shell.runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies the full UI-affine round trip: RPC handler publishes
/// an event, the consumer thread drains it, and the subscriber announces the
/// result back through the hub.
///
/// **WHY THIS MATTERS**: This path is the whole point of the mailbox: a
/// worker-thread handler must never touch the window directly, yet the
/// frontend still has to see `window.resized`.
///
/// **BUG THIS CATCHES**: Would catch a handler applying UI effects on the
/// worker thread, a drain that loses events, or a subscriber that never
/// reaches the hub.
#[test]
fn given_resize_request_when_drained_on_ui_thread_then_resized_notification_follows() {
    let mut shell = compose();

    // WHEN: The frontend asks for a resize
    let wire = shell.roundtrip(
        r#"{"jsonrpc":"2.0","method":"window.resize","params":{"width":800,"height":600},"id":2}"#,
    );
    assert_eq!(wire["result"], true);

    // AND: This thread (the designated consumer) drains the mailbox
    assert_eq!(shell.context.mailbox.drain(), 1);

    // THEN: The announcement arrives over the bridge
    let payload = shell
        .client
        .block_on(async { timeout(OBSERVE_TIMEOUT, shell.peer.outbound.recv()).await })
        .expect("Timed out waiting for notification")
        .expect("Bridge outbound channel closed");
    let wire: Value = serde_json::from_str(&payload).expect("valid JSON");
    assert_eq!(wire["method"], "window.resized");
    assert_eq!(wire["params"]["width"], 800);
    assert_eq!(wire["params"]["height"], 600);

    shell.runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that an out-of-range resize is a domain error and no
/// event reaches the mailbox.
#[test]
fn given_out_of_range_resize_then_server_error_and_no_event() {
    let mut shell = compose();

    let wire = shell.roundtrip(
        r#"{"jsonrpc":"2.0","method":"window.resize","params":{"width":1,"height":600},"id":3}"#,
    );

    assert!(wire.get("result").is_none());
    assert!(wire["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("out of range")));
    assert_eq!(shell.context.mailbox.drain(), 0);

    shell.runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies the introspection listing covers the composed methods.
#[test]
fn given_composed_shell_when_described_then_all_methods_listed() {
    let mut shell = compose();

    let wire =
        shell.roundtrip(r#"{"jsonrpc":"2.0","method":"system.describe","params":null,"id":4}"#);

    let names: Vec<&str> = wire["result"]
        .as_array()
        .expect("listing is an array")
        .iter()
        .filter_map(|entry| entry["name"].as_str())
        .collect();

    assert_eq!(
        names,
        vec![
            "app.version",
            "app.shutdown",
            "window.resize",
            "system.describe"
        ]
    );

    shell.runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that a fire-and-forget `app.shutdown` stops the shell.
///
/// **WHY THIS MATTERS**: The frontend sends shutdown with a null id and
/// closes immediately; the flag must still flip even though no response is
/// ever produced.
#[test]
fn given_shutdown_notification_then_flag_flips_without_response() {
    let mut shell = compose();

    shell
        .peer
        .send(r#"{"jsonrpc":"2.0","method":"app.shutdown","params":null,"id":null}"#)
        .expect("bridge send");

    // The handler runs on the pool; poll the flag instead of a response.
    let deadline = Instant::now() + OBSERVE_TIMEOUT;
    while !shell.context.is_shutdown_requested() {
        assert!(
            Instant::now() < deadline,
            "Timed out waiting for shutdown flag"
        );
        std::thread::sleep(Duration::from_millis(10));
    }

    // No response bytes were produced for the null id.
    let result = shell
        .client
        .block_on(async { timeout(Duration::from_millis(300), shell.peer.outbound.recv()).await });
    assert!(result.is_err(), "Fire-and-forget must stay silent");

    shell.runtime.stop();
}
