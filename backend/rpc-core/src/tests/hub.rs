// Unit tests for the notification hub fan-out

use crate::error::transport::TransportError;
use crate::hub::{NotificationHub, NotificationSink};

use common::ErrorLocation;

use serde_json::{Value, json};

use std::sync::{Arc, Mutex};

struct RecordingSink {
    payloads: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            payloads: Mutex::new(Vec::new()),
        })
    }
}

impl NotificationSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn deliver(&self, payload: &str) -> Result<(), TransportError> {
        self.payloads.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

struct FailingSink;

impl NotificationSink for FailingSink {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn deliver(&self, _payload: &str) -> Result<(), TransportError> {
        Err(TransportError::Send {
            message: String::from("peer is gone"),
            location: ErrorLocation::here(),
        })
    }
}

/// **VALUE**: Verifies that one failing sink never blocks or skips the others.
///
/// **WHY THIS MATTERS**: The bridge link is routinely absent (webview not up
/// yet, or already torn down); broadcast subscribers must still get every
/// notification.
///
/// **BUG THIS CATCHES**: Would catch a fan-out loop that short-circuits on
/// the first sink error.
#[test]
fn given_failing_sink_first_when_send_then_remaining_sinks_receive() {
    // GIVEN: A hub whose first sink always fails
    let recording = RecordingSink::new();
    let mut hub = NotificationHub::new();
    hub.add_sink(Arc::new(FailingSink));
    hub.add_sink(Arc::clone(&recording) as Arc<dyn NotificationSink>);
    assert_eq!(hub.sink_count(), 2);

    // WHEN: A notification is sent
    hub.send("capture.finished", json!({"path": "shot.png"}));

    // THEN: The healthy sink received a well-formed envelope
    let payloads = recording.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);

    let wire: Value = serde_json::from_str(&payloads[0]).expect("valid JSON");
    assert_eq!(wire["method"], "capture.finished");
    assert_eq!(wire["params"]["path"], "shot.png");
    assert!(wire.get("id").is_none());
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that every sink receives the identical payload.
#[test]
fn given_two_sinks_when_send_then_both_receive_same_payload() {
    let first = RecordingSink::new();
    let second = RecordingSink::new();

    let mut hub = NotificationHub::new();
    hub.add_sink(Arc::clone(&first) as Arc<dyn NotificationSink>);
    hub.add_sink(Arc::clone(&second) as Arc<dyn NotificationSink>);

    hub.send("app.status", json!({"uptime_secs": 12}));

    let first_payloads = first.payloads.lock().unwrap();
    let second_payloads = second.payloads.lock().unwrap();
    assert_eq!(*first_payloads, *second_payloads);
    assert_eq!(first_payloads.len(), 1);
}
