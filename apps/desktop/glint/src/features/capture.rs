//! Capture feature: forwards capture outcomes to every transport.
//!
//! The capture pipeline itself lives outside the shell; it reports results
//! by publishing mailbox events from its worker threads. The subscribers
//! here run on the UI thread and turn those events into notifications.

use crate::context::AppContext;

use rpc_core::hub::NotificationHub;
use rpc_core::mailbox::{Event, EventKind};

use serde_json::json;

use std::sync::Arc;

use log::warn;

pub fn subscribe(context: &Arc<AppContext>, hub: &Arc<NotificationHub>) {
    let finished_hub = Arc::clone(hub);
    context
        .mailbox
        .subscribe(EventKind::CaptureCompleted, move |event| {
            if let Event::CaptureCompleted { path } = event {
                finished_hub.send(
                    "capture.finished",
                    json!({"path": path.display().to_string()}),
                );
            }
        });

    let failed_hub = Arc::clone(hub);
    context
        .mailbox
        .subscribe(EventKind::CaptureFailed, move |event| {
            if let Event::CaptureFailed { reason } = event {
                warn!("Capture failed: {reason}");
                failed_hub.send("capture.failed", json!({"reason": reason}));
            }
        });
}
