//! Notification hub: one named payload out, every transport sink in.
//!
//! `send` pushes unconditionally to all configured sinks and never waits for
//! delivery confirmation. A failing sink (e.g. the bridge peer is gone) is
//! logged and skipped; the remaining sinks still receive the payload. Slow
//! or dead broadcast subscribers are the transport layer's problem, never
//! the hub's.

use crate::error::transport::TransportError;
use crate::rpc::protocol::Notification;

use serde_json::Value;

use std::sync::Arc;

use log::{debug, warn};

/// One outbound delivery target.
///
/// Implementations must not block on slow consumers; handing the payload to
/// a queue or broadcast channel is enough.
pub trait NotificationSink: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Hand one serialized notification to the transport.
    fn deliver(&self, payload: &str) -> Result<(), TransportError>;
}

/// Fan-out point for outbound notifications.
///
/// Sinks are added during startup composition; afterwards the hub is shared
/// read-only.
#[derive(Default)]
pub struct NotificationHub {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Arc<dyn NotificationSink>) {
        debug!("Notification sink {:?} attached", sink.name());
        self.sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Push one named notification to every sink.
    ///
    /// The envelope is serialized once. Failures are per-sink: logged at
    /// warning level and absorbed, so one missing transport never blocks or
    /// skips the others.
    pub fn send(&self, method: &str, params: Value) {
        let payload = Notification::new(method, params).to_json();

        for sink in &self.sinks {
            if let Err(e) = sink.deliver(&payload) {
                warn!("Notification {method:?} not delivered to {}: {e}", sink.name());
            }
        }
    }
}
