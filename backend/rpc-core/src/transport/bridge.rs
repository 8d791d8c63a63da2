//! In-process bridge to the embedded UI surface.
//!
//! The bridge is a pair of unbounded channels: the native side posts
//! serialized payloads toward the page, the webview glue feeds raw page
//! messages back in. Each inbound message is dispatched on its own task, so
//! a suspended handler never stalls the rest of the bridge; responses may
//! therefore arrive out of order and are correlated by request `id`.

use crate::error::runtime::RuntimeError;
use crate::error::transport::TransportError;
use crate::hub::NotificationSink;
use crate::rpc::RpcDispatcher;
use crate::runtime::TaskRuntime;

use common::ErrorLocation;

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;

/// Native half of the bridge. Held by the application context; also serves
/// as the hub's bridge sink.
pub struct BridgeTransport {
    outbound_tx: mpsc::UnboundedSender<String>,
}

/// Glue half of the bridge. The embedded-browser integration owns this: it
/// forwards `outbound` payloads into the page and feeds raw page messages
/// through [`BridgePeer::send`].
pub struct BridgePeer {
    pub outbound: mpsc::UnboundedReceiver<String>,
    inbound_tx: mpsc::UnboundedSender<String>,
}

/// Start the bridge: spawns the inbound dispatch loop on the task runtime
/// and returns both halves.
///
/// # Errors
///
/// Returns [`RuntimeError::NotRunning`] if the task runtime is down.
pub fn start_bridge(
    runtime: &TaskRuntime,
    dispatcher: Arc<RpcDispatcher>,
) -> Result<(BridgeTransport, BridgePeer), RuntimeError> {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

    runtime.submit(inbound_loop(inbound_rx, dispatcher, outbound_tx.clone()))?;

    info!("Bridge transport started");

    Ok((
        BridgeTransport { outbound_tx },
        BridgePeer {
            outbound: outbound_rx,
            inbound_tx,
        },
    ))
}

/// Reads raw messages from the page and dispatches each on its own task.
async fn inbound_loop(
    mut inbound_rx: mpsc::UnboundedReceiver<String>,
    dispatcher: Arc<RpcDispatcher>,
    outbound_tx: mpsc::UnboundedSender<String>,
) {
    while let Some(raw) = inbound_rx.recv().await {
        let dispatcher = Arc::clone(&dispatcher);
        let outbound = outbound_tx.clone();

        tokio::spawn(async move {
            if let Some(response) = dispatcher.dispatch(&raw).await {
                if outbound.send(response).is_err() {
                    warn!("Bridge peer is gone, response dropped");
                }
            }
        });
    }

    debug!("Bridge inbound loop ended");
}

impl BridgeTransport {
    /// Queue one payload for the embedded UI.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] when the peer half has been dropped
    /// (the webview is gone).
    pub fn post(&self, payload: impl Into<String>) -> Result<(), TransportError> {
        self.outbound_tx
            .send(payload.into())
            .map_err(|e| TransportError::Send {
                message: format!("Bridge peer is gone: {e}"),
                location: ErrorLocation::here(),
            })
    }
}

impl BridgePeer {
    /// Feed one raw message from the embedded page into the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] when the inbound loop has exited
    /// (runtime shut down).
    pub fn send(&self, raw: impl Into<String>) -> Result<(), TransportError> {
        self.inbound_tx
            .send(raw.into())
            .map_err(|e| TransportError::Send {
                message: format!("Bridge inbound loop is gone: {e}"),
                location: ErrorLocation::here(),
            })
    }
}

impl NotificationSink for BridgeTransport {
    fn name(&self) -> &'static str {
        "bridge"
    }

    fn deliver(&self, payload: &str) -> Result<(), TransportError> {
        self.post(payload)
    }
}
