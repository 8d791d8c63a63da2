//! Broadcast transport: WebSocket fan-out to same-host subscribers.
//!
//! The server:
//!
//! - listens on localhost only and rejects non-loopback peers at accept time
//! - maintains each subscriber connection independently; a slow or dead
//!   subscriber is dropped by its own connection task and never affects the
//!   others
//! - accepts inbound RPC requests on any connection and replies on the same
//!   connection
//!
//! Outbound fan-out rides a bounded broadcast channel: `broadcast()` never
//! blocks, and a subscriber that falls behind the channel capacity observes
//! a lag notice and skips the oldest payloads.

use crate::error::transport::TransportError;
use crate::hub::NotificationSink;
use crate::mailbox::{Event, EventMailbox};
use crate::rpc::RpcDispatcher;

use common::ErrorLocation;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

/// Ring capacity shared by all subscribers; beyond it, laggards skip.
const BROADCAST_CHANNEL_CAPACITY: usize = 256;

/// Handle to the running broadcast server. Also serves as the hub's
/// broadcast sink.
pub struct BroadcastServer {
    tx: broadcast::Sender<String>,
    connections: Arc<AtomicUsize>,
    local_addr: SocketAddr,
}

/// Bind the listener and spawn the accept loop as a background task.
///
/// `port == 0` selects an ephemeral port; the bound address is available via
/// [`BroadcastServer::local_addr`]. Connection lifecycle changes are
/// published to the mailbox as [`Event::ConnectionsChanged`].
///
/// # Errors
///
/// Returns [`TransportError::Bind`] if the port is taken or the interface is
/// unavailable.
pub async fn start_broadcast_server(
    port: u16,
    dispatcher: Arc<RpcDispatcher>,
    mailbox: Arc<EventMailbox>,
) -> Result<BroadcastServer, TransportError> {
    let address = format!("{}:{}", crate::BROADCAST_HOSTNAME, port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| TransportError::Bind {
            message: format!("Failed to bind {address}: {e}"),
            location: ErrorLocation::here(),
        })?;

    let local_addr = listener.local_addr().map_err(|e| TransportError::Bind {
        message: format!("Failed to read bound address: {e}"),
        location: ErrorLocation::here(),
    })?;

    let (tx, _rx) = broadcast::channel(BROADCAST_CHANNEL_CAPACITY);
    let connections = Arc::new(AtomicUsize::new(0));

    info!("Broadcast server listening on {local_addr}");

    let accept_tx = tx.clone();
    let accept_connections = Arc::clone(&connections);
    tokio::spawn(async move {
        while let Ok((stream, addr)) = listener.accept().await {
            debug!("Subscriber connecting from {addr}");
            tokio::spawn(handle_connection(
                stream,
                addr,
                accept_tx.subscribe(),
                Arc::clone(&dispatcher),
                Arc::clone(&accept_connections),
                Arc::clone(&mailbox),
            ));
        }
    });

    Ok(BroadcastServer {
        tx,
        connections,
        local_addr,
    })
}

impl BroadcastServer {
    /// Current number of live subscriber connections.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Queue one payload for every live subscriber. Never blocks; with no
    /// subscribers the payload is simply dropped.
    pub fn broadcast(&self, payload: String) {
        let _ = self.tx.send(payload);
    }
}

impl NotificationSink for BroadcastServer {
    fn name(&self) -> &'static str {
        "broadcast"
    }

    fn deliver(&self, payload: &str) -> Result<(), TransportError> {
        // Zero receivers is not a fault; the payload just has nowhere to go.
        let _ = self.tx.send(payload.to_string());
        Ok(())
    }
}

/// Serve one subscriber connection until it drops or fails.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    mut feed: broadcast::Receiver<String>,
    dispatcher: Arc<RpcDispatcher>,
    connections: Arc<AtomicUsize>,
    mailbox: Arc<EventMailbox>,
) {
    if !addr.ip().is_loopback() {
        warn!("Rejected non-loopback subscriber from {addr}");
        return;
    }

    let ws_stream = match accept_async(stream).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            error!("WebSocket handshake with {addr} failed: {e}");
            return;
        }
    };

    let conn_id = Uuid::new_v4();
    let count = connections.fetch_add(1, Ordering::SeqCst) + 1;
    info!("Subscriber {conn_id} connected from {addr} ({count} active)");
    mailbox.publish(Event::ConnectionsChanged { count });

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(raw))) => {
                    if let Some(response) = dispatcher.dispatch(raw.as_str()).await {
                        if let Err(e) = write.send(Message::Text(response.into())).await {
                            warn!("Subscriber {conn_id} dropped while replying: {e}");
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {
                    debug!("Subscriber {conn_id} sent a non-text frame, ignored");
                }
                Some(Err(e)) => {
                    warn!("Read error from subscriber {conn_id}: {e}");
                    break;
                }
            },
            outbound = feed.recv() => match outbound {
                Ok(payload) => {
                    if let Err(e) = write.send(Message::Text(payload.into())).await {
                        warn!("Subscriber {conn_id} dropped during broadcast: {e}");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Subscriber {conn_id} lagged, {skipped} notification(s) skipped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    let count = connections.fetch_sub(1, Ordering::SeqCst) - 1;
    info!("Subscriber {conn_id} disconnected ({count} active)");
    mailbox.publish(Event::ConnectionsChanged { count });
}
