//! Transport adapters carrying RPC and notification bytes.
//!
//! Two transports exist: the in-process [`bridge`] to the embedded UI
//! surface and the [`broadcast`] WebSocket server for same-host
//! subscribers. Both hand inbound payloads to the dispatcher and accept
//! outbound payloads from the notification hub; their internal framing is
//! their own business.

pub mod bridge;
pub mod broadcast;

pub use bridge::{BridgePeer, BridgeTransport, start_bridge};
pub use broadcast::{BroadcastServer, start_broadcast_server};
