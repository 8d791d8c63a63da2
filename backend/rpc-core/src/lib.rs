//! Local RPC and event-distribution core for the Glint desktop shell.
//!
//! This crate lets a UI surface (the embedded web view and optional
//! same-host subscribers) invoke typed operations on the native process, and
//! lets background work reach the single UI-affine thread safely. It has to
//! reconcile three constraints:
//!
//! - RPC handlers run concurrently on a worker pool and may suspend
//!   mid-operation
//! - many native operations are only safe on one designated thread
//! - one logical event fans out to heterogeneous transports without a slow
//!   consumer blocking another
//!
//! # Components
//!
//! - [`runtime::TaskRuntime`] - the worker pool everything else schedules on
//! - [`rpc::MethodRegistry`] / [`rpc::RpcDispatcher`] - named methods and
//!   request dispatch over a minimal JSON-RPC dialect
//! - [`mailbox::EventMailbox`] - cross-thread queue drained by the UI-affine
//!   thread
//! - [`hub::NotificationHub`] - outbound fan-out to every transport sink
//! - [`transport`] - the in-process bridge and the broadcast WebSocket server

pub mod config;
pub mod error;
pub mod hub;
pub mod mailbox;
pub mod rpc;
pub mod runtime;
pub mod transport;

#[cfg(test)]
mod tests;

pub const BROADCAST_HOSTNAME: &str = "127.0.0.1";
pub const BROADCAST_BASE_URL: &str = const_format::concatcp!("ws://", BROADCAST_HOSTNAME);
pub const DEFAULT_BROADCAST_PORT: u16 = 18967;
