//! Window feature: RPC surface for window geometry.
//!
//! Window handles are UI-affine, so the handler never touches them from a
//! worker thread: it validates and publishes a [`Event::Resize`], and the
//! UI-thread subscriber applies the size and announces the result.

use crate::context::AppContext;

use rpc_core::hub::NotificationHub;
use rpc_core::mailbox::{Event, EventKind};
use rpc_core::rpc::MethodRegistry;
use rpc_core::rpc::protocol::RpcErrorBody;

use serde::Deserialize;
use serde_json::json;

use std::sync::Arc;

use log::info;

const MIN_DIMENSION: u32 = 16;
const MAX_DIMENSION: u32 = 16384;

#[derive(Debug, Deserialize)]
struct ResizeParams {
    width: u32,
    height: u32,
}

pub fn register(registry: &mut MethodRegistry, context: &Arc<AppContext>) {
    let resize_context = Arc::clone(context);
    registry.register(
        "window.resize",
        "Resize the shell window",
        move |params: ResizeParams| {
            let context = Arc::clone(&resize_context);
            async move {
                let in_range = |value: u32| (MIN_DIMENSION..=MAX_DIMENSION).contains(&value);
                if !in_range(params.width) || !in_range(params.height) {
                    return Err(RpcErrorBody::server_error(format!(
                        "Window size {}x{} is out of range",
                        params.width, params.height
                    )));
                }

                context.mailbox.publish(Event::Resize {
                    width: params.width,
                    height: params.height,
                });
                Ok(true)
            }
        },
    );
}

pub fn subscribe(context: &Arc<AppContext>, hub: &Arc<NotificationHub>) {
    let hub = Arc::clone(hub);
    context.mailbox.subscribe(EventKind::Resize, move |event| {
        if let Event::Resize { width, height } = event {
            // The native window applies the size here; windowing itself is
            // outside the shell, the announcement contract is not.
            info!("Applying window size {width}x{height}");
            hub.send("window.resized", json!({"width": width, "height": height}));
        }
    });
}
