//! Shell-level methods: version, shutdown, and method introspection.

use crate::context::AppContext;

use rpc_core::rpc::MethodRegistry;
use rpc_core::rpc::protocol::RpcErrorBody;

use serde::Serialize;

use std::sync::Arc;

use log::info;

const DESCRIBE_METHOD: &str = "system.describe";
const DESCRIBE_DESCRIPTION: &str = "List every registered method in registration order";

#[derive(Debug, Clone, Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct MethodInfo {
    name: String,
    description: String,
}

pub fn register(registry: &mut MethodRegistry, context: &Arc<AppContext>) {
    registry.register(
        "app.version",
        "Application name and version",
        |_: ()| async move {
            Ok::<_, RpcErrorBody>(VersionInfo {
                name: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            })
        },
    );

    let shutdown_context = Arc::clone(context);
    registry.register(
        "app.shutdown",
        "Request an orderly shutdown of the shell",
        move |_: ()| {
            let context = Arc::clone(&shutdown_context);
            async move {
                info!("Shutdown requested over RPC");
                context.request_shutdown();
                Ok::<_, RpcErrorBody>(true)
            }
        },
    );
}

/// Register the introspection method. Must run after every other
/// registration: it snapshots the listing at composition time.
pub fn register_describe(registry: &mut MethodRegistry) {
    let mut listing: Vec<MethodInfo> = registry
        .descriptors()
        .map(|descriptor| MethodInfo {
            name: descriptor.name().to_string(),
            description: descriptor.description().to_string(),
        })
        .collect();

    // The listing includes this method as well.
    listing.push(MethodInfo {
        name: DESCRIBE_METHOD.to_string(),
        description: DESCRIBE_DESCRIPTION.to_string(),
    });

    registry.register(DESCRIBE_METHOD, DESCRIBE_DESCRIPTION, move |_: ()| {
        let listing = listing.clone();
        async move { Ok::<_, RpcErrorBody>(listing) }
    });
}
