//! Test helpers for the integration suite.
//!
//! Dispatcher and transport tests drive async code from plain `#[test]`
//! functions: the pool under test owns its own workers, and a small
//! current-thread client runtime stands in for the calling transport. That
//! keeps runtime construction and teardown in synchronous context, exactly
//! as the shell's main thread does it.

use rpc_core::rpc::protocol::RpcErrorBody;
use rpc_core::rpc::{MethodRegistry, RpcDispatcher};
use rpc_core::runtime::TaskRuntime;

use serde_json::Value;

use std::sync::Arc;
use std::time::{Duration, Instant};

pub const OBSERVE_TIMEOUT: Duration = Duration::from_secs(5);

/// A task runtime with two workers, already started.
pub fn started_runtime() -> Arc<TaskRuntime> {
    let runtime = Arc::new(TaskRuntime::new());
    runtime.start(2).expect("Failed to start task runtime");
    runtime
}

/// Current-thread runtime standing in for a calling transport.
pub fn client_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build client runtime")
}

/// Registry with a single "echo" method returning its params.
pub fn echo_registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    registry.register("echo", "Echo the params back", |params: Value| async move {
        Ok::<_, RpcErrorBody>(params)
    });
    registry
}

pub fn dispatcher_with(registry: MethodRegistry, runtime: &Arc<TaskRuntime>) -> Arc<RpcDispatcher> {
    Arc::new(RpcDispatcher::new(Arc::new(registry), Arc::clone(runtime)))
}

/// Spin until `predicate` holds, panicking after [`OBSERVE_TIMEOUT`].
pub fn wait_until(what: &str, predicate: impl Fn() -> bool) {
    let deadline = Instant::now() + OBSERVE_TIMEOUT;
    while !predicate() {
        assert!(Instant::now() < deadline, "Timed out waiting for {what}");
        std::thread::sleep(Duration::from_millis(10));
    }
}
