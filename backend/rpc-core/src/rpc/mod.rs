//! Method registry and request dispatch.
//!
//! The wire format is a minimal JSON-RPC dialect intended for a single
//! trusted frontend plus optional same-host subscribers; it is not a public
//! network protocol. Feature modules register typed async handlers during
//! startup composition, the registry erases them once, and the dispatcher
//! routes inbound envelopes onto the task runtime.

pub mod dispatcher;
pub mod protocol;
pub mod registry;

pub use dispatcher::RpcDispatcher;
pub use protocol::{Notification, RpcErrorBody, RpcRequest, RpcResponse};
pub use registry::{MethodDescriptor, MethodRegistry};
