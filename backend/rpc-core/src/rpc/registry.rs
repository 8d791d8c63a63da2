//! Method registry: named, type-erased async handlers.
//!
//! Feature modules register strongly-typed handlers during startup
//! composition; each is wrapped exactly once into a descriptor that
//! deserializes params, invokes the handler, and serializes the result. The
//! registry is written at startup and read-only afterwards, so dispatch
//! needs no locking.

use crate::rpc::protocol::RpcErrorBody;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use log::{debug, warn};

/// Type-erased handler invocation result.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, RpcErrorBody>> + Send>>;

type ErasedHandler = Arc<dyn Fn(Value) -> HandlerFuture + Send + Sync>;

/// One registered method: unique name, human-readable description, and the
/// erased handler.
pub struct MethodDescriptor {
    name: String,
    description: String,
    handler: ErasedHandler,
}

impl MethodDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Run the handler against raw params. Params deserialization failures
    /// surface as `InvalidParams`, result serialization failures as
    /// `InternalError`; both stay on the value path, never as panics.
    pub fn invoke(&self, params: Value) -> HandlerFuture {
        (self.handler)(params)
    }
}

/// Mapping from method name to descriptor, with registration order retained
/// for introspection.
#[derive(Default)]
pub struct MethodRegistry {
    methods: HashMap<String, MethodDescriptor>,
    order: Vec<String>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed handler under a unique name.
    ///
    /// A duplicate name is rejected with a warning and the original handler
    /// is kept; two feature modules accidentally claiming the same method
    /// during startup composition must not silently shadow each other.
    pub fn register<P, R, F, Fut>(&mut self, name: &str, description: &str, handler: F)
    where
        P: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, RpcErrorBody>> + Send + 'static,
    {
        if self.methods.contains_key(name) {
            warn!("Method {name:?} is already registered; keeping the original handler");
            return;
        }

        let erased: ErasedHandler = Arc::new(move |params: Value| -> HandlerFuture {
            // Deserialize before entering the future so a params error never
            // crosses an await point.
            let typed = match serde_json::from_value::<P>(params) {
                Ok(typed) => typed,
                Err(e) => {
                    let error = RpcErrorBody::invalid_params(format!("Invalid params: {e}"));
                    return Box::pin(async move { Err(error) });
                }
            };

            let invocation = handler(typed);
            Box::pin(async move {
                match invocation.await {
                    Ok(result) => serde_json::to_value(result).map_err(|e| {
                        RpcErrorBody::internal(format!("Failed to serialize result: {e}"))
                    }),
                    Err(error) => Err(error),
                }
            })
        });

        self.methods.insert(
            name.to_string(),
            MethodDescriptor {
                name: name.to_string(),
                description: description.to_string(),
                handler: erased,
            },
        );
        self.order.push(name.to_string());

        debug!("Method {name:?} registered");
    }

    pub fn lookup(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Descriptors in registration order, for listing/introspection.
    pub fn descriptors(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.order.iter().filter_map(|name| self.methods.get(name))
    }
}
