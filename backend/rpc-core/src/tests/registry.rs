// Unit tests for the method registry
// Covers duplicate rejection, listing order, and the type-erasure wrapper

use crate::rpc::protocol::{INVALID_PARAMS, RpcErrorBody};
use crate::rpc::registry::MethodRegistry;

use serde::Deserialize;
use serde_json::{Value, json};

/// **VALUE**: Verifies that a duplicate registration keeps the original handler.
///
/// **WHY THIS MATTERS**: Feature modules register their methods independently
/// during startup composition. If a name collision silently overwrote the
/// first handler, one module would hijack another's method.
///
/// **BUG THIS CATCHES**: Would catch if duplicate names replaced the existing
/// descriptor or grew the registry.
#[tokio::test]
async fn given_duplicate_name_when_registered_then_original_handler_kept() {
    // GIVEN: A registry with an "echo" method returning its input
    let mut registry = MethodRegistry::new();
    registry.register("echo", "Echo the params back", |params: Value| async move {
        Ok::<_, RpcErrorBody>(params)
    });

    // WHEN: A second handler claims the same name
    registry.register("echo", "Imposter", |_params: Value| async move {
        Ok::<_, RpcErrorBody>(json!("hijacked"))
    });

    // THEN: Registry size is unchanged and the original handler still runs
    assert_eq!(registry.len(), 1, "Duplicate must not grow the registry");

    let descriptor = registry.lookup("echo").expect("echo should be registered");
    let result = descriptor.invoke(json!({"x": 1})).await;
    assert_eq!(result, Ok(json!({"x": 1})), "Original handler must be kept");
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that the listing follows registration order.
///
/// **WHY THIS MATTERS**: Introspection (`system.describe`) presents methods
/// in the order feature modules were composed; a hash-order listing would
/// shuffle on every run.
#[test]
fn given_methods_registered_when_listed_then_registration_order_preserved() {
    let mut registry = MethodRegistry::new();
    registry.register("zeta.last", "", |_: Value| async move {
        Ok::<_, RpcErrorBody>(Value::Null)
    });
    registry.register("alpha.first", "", |_: Value| async move {
        Ok::<_, RpcErrorBody>(Value::Null)
    });
    registry.register("mid.dle", "", |_: Value| async move {
        Ok::<_, RpcErrorBody>(Value::Null)
    });

    let names: Vec<&str> = registry.descriptors().map(|d| d.name()).collect();
    assert_eq!(names, vec!["zeta.last", "alpha.first", "mid.dle"]);
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that bad params surface as `InvalidParams`, not a panic.
///
/// **WHY THIS MATTERS**: Frontend bugs send malformed params routinely; the
/// wrapper must turn them into a structured protocol error on the value path.
#[tokio::test]
async fn given_typed_handler_when_params_malformed_then_invalid_params() {
    #[derive(Deserialize)]
    struct Params {
        #[allow(dead_code)]
        width: u32,
    }

    let mut registry = MethodRegistry::new();
    registry.register("window.resize", "", |_params: Params| async move {
        Ok::<_, RpcErrorBody>(true)
    });

    let descriptor = registry.lookup("window.resize").expect("registered");
    let result = descriptor.invoke(json!("not-an-object")).await;

    let error = result.expect_err("malformed params must be rejected");
    assert_eq!(error.code, INVALID_PARAMS);
}

// -------------------------------------------------------------------------- //

#[test]
fn given_unknown_name_when_looked_up_then_none() {
    let registry = MethodRegistry::new();
    assert!(registry.lookup("no.such.method").is_none());
    assert!(registry.is_empty());
}
