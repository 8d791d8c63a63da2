// Unit tests for the composition context

use crate::context::AppContext;

use rpc_core::config::AppConfig;

/// **VALUE**: Verifies the shutdown flag handshake between threads and the
/// UI loop.
///
/// **WHY THIS MATTERS**: Both Ctrl-C and `app.shutdown` stop the shell by
/// flipping this flag from a worker thread; if the flip is lost, the shell
/// never exits.
#[test]
fn given_shutdown_requested_then_flag_observable() {
    let context = AppContext::new(AppConfig::default());

    assert!(!context.is_shutdown_requested());

    context.request_shutdown();

    assert!(context.is_shutdown_requested());
}

// -------------------------------------------------------------------------- //

#[test]
fn given_new_context_then_uptime_advances() {
    let context = AppContext::new(AppConfig::default());

    std::thread::sleep(std::time::Duration::from_millis(5));

    assert!(context.uptime().as_millis() >= 5);
}
