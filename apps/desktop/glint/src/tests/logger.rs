// Unit tests for logger initialization

use crate::logger::initialize;

/// **VALUE**: Verifies that repeated initialization is a warning, not a
/// failure.
///
/// **WHY THIS MATTERS**: Tests and embedded harnesses may wire the shell up
/// more than once per process; a second `initialize` must not abort startup.
#[test]
fn given_logger_initialized_twice_then_second_call_is_noop() {
    let dir = tempfile::tempdir().expect("temp dir");

    assert!(initialize(dir.path()).is_ok());
    assert!(
        initialize(dir.path()).is_ok(),
        "Second call must be a no-op"
    );
}
