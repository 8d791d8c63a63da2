// Unit tests for the task runtime lifecycle
// These run on plain threads; the pool under test owns its own workers

use crate::error::runtime::RuntimeError;
use crate::runtime::TaskRuntime;

use std::sync::mpsc::channel;
use std::time::Duration;

const OBSERVE_TIMEOUT: Duration = Duration::from_secs(5);

/// **VALUE**: Verifies that `stop` before `start` is a harmless no-op.
///
/// **WHY THIS MATTERS**: Shutdown runs in reverse-of-initialization order; if
/// startup aborted early, teardown still calls `stop` unconditionally.
#[test]
fn given_runtime_not_started_when_stop_then_noop() {
    let runtime = TaskRuntime::new();

    runtime.stop();
    runtime.stop();

    assert!(!runtime.is_running());
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that a second `start` fails without disturbing the pool.
///
/// **WHY THIS MATTERS**: Two feature modules racing to initialize must not
/// end up with two pools or a torn one; the loser gets an error and the
/// winner's thread count stands.
///
/// **BUG THIS CATCHES**: Would catch a `start` that rebuilds or resizes a
/// running pool.
#[test]
fn given_runtime_started_when_started_again_then_error_and_pool_unchanged() {
    // GIVEN: A running pool with three workers
    let runtime = TaskRuntime::new();
    runtime.start(3).expect("first start should succeed");
    assert!(runtime.is_running());
    assert_eq!(runtime.worker_threads(), 3);

    // WHEN: A second start asks for a different size
    let result = runtime.start(5);

    // THEN: It fails and the original pool is untouched
    assert!(matches!(result, Err(RuntimeError::AlreadyRunning { .. })));
    assert_eq!(runtime.worker_threads(), 3);
    assert!(runtime.is_running());

    runtime.stop();
    assert!(!runtime.is_running());
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that work is rejected, not dropped, when the pool is down.
#[test]
fn given_runtime_not_started_when_submit_then_rejected() {
    let runtime = TaskRuntime::new();

    let result = runtime.submit(async { 42 });

    assert!(matches!(result, Err(RuntimeError::NotRunning { .. })));
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that submitted work actually executes on the pool.
#[test]
fn given_task_submitted_when_pool_running_then_task_executes() {
    let runtime = TaskRuntime::new();
    runtime.start(1).expect("start should succeed");

    let (tx, rx) = channel();
    runtime
        .submit(async move {
            let _ = tx.send("ran");
        })
        .expect("submit should succeed while running");

    assert_eq!(rx.recv_timeout(OBSERVE_TIMEOUT), Ok("ran"));

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that a panicking task does not kill its worker.
///
/// **WHY THIS MATTERS**: A single bad handler must never starve the pool; the
/// worker has to keep draining the queue after containing the panic.
///
/// **BUG THIS CATCHES**: Would catch a pool whose workers die (or whose
/// process aborts) on a task panic.
#[test]
fn given_task_panics_then_worker_survives_and_processes_next_task() {
    // GIVEN: A single-worker pool so both tasks share one thread
    let runtime = TaskRuntime::new();
    runtime.start(1).expect("start should succeed");

    // WHEN: The first task panics
    runtime
        .submit(async {
            panic!("task exploded");
        })
        .expect("submit should succeed");

    // THEN: A follow-up task on the same worker still completes
    let (tx, rx) = channel();
    runtime
        .submit(async move {
            let _ = tx.send("still alive");
        })
        .expect("submit should succeed");

    assert_eq!(rx.recv_timeout(OBSERVE_TIMEOUT), Ok("still alive"));

    runtime.stop();
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that a zero thread count resolves to hardware
/// concurrency with a floor of two.
#[test]
fn given_zero_thread_count_when_started_then_hardware_concurrency_floor_two() {
    let runtime = TaskRuntime::new();
    runtime.start(0).expect("start should succeed");

    assert!(
        runtime.worker_threads() >= 2,
        "Zero must resolve to at least two workers, got {}",
        runtime.worker_threads()
    );

    runtime.stop();
}
