//! Task runtime: the worker pool everything else schedules onto.
//!
//! Wraps a multi-threaded tokio runtime behind an explicit start/stop
//! lifecycle. RPC handlers submitted here run concurrently and may suspend
//! at any await point; resumption can land on any worker thread, so nothing
//! submitted may assume thread identity is preserved.
//!
//! # Lifecycle
//!
//! - [`TaskRuntime::start`] builds the pool once; a second start is an error,
//!   not a crash, and leaves the running pool untouched.
//! - [`TaskRuntime::stop`] is idempotent and joins all workers (bounded by a
//!   grace period). In-flight tasks may be abandoned; callers only get the
//!   guarantee that the threads have exited.
//! - [`TaskRuntime::submit`] rejects work with an error when the pool is not
//!   running rather than dropping it silently.
//!
//! A panic inside a submitted task is contained by the pool: the join handle
//! reports it and the worker thread keeps draining the queue.

use crate::error::runtime::RuntimeError;

use common::ErrorLocation;

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread::available_parallelism;
use std::time::Duration;

use log::{info, warn};
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

/// Floor applied when the caller asks for hardware concurrency.
const MIN_WORKER_THREADS: usize = 2;

/// How long `stop` waits for in-flight tasks before abandoning them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Worker pool with an explicit start/stop lifecycle.
///
/// Created once by the application context and shared (`Arc`) with every
/// component that schedules work. All methods take `&self`; the pool itself
/// is the only interior state.
pub struct TaskRuntime {
    /// The pool. `None` whenever the runtime is stopped.
    runtime: Mutex<Option<Runtime>>,

    /// Cheap cross-thread "is it up" flag, kept in sync with `runtime`.
    running: AtomicBool,

    /// Resolved worker count of the running pool (diagnostics).
    worker_threads: AtomicUsize,
}

impl TaskRuntime {
    pub fn new() -> Self {
        Self {
            runtime: Mutex::new(None),
            running: AtomicBool::new(false),
            worker_threads: AtomicUsize::new(0),
        }
    }

    /// Spin up the worker pool.
    ///
    /// `worker_threads == 0` selects hardware concurrency with a floor of
    /// two workers.
    ///
    /// # Errors
    ///
    /// - [`RuntimeError::AlreadyRunning`] if the pool is already up; the
    ///   running pool and its thread count are left unchanged.
    /// - [`RuntimeError::Build`] if the OS refuses to allocate the threads.
    pub fn start(&self, worker_threads: usize) -> Result<(), RuntimeError> {
        let mut guard = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);

        if guard.is_some() {
            warn!("Task runtime start requested but it is already running");
            return Err(RuntimeError::AlreadyRunning {
                message: String::from("Task runtime is already running"),
                location: ErrorLocation::here(),
            });
        }

        let resolved = if worker_threads == 0 {
            available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(MIN_WORKER_THREADS)
                .max(MIN_WORKER_THREADS)
        } else {
            worker_threads
        };

        let runtime = Builder::new_multi_thread()
            .worker_threads(resolved)
            .thread_name("glint-worker")
            .enable_all()
            .build()
            .map_err(|e| RuntimeError::Build {
                message: format!("Failed to build worker pool: {e}"),
                location: ErrorLocation::here(),
            })?;

        *guard = Some(runtime);
        self.worker_threads.store(resolved, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);

        info!("Task runtime started with {resolved} worker thread(s)");
        Ok(())
    }

    /// Shut the pool down and join all workers.
    ///
    /// Idempotent: calling it twice, or before `start`, is a no-op. In-flight
    /// tasks get [`SHUTDOWN_GRACE`] to finish and are abandoned afterwards.
    ///
    /// Must be called from a thread outside the pool (the shell's main
    /// thread); joining the pool from one of its own workers cannot work.
    pub fn stop(&self) {
        let runtime = {
            let mut guard = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);
            self.running.store(false, Ordering::SeqCst);
            guard.take()
        };

        match runtime {
            Some(runtime) => {
                runtime.shutdown_timeout(SHUTDOWN_GRACE);
                info!("Task runtime stopped, workers joined");
            }
            None => {
                warn!("Task runtime stop requested but it was not running");
            }
        }
    }

    /// Cheap atomic read, usable from any thread.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Worker count of the running pool (0 when stopped).
    pub fn worker_threads(&self) -> usize {
        self.worker_threads.load(Ordering::SeqCst)
    }

    /// Enqueue a unit of work on the pool.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::NotRunning`] when the pool is down; work is
    /// never dropped silently.
    pub fn submit<F>(&self, future: F) -> Result<JoinHandle<F::Output>, RuntimeError>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let guard = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);

        match guard.as_ref() {
            Some(runtime) => Ok(runtime.spawn(future)),
            None => Err(RuntimeError::NotRunning {
                message: String::from("Task submitted but the worker pool is not running"),
                location: ErrorLocation::here(),
            }),
        }
    }

    /// Handle to the running pool, for callers that need to block on a
    /// future from a non-worker thread (e.g. transport startup).
    pub fn handle(&self) -> Result<Handle, RuntimeError> {
        let guard = self.runtime.lock().unwrap_or_else(PoisonError::into_inner);

        match guard.as_ref() {
            Some(runtime) => Ok(runtime.handle().clone()),
            None => Err(RuntimeError::NotRunning {
                message: String::from("Worker pool is not running"),
                location: ErrorLocation::here(),
            }),
        }
    }
}

impl Default for TaskRuntime {
    fn default() -> Self {
        Self::new()
    }
}
