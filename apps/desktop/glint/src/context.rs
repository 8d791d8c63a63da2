//! Process-wide composition context.
//!
//! One explicit object owning what feature modules need: the loaded config,
//! the event mailbox, and the shared shutdown flag. It is constructed once
//! in `main` and passed by `Arc` everywhere; there are no ambient
//! singletons.

use rpc_core::config::AppConfig;
use rpc_core::mailbox::EventMailbox;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub struct AppContext {
    pub config: AppConfig,
    pub mailbox: Arc<EventMailbox>,
    shutdown: AtomicBool,
    started_at: Instant,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            mailbox: Arc::new(EventMailbox::new()),
            shutdown: AtomicBool::new(false),
            started_at: Instant::now(),
        }
    }

    /// Flip the shared shutdown flag. Callable from any thread; the UI loop
    /// observes it on its next iteration.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
