//! The UI-affine loop.
//!
//! Runs on the shell's main thread, the only thread permitted to touch
//! UI-only native resources. Every iteration is bounded by the configured
//! poll interval and does three things: service the (future) native message
//! pump slot, drain the event mailbox, and tick periodic subsystems such as
//! the status heartbeat.

use crate::context::AppContext;

use std::thread::sleep;
use std::time::{Duration, Instant};

use log::info;

/// A periodic action driven by the UI loop.
pub struct Ticker {
    interval: Duration,
    last_fired: Instant,
    action: Box<dyn FnMut()>,
}

impl Ticker {
    pub fn new(interval: Duration, action: Box<dyn FnMut()>) -> Self {
        Self {
            interval,
            last_fired: Instant::now(),
            action,
        }
    }

    fn tick(&mut self, now: Instant) {
        if now.duration_since(self.last_fired) >= self.interval {
            self.last_fired = now;
            (self.action)();
        }
    }
}

/// Block the calling thread on the loop until shutdown is requested.
///
/// The caller's thread becomes the designated mailbox consumer: all
/// subscriber callbacks run here and nowhere else.
pub fn run(context: &AppContext, mut tickers: Vec<Ticker>) {
    let poll_interval = Duration::from_millis(context.config.ui.poll_interval_ms);
    info!(
        "UI loop running with a {} ms poll interval",
        context.config.ui.poll_interval_ms
    );

    while !context.is_shutdown_requested() {
        // Bounded wait standing in for the native message pump.
        sleep(poll_interval);

        context.mailbox.drain();

        let now = Instant::now();
        for ticker in &mut tickers {
            ticker.tick(now);
        }
    }

    // Final drain so events raced against the shutdown flag are not lost.
    context.mailbox.drain();

    info!("UI loop exited");
}
