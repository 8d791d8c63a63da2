//! Event mailbox: multi-producer queue, single UI-affine consumer.
//!
//! Work generated on arbitrary threads (capture completion, network I/O,
//! timer ticks) becomes safe to act on here: producers append under a
//! short-held lock, and the one thread permitted to touch UI-only native
//! resources drains on its own cadence. Nothing else in the system calls
//! UI-affine code directly from a worker thread.
//!
//! # Ordering
//!
//! Per-subscriber delivery within one tag is FIFO by publish order among
//! events drained together. Events published concurrently from different
//! threads before a drain have no cross-thread total order.
//!
//! # Re-entrancy
//!
//! A subscriber that publishes during `drain` appends to the fresh queue;
//! those events are delivered on the *next* drain cycle, never the current
//! one.

pub mod event;

pub use event::{Event, EventKind};

use std::any::Any;
use std::collections::HashMap;
use std::mem::take;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, PoisonError, RwLock};

use log::{debug, error};

type Subscriber = Box<dyn Fn(&Event) + Send + Sync>;

/// Cross-thread event queue with per-kind subscriber lists.
#[derive(Default)]
pub struct EventMailbox {
    /// Pending events. Locked only to append or to swap the whole batch out.
    pending: Mutex<Vec<Event>>,

    /// Subscriber lists by kind, insertion order preserved. Written during
    /// startup composition, read during drains.
    subscribers: RwLock<HashMap<EventKind, Vec<Subscriber>>>,
}

impl EventMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event. Callable from any thread, including runtime workers;
    /// the lock is held only for the append.
    pub fn publish(&self, event: Event) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    /// Register a callback for one event kind.
    ///
    /// Callbacks run on the draining thread, in subscription order, and must
    /// stay valid for the process lifetime. Intended for startup
    /// composition, before the corresponding publishes are expected; there
    /// is no buffering for late subscriptions.
    pub fn subscribe<F>(&self, kind: EventKind, callback: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    /// Deliver everything published so far. Only the designated consumer
    /// thread may call this.
    ///
    /// The whole pending queue is swapped out under the lock and iterated
    /// outside it. A panicking subscriber is caught and logged; remaining
    /// callbacks and events in the batch still run. Events without
    /// subscribers are discarded.
    ///
    /// Returns the number of events processed.
    pub fn drain(&self) -> usize {
        let batch = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            take(&mut *pending)
        };

        if batch.is_empty() {
            return 0;
        }

        let subscribers = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        for event in &batch {
            match subscribers.get(&event.kind()) {
                Some(list) => {
                    for callback in list {
                        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| callback(event))) {
                            error!(
                                "Subscriber for {:?} panicked: {}",
                                event.kind(),
                                panic_message(panic.as_ref())
                            );
                        }
                    }
                }
                None => {
                    debug!("No subscribers for {:?}, event discarded", event.kind());
                }
            }
        }

        batch.len()
    }

    /// Number of subscribers registered for one kind.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
