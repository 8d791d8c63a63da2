// Unit tests for the event mailbox
// Covers delivery order, tag isolation, panic containment, and re-entrancy

use crate::mailbox::{Event, EventKind, EventMailbox};

use std::sync::{Arc, Mutex};

fn recording_log() -> Arc<Mutex<Vec<String>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// **VALUE**: Verifies exactly-once, in-order delivery within one tag, and
/// nothing for other tags.
///
/// **WHY THIS MATTERS**: UI-affine subscribers rely on subscription order
/// (e.g. apply-then-announce for a resize). Cross-tag leakage would hand a
/// subscriber an event variant it never asked for.
///
/// **BUG THIS CATCHES**: Would catch if drain delivered by iteration order of
/// the subscriber map, delivered twice, or matched the wrong tag.
#[test]
fn given_publish_and_drain_then_subscribers_of_tag_receive_in_order() {
    // GIVEN: Two Resize subscribers and one CaptureFailed subscriber
    let mailbox = EventMailbox::new();
    let log = recording_log();

    let first = Arc::clone(&log);
    mailbox.subscribe(EventKind::Resize, move |_| {
        first.lock().unwrap().push(String::from("first"));
    });

    let second = Arc::clone(&log);
    mailbox.subscribe(EventKind::Resize, move |_| {
        second.lock().unwrap().push(String::from("second"));
    });

    let other = Arc::clone(&log);
    mailbox.subscribe(EventKind::CaptureFailed, move |_| {
        other.lock().unwrap().push(String::from("other-tag"));
    });

    // WHEN: One Resize event is published and drained
    mailbox.publish(Event::Resize {
        width: 100,
        height: 50,
    });
    let processed = mailbox.drain();

    // THEN: Both Resize subscribers ran once, in order; the other tag did not
    assert_eq!(processed, 1);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies FIFO by publish order within one tag.
#[test]
fn given_multiple_events_when_drained_together_then_fifo_by_publish_order() {
    let mailbox = EventMailbox::new();
    let log = recording_log();

    let widths = Arc::clone(&log);
    mailbox.subscribe(EventKind::Resize, move |event| {
        if let Event::Resize { width, .. } = event {
            widths.lock().unwrap().push(width.to_string());
        }
    });

    mailbox.publish(Event::Resize {
        width: 1,
        height: 1,
    });
    mailbox.publish(Event::Resize {
        width: 2,
        height: 2,
    });
    mailbox.publish(Event::Resize {
        width: 3,
        height: 3,
    });

    assert_eq!(mailbox.drain(), 3);
    assert_eq!(*log.lock().unwrap(), vec!["1", "2", "3"]);
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that a panicking subscriber does not poison the batch.
///
/// **WHY THIS MATTERS**: Subscriber callbacks are third-party feature code.
/// One bad callback must not starve the rest of the UI-affine delivery, or
/// the shell would silently stop reacting to events.
///
/// **BUG THIS CATCHES**: Would catch a drain loop without panic containment,
/// which would unwind into the UI loop.
#[test]
fn given_panicking_subscriber_when_drain_then_remaining_deliveries_run() {
    let mailbox = EventMailbox::new();
    let log = recording_log();

    mailbox.subscribe(EventKind::Resize, move |_| {
        panic!("subscriber exploded");
    });

    let survivor = Arc::clone(&log);
    mailbox.subscribe(EventKind::Resize, move |_| {
        survivor.lock().unwrap().push(String::from("survivor"));
    });

    mailbox.publish(Event::Resize {
        width: 10,
        height: 10,
    });
    mailbox.publish(Event::Resize {
        width: 20,
        height: 20,
    });

    // Both events process; the survivor sees both
    assert_eq!(mailbox.drain(), 2);
    assert_eq!(*log.lock().unwrap(), vec!["survivor", "survivor"]);
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that an event with no subscribers is discarded quietly.
#[test]
fn given_no_subscribers_when_drain_then_event_discarded_without_error() {
    let mailbox = EventMailbox::new();

    mailbox.publish(Event::Resize {
        width: 100,
        height: 50,
    });

    assert_eq!(mailbox.drain(), 1);
    assert_eq!(mailbox.drain(), 0, "Nothing should remain after a drain");
}

// -------------------------------------------------------------------------- //

/// **VALUE**: Verifies that re-entrant publishes land in the next drain cycle.
///
/// **WHY THIS MATTERS**: Subscribers may publish follow-up events (a resize
/// triggering a repaint request). Delivering them in the same cycle could
/// loop forever; deferring them keeps every drain bounded.
///
/// **BUG THIS CATCHES**: Would catch a drain that iterates the live queue
/// instead of a swapped-out batch.
#[test]
fn given_subscriber_publishes_when_drain_then_new_event_deferred_to_next_cycle() {
    let mailbox = Arc::new(EventMailbox::new());
    let log = recording_log();

    let publisher = Arc::clone(&mailbox);
    mailbox.subscribe(EventKind::Resize, move |_| {
        publisher.publish(Event::ConnectionsChanged { count: 1 });
    });

    let observed = Arc::clone(&log);
    mailbox.subscribe(EventKind::ConnectionsChanged, move |_| {
        observed.lock().unwrap().push(String::from("connections"));
    });

    mailbox.publish(Event::Resize {
        width: 100,
        height: 50,
    });

    // First drain processes only the resize; the re-entrant publish waits
    assert_eq!(mailbox.drain(), 1);
    assert!(log.lock().unwrap().is_empty());

    // Second drain delivers it
    assert_eq!(mailbox.drain(), 1);
    assert_eq!(*log.lock().unwrap(), vec!["connections"]);
}

// -------------------------------------------------------------------------- //

#[test]
fn given_subscriptions_when_counted_then_per_kind_totals_match() {
    let mailbox = EventMailbox::new();
    mailbox.subscribe(EventKind::Resize, |_| {});
    mailbox.subscribe(EventKind::Resize, |_| {});

    assert_eq!(mailbox.subscriber_count(EventKind::Resize), 2);
    assert_eq!(mailbox.subscriber_count(EventKind::CaptureFailed), 0);
}
