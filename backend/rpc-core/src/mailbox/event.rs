//! Events crossing from arbitrary threads to the UI-affine thread.

use std::path::PathBuf;

/// One typed event payload.
///
/// A closed sum type rather than runtime type identity: the mailbox indexes
/// subscriber lists by [`EventKind`], the tag derived from each variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The frontend asked for a new window size; applied on the UI thread.
    Resize { width: u32, height: u32 },

    /// A capture job finished and its artifact is on disk.
    CaptureCompleted { path: PathBuf },

    /// A capture job failed before producing an artifact.
    CaptureFailed { reason: String },

    /// The broadcast subscriber set grew or shrank.
    ConnectionsChanged { count: usize },
}

/// Tag used to index subscriber lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Resize,
    CaptureCompleted,
    CaptureFailed,
    ConnectionsChanged,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Resize { .. } => EventKind::Resize,
            Event::CaptureCompleted { .. } => EventKind::CaptureCompleted,
            Event::CaptureFailed { .. } => EventKind::CaptureFailed,
            Event::ConnectionsChanged { .. } => EventKind::ConnectionsChanged,
        }
    }
}
