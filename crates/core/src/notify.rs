// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-local bridge between watch callbacks and the protocol loop
//!
//! The coordination service fires one-shot watches on its own execution
//! context. Each callback pushes a [`WatchEvent`] into a bounded channel owned
//! by a single barrier session; the protocol drains that channel when it has
//! to wait, then re-reads namespace state. A wake only means "something
//! changed", never that the predicate now holds.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Default number of undelivered events buffered per session
pub const DEFAULT_CAPACITY: usize = 64;

/// Kind of change a watch observed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchKind {
    Created,
    Deleted,
    DataChanged,
    ChildrenChanged,
    /// Connection state change delivered through a watch
    Session,
}

/// A fired watch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchKind,
    pub path: String,
}

impl WatchEvent {
    pub fn new(kind: WatchKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Sending half handed to the namespace when arming a watch
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: mpsc::Sender<WatchEvent>,
}

impl Notifier {
    /// Deliver a fired watch without blocking the caller's context
    ///
    /// A full channel already guarantees a pending wakeup, so the event is
    /// dropped rather than queued.
    pub fn notify(&self, event: WatchEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::trace!(path = %event.path, "notification coalesced");
            }
            Err(TrySendError::Closed(event)) => {
                tracing::trace!(path = %event.path, "session gone, notification dropped");
            }
        }
    }

    /// Whether two notifiers feed the same session
    pub fn same_channel(&self, other: &Notifier) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

/// Receiving half owned by one barrier session
#[derive(Debug)]
pub struct NotificationChannel {
    tx: mpsc::Sender<WatchEvent>,
    rx: mpsc::Receiver<WatchEvent>,
    wakeups: u64,
}

impl NotificationChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self { tx, rx, wakeups: 0 }
    }

    pub fn notifier(&self) -> Notifier {
        Notifier {
            tx: self.tx.clone(),
        }
    }

    /// Block until at least one watch fires, then drain everything pending
    ///
    /// Returns the most recent event. Returns `None` only if every sender is
    /// gone, which cannot happen while the channel is alive since it keeps
    /// one itself.
    pub async fn wait(&mut self) -> Option<WatchEvent> {
        let mut last = self.rx.recv().await?;
        while let Ok(event) = self.rx.try_recv() {
            last = event;
        }
        self.wakeups += 1;
        tracing::trace!(kind = ?last.kind, path = %last.path, "woken by watch");
        Some(last)
    }

    /// Number of times [`wait`](Self::wait) returned
    pub fn wakeups(&self) -> u64 {
        self.wakeups
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
