// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-slot latest-frame mailbox between a camera worker and its
//! subscribers.
//!
//! Built on `tokio::sync::watch`: publishing replaces any unread frame, and
//! every subscriber independently observes only the newest value. A slow
//! subscriber drops frames without ever blocking the producer.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::watch;

/// Producer half, owned by the app state and written by one camera worker.
pub struct FrameMailbox {
    tx: watch::Sender<Option<Bytes>>,
}

/// Outcome of one wait on the mailbox.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameWait {
    Frame(Bytes),
    /// No new frame within the timeout.
    Timeout,
    /// Mailbox destroyed.
    Closed,
}

impl Default for FrameMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameMailbox {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Replace the slot with a new frame.
    pub fn publish(&self, frame: Bytes) {
        self.tx.send_replace(Some(frame));
    }

    /// Empty the slot (used when processing stops).
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    pub fn subscribe(&self) -> FrameReader {
        FrameReader { rx: self.tx.subscribe(), primed: false }
    }
}

/// Subscriber half; each reader tracks its own last-seen frame.
pub struct FrameReader {
    rx: watch::Receiver<Option<Bytes>>,
    primed: bool,
}

impl FrameReader {
    /// Current frame if one exists, without waiting.
    pub fn latest(&mut self) -> Option<Bytes> {
        self.rx.borrow_and_update().clone()
    }

    /// Return the current frame on first call, otherwise wait up to `wait`
    /// for the next publish.
    pub async fn next_frame(&mut self, wait: Duration) -> FrameWait {
        if !self.primed {
            self.primed = true;
            let current = self.rx.borrow_and_update().clone();
            if let Some(frame) = current {
                return FrameWait::Frame(frame);
            }
        }

        match tokio::time::timeout(wait, self.rx.changed()).await {
            Ok(Ok(())) => match self.rx.borrow_and_update().clone() {
                Some(frame) => FrameWait::Frame(frame),
                // Slot was cleared; treat like an empty interval.
                None => FrameWait::Timeout,
            },
            Ok(Err(_)) => FrameWait::Closed,
            Err(_) => FrameWait::Timeout,
        }
    }
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
