// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded, drop-oldest consumer queue.

use devloop_core::Event;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A single consumer's view of delivered events.
///
/// Cloning shares the same underlying queue; the bus holds a clone for
/// delivery while the consumer holds another for receiving.
#[derive(Clone)]
pub struct ConsumerQueue {
    inner: Arc<Inner>,
}

struct Inner {
    capacity: usize,
    events: Mutex<VecDeque<Event>>,
    notify: Notify,
    dropped_count: AtomicU64,
}

impl ConsumerQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                capacity: capacity.max(1),
                events: Mutex::new(VecDeque::with_capacity(capacity.min(256))),
                notify: Notify::new(),
                dropped_count: AtomicU64::new(0),
            }),
        }
    }

    /// Pushes an event, dropping the oldest queued event if at capacity.
    pub fn push(&self, event: Event) {
        {
            let mut events = self.inner.events.lock();
            if events.len() >= self.inner.capacity {
                events.pop_front();
                self.inner.dropped_count.fetch_add(1, Ordering::Relaxed);
            }
            events.push_back(event);
        }
        self.inner.notify.notify_one();
    }

    /// Waits for and removes the next event, or `None` if `closed` fires first.
    pub async fn recv(&self) -> Event {
        loop {
            if let Some(event) = self.inner.events.lock().pop_front() {
                return event;
            }
            self.inner.notify.notified().await;
        }
    }

    /// Non-blocking pop, for cooperative loops with their own timeout.
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.events.lock().pop_front()
    }

    /// Discards all currently queued events without delivering them.
    pub fn drain(&self) {
        self.inner.events.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped_count.load(Ordering::Relaxed)
    }
}
