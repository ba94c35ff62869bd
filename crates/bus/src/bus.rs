// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pub/sub event bus.
//!
//! Collectors and agents publish events by type string; agents subscribe
//! with a [`Pattern`] and receive matching events on their own bounded
//! queue. Delivery to one consumer never blocks or drops events for any
//! other consumer.

use crate::error::BusError;
use crate::queue::ConsumerQueue;
use devloop_core::{Event, Pattern};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default bound on a single consumer's pending-event queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
/// Default bound on the bus-wide recent-event log.
pub const DEFAULT_RECENT_LOG_CAPACITY: usize = 100;

/// Opaque handle identifying one `subscribe` call, needed to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    pattern: Pattern,
    queue: ConsumerQueue,
}

struct State {
    subscriptions: Vec<Subscription>,
    recent: VecDeque<Event>,
}

/// The shared pub/sub substrate. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct EventBus {
    state: Arc<Mutex<State>>,
    next_id: Arc<AtomicU64>,
    queue_capacity: usize,
    recent_log_capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacities(DEFAULT_QUEUE_CAPACITY, DEFAULT_RECENT_LOG_CAPACITY)
    }

    pub fn with_capacities(queue_capacity: usize, recent_log_capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                subscriptions: Vec::new(),
                recent: VecDeque::with_capacity(recent_log_capacity.min(256)),
            })),
            next_id: Arc::new(AtomicU64::new(1)),
            queue_capacity,
            recent_log_capacity,
        }
    }

    /// Registers a new subscription for `pattern`, returning its queue and
    /// the id needed to `unsubscribe` it. Subscribing the same pattern
    /// multiple times is allowed; each call yields an independent queue.
    pub fn subscribe(&self, pattern: impl Into<Pattern>) -> (SubscriptionId, ConsumerQueue) {
        let queue = ConsumerQueue::new(self.queue_capacity);
        let id = self.subscribe_with_queue(pattern, queue.clone());
        (id, queue)
    }

    /// Registers a new subscription for `pattern` delivering into an
    /// existing `queue`, so several patterns can feed one consumer (e.g.
    /// an agent with multiple `triggers`).
    pub fn subscribe_with_queue(&self, pattern: impl Into<Pattern>, queue: ConsumerQueue) -> SubscriptionId {
        let pattern = pattern.into();
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.state.lock().subscriptions.push(Subscription {
            id,
            pattern,
            queue,
        });
        id
    }

    /// Removes a subscription. Guarantees no *new* deliveries after this
    /// returns; an in-flight delivery already enqueued may still arrive.
    pub fn unsubscribe(&self, id: SubscriptionId) -> Result<(), BusError> {
        let mut state = self.state.lock();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|s| s.id != id);
        if state.subscriptions.len() == before {
            return Err(BusError::SubscriptionNotFound(format!("{:?}", id)));
        }
        Ok(())
    }

    /// Delivers `event` to every subscription whose pattern matches, then
    /// appends it to the recent-event log. Non-blocking from the caller's
    /// perspective beyond this bookkeeping.
    pub fn emit(&self, event: Event) {
        let mut state = self.state.lock();
        for sub in &state.subscriptions {
            if sub.pattern.matches(&event.kind) {
                sub.queue.push(event.clone());
            }
        }
        if state.recent.len() >= self.recent_log_capacity {
            state.recent.pop_front();
        }
        state.recent.push_back(event);
        tracing::trace!(
            subscriber_count = state.subscriptions.len(),
            "emitted event"
        );
    }

    /// Returns up to `limit` of the most recently emitted events, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Event> {
        let state = self.state.lock();
        let skip = state.recent.len().saturating_sub(limit);
        state.recent.iter().skip(skip).cloned().collect()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscriptions.len()
    }
}
