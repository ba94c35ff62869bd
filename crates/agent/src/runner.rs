// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The cooperative loop wrapping one [`Agent`]: subscription, timing,
//! error isolation, and result publication.

use crate::agent_trait::Agent;
use crate::error::AgentError;
use crate::health::{AgentHealth, LifecycleView};
use crate::state::AgentLifecycle;
use devloop_bus::{ConsumerQueue, EventBus, SubscriptionId};
use devloop_core::{AgentResult, Clock};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs one agent's cooperative event loop.
pub struct AgentRunner {
    agent: Arc<dyn Agent>,
    bus: EventBus,
    handler_timeout: Duration,
    poll_timeout: Duration,
    concurrency: Arc<Semaphore>,
    state: Arc<Mutex<AgentLifecycle>>,
    enabled: Arc<AtomicBool>,
    consecutive_failures: Arc<AtomicU32>,
    last_result: Arc<Mutex<Option<AgentResult>>>,
    queue: Arc<Mutex<Option<ConsumerQueue>>>,
    subscriptions: Arc<Mutex<Vec<SubscriptionId>>>,
    loop_handle: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
}

impl AgentRunner {
    pub fn new(agent: Arc<dyn Agent>, bus: EventBus, concurrency: Arc<Semaphore>) -> Self {
        let enabled = agent.enabled();
        Self {
            agent,
            bus,
            handler_timeout: DEFAULT_HANDLER_TIMEOUT,
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            concurrency,
            state: Arc::new(Mutex::new(AgentLifecycle::Created)),
            enabled: Arc::new(AtomicBool::new(enabled)),
            consecutive_failures: Arc::new(AtomicU32::new(0)),
            last_result: Arc::new(Mutex::new(None)),
            queue: Arc::new(Mutex::new(None)),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
            loop_handle: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        self.agent.name()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Subscribes every trigger to one shared queue and spawns the loop.
    pub fn start(&self) -> Result<(), AgentError> {
        {
            let mut state = self.state.lock();
            *state = state.transition(AgentLifecycle::Running)?;
        }

        let queue = ConsumerQueue::new(devloop_bus::DEFAULT_QUEUE_CAPACITY);
        let mut sub_ids = Vec::new();
        for pattern in self.agent.triggers() {
            sub_ids.push(self.bus.subscribe_with_queue(pattern.clone(), queue.clone()));
        }
        *self.queue.lock() = Some(queue.clone());
        *self.subscriptions.lock() = sub_ids;

        let agent = Arc::clone(&self.agent);
        let bus = self.bus.clone();
        let state = Arc::clone(&self.state);
        let enabled = Arc::clone(&self.enabled);
        let consecutive_failures = Arc::clone(&self.consecutive_failures);
        let last_result = Arc::clone(&self.last_result);
        let concurrency = Arc::clone(&self.concurrency);
        let handler_timeout = self.handler_timeout;
        let poll_timeout = self.poll_timeout;

        let handle = tokio::spawn(cooperative_loop(
            agent,
            bus,
            queue,
            state,
            enabled,
            consecutive_failures,
            last_result,
            concurrency,
            handler_timeout,
            poll_timeout,
        ));
        *self.loop_handle.lock() = Some(handle);
        Ok(())
    }

    /// Transitions to `Stopping`, unsubscribes every trigger, drains the
    /// queue, then joins the loop task.
    pub async fn stop(&self) -> Result<(), AgentError> {
        {
            let mut state = self.state.lock();
            *state = state.transition(AgentLifecycle::Stopping)?;
        }

        for id in self.subscriptions.lock().drain(..) {
            let _ = self.bus.unsubscribe(id);
        }
        if let Some(queue) = self.queue.lock().as_ref() {
            queue.drain();
        }

        let handle = self.loop_handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        let mut state = self.state.lock();
        *state = state.transition(AgentLifecycle::Stopped)?;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock(), AgentLifecycle::Running)
    }

    pub fn health(&self) -> AgentHealth {
        AgentHealth {
            name: self.agent.name().to_string(),
            state: LifecycleView::from(*self.state.lock()),
            enabled: self.enabled.load(Ordering::SeqCst),
            consecutive_failures: self.consecutive_failures.load(Ordering::SeqCst),
            restart_count: 0,
            dropped_events: self.queue.lock().as_ref().map(|q| q.dropped_count()).unwrap_or(0),
            last_result: self.last_result.lock().clone(),
            unhealthy: false,
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn cooperative_loop(
    agent: Arc<dyn Agent>,
    bus: EventBus,
    queue: ConsumerQueue,
    state: Arc<Mutex<AgentLifecycle>>,
    enabled: Arc<AtomicBool>,
    consecutive_failures: Arc<AtomicU32>,
    last_result: Arc<Mutex<Option<AgentResult>>>,
    concurrency: Arc<Semaphore>,
    handler_timeout: Duration,
    poll_timeout: Duration,
) {
    let name = agent.name().to_string();
    loop {
        if !matches!(*state.lock(), AgentLifecycle::Running) {
            return;
        }

        let event = match tokio::time::timeout(poll_timeout, queue.recv()).await {
            Ok(event) => event,
            Err(_elapsed) => continue,
        };

        if !enabled.load(Ordering::SeqCst) {
            continue;
        }

        let _permit = concurrency.acquire().await;
        let started = Instant::now();
        let agent_for_task = Arc::clone(&agent);
        let event_for_task = event.clone();
        let dispatch = tokio::spawn(async move { agent_for_task.handle(event_for_task).await });

        let result = match tokio::time::timeout(handler_timeout, dispatch).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => {
                tracing::error!(agent = %name, error = %join_err, "agent handler panicked");
                AgentResult::failed(&name, started.elapsed().as_secs_f64(), format!("panicked: {join_err}"))
            }
            Err(_elapsed) => {
                tracing::warn!(agent = %name, timeout_secs = handler_timeout.as_secs(), "agent handler timed out");
                AgentResult::failed(&name, started.elapsed().as_secs_f64(), "handler timeout")
            }
        };

        if result.success {
            consecutive_failures.store(0, Ordering::SeqCst);
        } else {
            consecutive_failures.fetch_add(1, Ordering::SeqCst);
        }

        let mut completed = devloop_core::Event::new(
            format!("agent:{name}:completed"),
            name.clone(),
            devloop_core::SystemClock.epoch_ms(),
        );
        completed.payload.extend(result.to_event_payload());
        bus.emit(completed);

        *last_result.lock() = Some(result);
    }
}
