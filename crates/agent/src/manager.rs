// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registers, starts, stops, and supervises the set of agents running
//! against one bus.

use crate::agent_trait::Agent;
use crate::error::AgentError;
use crate::health::AgentHealth;
use crate::restart::{RestartPolicy, MAX_CONSECUTIVE_FAILURES, STABILITY_WINDOW};
use crate::runner::AgentRunner;
use devloop_bus::EventBus;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

pub const DEFAULT_MAX_CONCURRENT_AGENTS: usize = 5;

struct ManagedAgent {
    runner: Arc<AgentRunner>,
    restart: RestartPolicy,
    running_since: Option<Instant>,
    restart_count: u32,
    unhealthy: bool,
    watchdog: Option<tokio::task::JoinHandle<()>>,
}

/// Owns every agent in the daemon, bounding how many run `handle`
/// concurrently and enforcing the restart/circuit-breaker policy.
pub struct AgentManager {
    bus: EventBus,
    concurrency: Arc<Semaphore>,
    entries: Mutex<HashMap<String, ManagedAgent>>,
}

impl AgentManager {
    pub fn new(bus: EventBus) -> Self {
        Self::with_max_concurrent(bus, DEFAULT_MAX_CONCURRENT_AGENTS)
    }

    pub fn with_max_concurrent(bus: EventBus, max_concurrent_agents: usize) -> Self {
        Self {
            bus,
            concurrency: Arc::new(Semaphore::new(max_concurrent_agents.max(1))),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, agent: Arc<dyn Agent>) -> Result<(), AgentError> {
        let name = agent.name().to_string();
        let runner = Arc::new(AgentRunner::new(agent, self.bus.clone(), Arc::clone(&self.concurrency)));
        self.entries.lock().insert(
            name,
            ManagedAgent {
                runner,
                restart: RestartPolicy::new(),
                running_since: None,
                restart_count: 0,
                unhealthy: false,
                watchdog: None,
            },
        );
        Ok(())
    }

    pub fn start_all(&self) -> Result<(), AgentError> {
        let names: Vec<String> = self.entries.lock().keys().cloned().collect();
        for name in names {
            self.start_one(&name)?;
        }
        Ok(())
    }

    fn start_one(&self, name: &str) -> Result<(), AgentError> {
        let Some(runner) = ({
            let mut entries = self.entries.lock();
            match entries.get_mut(name) {
                Some(entry) => {
                    entry.runner.start()?;
                    entry.running_since = Some(Instant::now());
                    Some(Arc::clone(&entry.runner))
                }
                None => None,
            }
        }) else {
            return Ok(());
        };

        let name_owned = name.to_string();
        let watchdog_runner = Arc::clone(&runner);
        let watchdog = tokio::spawn({
            let name_owned = name_owned.clone();
            async move {
                loop {
                    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                    if !watchdog_runner.is_running() {
                        return;
                    }
                    let health = watchdog_runner.health();
                    if health.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                        tracing::error!(agent = %name_owned, "agent exceeded consecutive failure limit, stopping");
                        let _ = watchdog_runner.stop().await;
                        return;
                    }
                }
            }
        });

        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(name) {
            entry.watchdog = Some(watchdog);
        }
        Ok(())
    }

    pub async fn stop_all(&self) -> Result<(), AgentError> {
        let runners: Vec<Arc<AgentRunner>> = self
            .entries
            .lock()
            .values()
            .map(|e| Arc::clone(&e.runner))
            .collect();
        for runner in runners {
            runner.stop().await?;
        }
        for entry in self.entries.lock().values_mut() {
            if let Some(watchdog) = entry.watchdog.take() {
                watchdog.abort();
            }
        }
        Ok(())
    }

    /// Marks agents unhealthy whose watchdog observed the failure limit,
    /// and resets backoff for agents that have been stable long enough.
    /// Call periodically from the daemon's cleanup task.
    pub fn reconcile(&self) {
        let mut entries = self.entries.lock();
        for entry in entries.values_mut() {
            if !entry.runner.is_running() && !entry.unhealthy {
                let health = entry.runner.health();
                if health.consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    entry.unhealthy = true;
                }
            }
            if let Some(since) = entry.running_since {
                if entry.runner.is_running() && since.elapsed() >= STABILITY_WINDOW {
                    entry.restart.record_stability();
                }
            }
        }
    }

    pub fn health(&self) -> Vec<AgentHealth> {
        self.entries
            .lock()
            .values()
            .map(|e| {
                let mut health = e.runner.health();
                health.restart_count = e.restart_count;
                health.unhealthy = e.unhealthy;
                health
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_trait::Agent;
    use async_trait::async_trait;
    use devloop_core::{AgentResult, Event, Pattern};

    struct EchoAgent {
        name: String,
        triggers: Vec<Pattern>,
    }

    #[async_trait]
    impl Agent for EchoAgent {
        fn name(&self) -> &str {
            &self.name
        }

        fn triggers(&self) -> &[Pattern] {
            &self.triggers
        }

        async fn handle(&self, _event: Event) -> AgentResult {
            AgentResult::ok(&self.name, 0.01, "handled")
        }
    }

    #[tokio::test]
    async fn register_and_start_all_runs_agents() {
        let bus = EventBus::new();
        let manager = AgentManager::new(bus.clone());
        manager
            .register(Arc::new(EchoAgent {
                name: "linter".into(),
                triggers: vec![Pattern::new("file:save")],
            }))
            .unwrap();
        manager.start_all().unwrap();

        bus.emit(Event::new("file:save", "test", 0));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let health = manager.health();
        assert_eq!(health.len(), 1);
        assert_eq!(health[0].name, "linter");

        manager.stop_all().await.unwrap();
    }
}
