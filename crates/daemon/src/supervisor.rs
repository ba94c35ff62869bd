// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ties together the pid lock, heartbeat, filesystem collector, context
//! store, and agent manager into one project's daemon lifetime.

use crate::agents_config::{allowlisted_programs, build_agents, load_agents_file};
use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::heartbeat::{self, HeartbeatStatus};
use crate::pidlock::PidLock;
use devloop_agent::AgentManager;
use devloop_bus::EventBus;
use devloop_collector::{CollectorConfig, FilesystemCollector};
use devloop_core::{Clock, SystemClock};
use devloop_runner::{CommandRunner, RunnerConfig};
use devloop_store::ContextStore;
use std::sync::Arc;
use std::time::Duration;

/// Everything that must be torn down, in order, on graceful shutdown.
pub struct RunningDaemon {
    config: DaemonConfig,
    lock: PidLock,
    heartbeat: tokio::task::JoinHandle<()>,
    _collector_handle: devloop_collector::CollectorHandle,
    collector_task: tokio::task::JoinHandle<Result<(), devloop_collector::CollectorError>>,
    manager: Arc<AgentManager>,
    store: ContextStore,
    cleanup: tokio::task::JoinHandle<()>,
}

/// Starts every subsystem for `config.project_dir`. Fails fast if another
/// instance holds the lock and its heartbeat is still fresh.
pub async fn start(config: DaemonConfig) -> Result<RunningDaemon, DaemonError> {
    config.ensure_dirs().map_err(|source| DaemonError::Io {
        path: config.devloop_dir.clone(),
        source,
    })?;

    let lock = PidLock::acquire(&config.pid_path, &config.heartbeat_path, config.staleness_threshold())?;

    let clock = SystemClock;
    let heartbeat =
        heartbeat::spawn_heartbeat(config.heartbeat_path.clone(), config.heartbeat_interval, clock.clone());

    let bus = EventBus::new();
    let store = ContextStore::load(config.context_dir.as_path(), &bus, &clock)?;

    let agents_file = load_agents_file(&config.agents_config_path)?;
    let runner_config = RunnerConfig::new(allowlisted_programs(&agents_file));
    let runner = CommandRunner::new(runner_config);

    let manager = Arc::new(AgentManager::with_max_concurrent(bus.clone(), config.max_concurrent_agents));
    for agent in build_agents(&agents_file, &runner, &store)? {
        manager.register(agent)?;
    }
    manager.start_all()?;

    let collector_config = CollectorConfig::new(config.project_dir.as_path())?;
    let collector = FilesystemCollector::new(collector_config, bus.clone());
    let (collector_handle, collector_task) = collector.start(clock)?;

    let cleanup = spawn_cleanup_task(
        Arc::clone(&manager),
        store.clone(),
        config.cleanup_interval,
        config.retention,
    );

    Ok(RunningDaemon {
        config,
        lock,
        heartbeat,
        _collector_handle: collector_handle,
        collector_task,
        manager,
        store,
        cleanup,
    })
}

fn spawn_cleanup_task(
    manager: Arc<AgentManager>,
    store: ContextStore,
    interval: Duration,
    retention: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(interval);
        loop {
            tick.tick().await;
            manager.reconcile();
            let now_ms = SystemClock.epoch_ms();
            if let Err(source) = store.cleanup_old_findings(retention, now_ms) {
                tracing::warn!(error = %source, "periodic context cleanup failed");
            }
        }
    })
}

impl RunningDaemon {
    pub fn status(&self) -> HeartbeatStatus {
        heartbeat::classify(&self.config.heartbeat_path, self.config.staleness_threshold())
    }

    pub fn agent_health(&self) -> Vec<devloop_agent::AgentHealth> {
        self.manager.health()
    }

    /// Stops agents, the collector, and the cleanup task in order, flushes
    /// nothing extra (the store writes through on every finding already),
    /// then releases the lock by dropping it.
    pub async fn shutdown(self, grace: Duration) -> Result<(), DaemonError> {
        self.cleanup.abort();
        self.collector_task.abort();
        self.heartbeat.abort();

        let stop = self.manager.stop_all();
        match tokio::time::timeout(grace, stop).await {
            Ok(Ok(())) => {}
            Ok(Err(source)) => tracing::warn!(error = %source, "agent manager reported an error while stopping"),
            Err(_) => tracing::warn!(grace_secs = grace.as_secs(), "agents did not stop within the grace period"),
        }

        drop(self.lock);
        let _ = std::fs::remove_file(&self.config.heartbeat_path);
        Ok(())
    }
}
