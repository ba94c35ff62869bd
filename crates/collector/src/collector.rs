// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Native filesystem watcher wired to the event bus.

use crate::config::CollectorConfig;
use crate::debounce::{Debouncer, RawKind};
use crate::error::CollectorError;
use devloop_bus::EventBus;
use devloop_core::{Clock, Event};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const RAW_EVENT_CHANNEL_CAPACITY: usize = 1024;
const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Watches a project root and publishes `file:*` events to the bus.
///
/// Does not replay existing files on startup; only changes observed after
/// `start()` are reported.
pub struct FilesystemCollector {
    config: CollectorConfig,
    bus: EventBus,
}

impl FilesystemCollector {
    pub fn new(config: CollectorConfig, bus: EventBus) -> Self {
        Self { config, bus }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// Starts the native watcher and the coalescing loop, returning a handle
    /// that keeps both alive until dropped, plus the spawned task's join
    /// handle for awaiting an unrecoverable failure.
    pub fn start(
        self,
        clock: impl Clock + 'static,
    ) -> Result<(CollectorHandle, JoinHandle<Result<(), CollectorError>>), CollectorError> {
        let (raw_tx, raw_rx) = mpsc::channel(RAW_EVENT_CHANNEL_CAPACITY);
        let root = self.config.root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let _ = raw_tx.blocking_send(event);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "native watcher reported an error");
                }
            }
        })
        .map_err(CollectorError::WatchStart)?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(CollectorError::WatchStart)?;

        let join = tokio::spawn(run_loop(self.config, self.bus, raw_rx, clock));

        Ok((CollectorHandle { _watcher: watcher }, join))
    }
}

/// Keeps the native watcher alive; dropping it stops all watching.
pub struct CollectorHandle {
    _watcher: RecommendedWatcher,
}

async fn run_loop(
    config: CollectorConfig,
    bus: EventBus,
    mut raw_rx: mpsc::Receiver<notify::Event>,
    clock: impl Clock,
) -> Result<(), CollectorError> {
    let mut debouncer = Debouncer::new(Duration::from_millis(config.debounce_ms));
    let mut tick = tokio::time::interval(TICK_INTERVAL);

    loop {
        tokio::select! {
            maybe_event = raw_rx.recv() => {
                match maybe_event {
                    Some(event) => handle_raw_event(&config, &bus, &mut debouncer, event, &clock),
                    None => return Ok(()),
                }
            }
            _ = tick.tick() => {
                flush_ready(&bus, &mut debouncer, &clock);
            }
        }
    }
}

fn handle_raw_event(
    config: &CollectorConfig,
    bus: &EventBus,
    debouncer: &mut Debouncer,
    event: notify::Event,
    clock: &impl Clock,
) {
    use notify::EventKind;

    match event.kind {
        EventKind::Modify(notify::event::ModifyKind::Name(mode))
            if mode == notify::event::RenameMode::Both && event.paths.len() == 2 =>
        {
            let old_path = &event.paths[0];
            let new_path = &event.paths[1];
            if let Some(new_canon) = resolve_in_root(config, new_path) {
                bus.emit(
                    Event::new("file:renamed", "fs-collector", clock.epoch_ms())
                        .with_payload("old_path", old_path.display().to_string())
                        .with_payload("new_path", new_canon.display().to_string()),
                );
            }
            return;
        }
        _ => {}
    }

    for path in &event.paths {
        let Some(canonical) = resolve_in_root(config, path) else {
            continue;
        };
        let raw_kind = match event.kind {
            EventKind::Create(_) => RawKind::Created,
            EventKind::Modify(_) => RawKind::Modified,
            EventKind::Remove(_) => RawKind::Deleted,
            _ => continue,
        };
        if let Some((path, kind)) = debouncer.record(canonical, raw_kind, std::time::Instant::now())
        {
            emit_for_kind(bus, path, kind, clock);
        }
    }
}

fn flush_ready(bus: &EventBus, debouncer: &mut Debouncer, clock: &impl Clock) {
    for (path, kind) in debouncer.ready(std::time::Instant::now()) {
        emit_for_kind(bus, path, kind, clock);
    }
}

fn emit_for_kind(bus: &EventBus, path: PathBuf, kind: RawKind, clock: &impl Clock) {
    let path_str = path.display().to_string();
    match kind {
        RawKind::Created => {
            bus.emit(
                Event::new("file:created", "fs-collector", clock.epoch_ms())
                    .with_payload("path", path_str),
            );
        }
        RawKind::Deleted => {
            bus.emit(
                Event::new("file:deleted", "fs-collector", clock.epoch_ms())
                    .with_payload("path", path_str),
            );
        }
        RawKind::Modified => {
            bus.emit(
                Event::new("file:modified", "fs-collector", clock.epoch_ms())
                    .with_payload("path", path_str.clone()),
            );
            // Best-effort save signal: we cannot distinguish an editor's
            // save from an ordinary content write portably, so every
            // debounced content modification also surfaces as a save.
            bus.emit(
                Event::new("file:save", "fs-collector", clock.epoch_ms())
                    .with_payload("path", path_str),
            );
        }
    }
}

fn resolve_in_root(config: &CollectorConfig, path: &Path) -> Option<PathBuf> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !canonical.starts_with(&config.root) {
        tracing::debug!(path = %canonical.display(), root = %config.root.display(), "dropping event outside collector root");
        return None;
    }
    if config.is_ignored(&canonical) {
        return None;
    }
    Some(canonical)
}
