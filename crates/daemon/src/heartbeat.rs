// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic liveness file and the status classification read from it.

use devloop_core::Clock;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Coarse health classification derived from heartbeat age, surfaced by
/// `devloop status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatStatus {
    Healthy,
    Unhealthy,
    Error,
    Unknown,
}

impl std::fmt::Display for HeartbeatStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HeartbeatStatus::Healthy => "healthy",
            HeartbeatStatus::Unhealthy => "unhealthy",
            HeartbeatStatus::Error => "error",
            HeartbeatStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Spawns a task that rewrites `path` with the current epoch millisecond
/// every `interval`, until the returned handle is aborted.
pub fn spawn_heartbeat(path: PathBuf, interval: Duration, clock: impl Clock + 'static) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(interval);
        loop {
            tick.tick().await;
            if let Err(source) = write_heartbeat(&path, clock.epoch_ms()) {
                tracing::warn!(path = %path.display(), error = %source, "failed to write heartbeat");
            }
        }
    })
}

fn write_heartbeat(path: &Path, epoch_ms: u64) -> std::io::Result<()> {
    std::fs::write(path, epoch_ms.to_string())
}

/// Classifies a running daemon's health from the age of its heartbeat
/// file relative to `threshold` (normally `3 * heartbeat_interval`).
pub fn classify(heartbeat_path: &Path, threshold: Duration) -> HeartbeatStatus {
    let contents = match std::fs::read_to_string(heartbeat_path) {
        Ok(c) => c,
        Err(_) => return HeartbeatStatus::Unknown,
    };
    let Ok(_epoch_ms) = contents.trim().parse::<u64>() else {
        return HeartbeatStatus::Error;
    };
    let Ok(meta) = std::fs::metadata(heartbeat_path) else {
        return HeartbeatStatus::Unknown;
    };
    let Ok(modified) = meta.modified() else {
        return HeartbeatStatus::Unknown;
    };
    match modified.elapsed() {
        Ok(age) if age <= threshold => HeartbeatStatus::Healthy,
        Ok(_) => HeartbeatStatus::Unhealthy,
        Err(_) => HeartbeatStatus::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devloop_core::SystemClock;

    #[tokio::test]
    async fn spawned_heartbeat_writes_readable_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heartbeat");
        let handle = spawn_heartbeat(path.clone(), Duration::from_millis(20), SystemClock);
        tokio::time::sleep(Duration::from_millis(60)).await;
        handle.abort();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.trim().parse::<u64>().is_ok());
    }

    #[test]
    fn classify_missing_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            classify(&dir.path().join("missing"), Duration::from_secs(1)),
            HeartbeatStatus::Unknown
        );
    }

    #[test]
    fn classify_fresh_heartbeat_is_healthy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heartbeat");
        std::fs::write(&path, "123").unwrap();
        assert_eq!(classify(&path, Duration::from_secs(60)), HeartbeatStatus::Healthy);
    }

    #[test]
    fn classify_corrupt_contents_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heartbeat");
        std::fs::write(&path, "not-a-number").unwrap();
        assert_eq!(classify(&path, Duration::from_secs(60)), HeartbeatStatus::Error);
    }
}
