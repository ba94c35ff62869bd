// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon-wide tunables and the `.devloop/` directory layout.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_STALENESS_MULTIPLIER: u32 = 3;
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_LOG_BACKUP_COUNT: u32 = 3;
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Paths and tunables for one project's daemon instance. All state lives
/// under `<project_dir>/.devloop/`.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub project_dir: PathBuf,
    pub devloop_dir: PathBuf,
    pub pid_path: PathBuf,
    pub heartbeat_path: PathBuf,
    pub log_path: PathBuf,
    pub agents_config_path: PathBuf,
    pub context_dir: PathBuf,

    pub heartbeat_interval: Duration,
    pub staleness_multiplier: u32,
    pub shutdown_grace: Duration,
    pub max_log_bytes: u64,
    pub log_backup_count: u32,
    pub cleanup_interval: Duration,
    pub retention: Duration,
    pub max_concurrent_agents: usize,
}

impl DaemonConfig {
    pub fn for_project(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let devloop_dir = project_dir.join(".devloop");
        Self {
            pid_path: devloop_dir.join("daemon.pid"),
            heartbeat_path: devloop_dir.join("heartbeat"),
            log_path: devloop_dir.join("daemon.log"),
            agents_config_path: devloop_dir.join("agents.json"),
            context_dir: devloop_dir.join("context"),
            devloop_dir,
            project_dir,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            staleness_multiplier: DEFAULT_STALENESS_MULTIPLIER,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            max_log_bytes: DEFAULT_MAX_LOG_BYTES,
            log_backup_count: DEFAULT_LOG_BACKUP_COUNT,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            retention: devloop_store::DEFAULT_RETENTION,
            max_concurrent_agents: devloop_agent::DEFAULT_MAX_CONCURRENT_AGENTS,
        }
    }

    pub fn staleness_threshold(&self) -> Duration {
        self.heartbeat_interval * self.staleness_multiplier
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.devloop_dir)?;
        std::fs::create_dir_all(&self.context_dir)
    }
}

pub fn canonical_project_dir(path: &Path) -> std::io::Result<PathBuf> {
    path.canonicalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_scoped_under_devloop_dir() {
        let config = DaemonConfig::for_project("/srv/myproject");
        assert_eq!(config.devloop_dir, PathBuf::from("/srv/myproject/.devloop"));
        assert_eq!(config.pid_path, PathBuf::from("/srv/myproject/.devloop/daemon.pid"));
    }

    #[test]
    fn staleness_threshold_is_multiplier_times_interval() {
        let config = DaemonConfig::for_project("/tmp/x");
        assert_eq!(config.staleness_threshold(), Duration::from_secs(15));
    }
}
