// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starting, stopping, and locating the `devloopd` daemon process.

use crate::error::CliError;
use devloop_daemon::DaemonConfig;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(50);
const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Spawns `devloopd <project-dir>` detached, then waits for the pid file to
/// appear and the heartbeat to go fresh before returning. Returns
/// [`CliError::AlreadyRunning`] without spawning anything if a healthy
/// instance already holds the lock.
pub fn start_daemon(config: &DaemonConfig) -> Result<(), CliError> {
    if config.pid_path.exists()
        && devloop_daemon::heartbeat_status(&config.heartbeat_path, config.staleness_threshold())
            == devloop_daemon::HeartbeatStatus::Healthy
    {
        let pid = read_pid(&config.pid_path)?.map(|p| p.to_string()).unwrap_or_default();
        return Err(CliError::AlreadyRunning {
            project_dir: config.project_dir.clone(),
            pid,
        });
    }

    let devloopd_path = find_devloopd_binary()?;

    Command::new(&devloopd_path)
        .arg(&config.project_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CliError::DaemonStartFailed(e.to_string()))?;

    wait_for_ready(config)
}

fn wait_for_ready(config: &DaemonConfig) -> Result<(), CliError> {
    let deadline = Instant::now() + STARTUP_TIMEOUT;
    let threshold = config.staleness_threshold();
    while Instant::now() < deadline {
        if config.pid_path.exists()
            && devloop_daemon::heartbeat_status(&config.heartbeat_path, threshold) == devloop_daemon::HeartbeatStatus::Healthy
        {
            return Ok(());
        }
        std::thread::sleep(STARTUP_POLL_INTERVAL);
    }
    Err(CliError::StartupTimedOut(STARTUP_TIMEOUT))
}

/// Sends SIGTERM to the daemon's pid, then polls for the pid file to
/// disappear within `grace`.
pub fn stop_daemon(config: &DaemonConfig, grace: Duration) -> Result<(), CliError> {
    let pid = read_pid(&config.pid_path)?.ok_or_else(|| CliError::NotRunning(config.project_dir.clone()))?;

    kill_signal("-15", pid);

    let deadline = Instant::now() + grace;
    while Instant::now() < deadline {
        if !config.pid_path.exists() {
            return Ok(());
        }
        std::thread::sleep(STARTUP_POLL_INTERVAL);
    }
    Err(CliError::ShutdownTimedOut(grace))
}

fn read_pid(pid_path: &std::path::Path) -> Result<Option<u32>, CliError> {
    match std::fs::read_to_string(pid_path) {
        Ok(contents) => Ok(contents.trim().parse::<u32>().ok()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CliError::Io {
            path: pid_path.to_path_buf(),
            source,
        }),
    }
}

fn kill_signal(signal: &str, pid: u32) -> bool {
    Command::new("kill")
        .args([signal, &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Looks for `devloopd` next to the running `devloop` binary first, falling
/// back to `$PATH`.
fn find_devloopd_binary() -> Result<PathBuf, CliError> {
    if let Ok(current_exe) = std::env::current_exe() {
        if let Some(dir) = current_exe.parent() {
            let sibling = dir.join("devloopd");
            if sibling.exists() {
                return Ok(sibling);
            }
        }
    }
    Ok(PathBuf::from("devloopd"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_pid_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_pid(&dir.path().join("missing")).unwrap().is_none());
    }

    #[test]
    fn read_pid_parses_trimmed_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daemon.pid");
        std::fs::write(&path, "12345\n").unwrap();
        assert_eq!(read_pid(&path).unwrap(), Some(12345));
    }
}
