// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-instance enforcement: an exclusive OS lock on a PID file, with
//! staleness-based reclaim driven by the heartbeat file.

use crate::error::DaemonError;
use fs2::FileExt;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const RECLAIM_RETRY_INTERVAL: Duration = Duration::from_millis(100);
const RECLAIM_RETRIES: u32 = 5;

/// Holds the exclusive lock on `pid_path` for the lifetime of the daemon.
/// Dropping it releases the OS lock and removes the PID file.
pub struct PidLock {
    path: PathBuf,
    file: File,
}

impl PidLock {
    /// Acquires the lock, reclaiming it if the heartbeat at `heartbeat_path`
    /// is missing or older than `staleness_threshold`. A fresh heartbeat
    /// means a live daemon holds the lock, so acquisition fails immediately
    /// without waiting.
    pub fn acquire(
        pid_path: &Path,
        heartbeat_path: &Path,
        staleness_threshold: Duration,
    ) -> Result<Self, DaemonError> {
        if let Some(parent) = pid_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| DaemonError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(pid_path)
            .map_err(|source| DaemonError::Io {
                path: pid_path.to_path_buf(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {}
            Err(source) => {
                if heartbeat_is_stale(heartbeat_path, staleness_threshold) {
                    tracing::warn!(path = %heartbeat_path.display(), "heartbeat is stale, retrying lock acquisition");
                    retry_lock(&file, pid_path, source)?;
                } else {
                    let pid = std::fs::read_to_string(pid_path).unwrap_or_default();
                    return Err(DaemonError::AlreadyRunning {
                        project_dir: pid_path
                            .parent()
                            .and_then(|p| p.parent())
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| pid_path.to_path_buf()),
                        pid: pid.trim().to_string(),
                    });
                }
            }
        }

        let mut file = file;
        file.set_len(0).map_err(|source| DaemonError::Io {
            path: pid_path.to_path_buf(),
            source,
        })?;
        writeln!(file, "{}", std::process::id()).map_err(|source| DaemonError::Io {
            path: pid_path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: pid_path.to_path_buf(),
            file,
        })
    }
}

fn retry_lock(file: &File, pid_path: &Path, first_error: std::io::Error) -> Result<(), DaemonError> {
    for _ in 0..RECLAIM_RETRIES {
        std::thread::sleep(RECLAIM_RETRY_INTERVAL);
        if file.try_lock_exclusive().is_ok() {
            return Ok(());
        }
    }
    Err(DaemonError::LockFailed {
        path: pid_path.to_path_buf(),
        source: first_error,
    })
}

/// `true` when the heartbeat file is missing, unreadable, or older than
/// `threshold` — i.e. when the previous owner is presumed dead.
fn heartbeat_is_stale(heartbeat_path: &Path, threshold: Duration) -> bool {
    let Ok(meta) = std::fs::metadata(heartbeat_path) else {
        return true;
    };
    let Ok(modified) = meta.modified() else {
        return true;
    };
    match modified.elapsed() {
        Ok(age) => age > threshold,
        Err(_) => true,
    }
}

impl Drop for PidLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}
