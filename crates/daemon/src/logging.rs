// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log rotation (checked at startup, size-triggered) and the tracing
//! subscriber wired to the rotated file.

use std::path::Path;

/// Rotates `log_path` if it is at least `max_bytes`: shifts
/// `daemon.log` -> `daemon.log.1` -> ... -> `daemon.log.<backup_count>`,
/// dropping the oldest. Best-effort: failures are logged, not propagated,
/// so a rotation problem never blocks startup.
pub fn rotate_log_if_needed(log_path: &Path, max_bytes: u64, backup_count: u32) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < max_bytes {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..backup_count).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

/// Installs a global tracing subscriber writing to `log_path` with
/// `RUST_LOG`-style filtering (`info` by default). The returned guard must
/// be held for the process lifetime; dropping it stops the non-blocking
/// writer from flushing.
pub fn setup_logging(log_path: &Path) -> std::io::Result<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let dir = log_path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no parent directory")
    })?;
    std::fs::create_dir_all(dir)?;
    let file_name = log_path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no file name")
    })?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotates_when_over_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("daemon.log");
        std::fs::write(&log_path, vec![0u8; 100]).unwrap();

        rotate_log_if_needed(&log_path, 50, 3);

        assert!(!log_path.exists());
        assert!(dir.path().join("daemon.log.1").exists());
    }

    #[test]
    fn leaves_small_logs_alone() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("daemon.log");
        std::fs::write(&log_path, vec![0u8; 10]).unwrap();

        rotate_log_if_needed(&log_path, 50, 3);

        assert!(log_path.exists());
        assert!(!dir.path().join("daemon.log.1").exists());
    }

    #[test]
    fn shifts_existing_rotations_before_dropping_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("daemon.log");
        std::fs::write(&log_path, vec![0u8; 100]).unwrap();
        std::fs::write(dir.path().join("daemon.log.1"), b"old-1").unwrap();
        std::fs::write(dir.path().join("daemon.log.2"), b"old-2").unwrap();

        rotate_log_if_needed(&log_path, 50, 3);

        assert_eq!(std::fs::read_to_string(dir.path().join("daemon.log.2")).unwrap(), "old-1");
        assert_eq!(std::fs::read_to_string(dir.path().join("daemon.log.3")).unwrap(), "old-2");
    }
}
