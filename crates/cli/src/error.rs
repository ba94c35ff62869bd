// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("no devloop daemon is running for {0}")]
    NotRunning(PathBuf),

    #[error("devloop is already running for {project_dir} (pid {pid})")]
    AlreadyRunning { project_dir: PathBuf, pid: String },

    #[error("failed to start devloopd: {0}")]
    DaemonStartFailed(String),

    #[error("devloopd did not become ready within {0:?}")]
    StartupTimedOut(std::time::Duration),

    #[error("devloopd did not stop within {0:?}")]
    ShutdownTimedOut(std::time::Duration),

    #[error("io error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
