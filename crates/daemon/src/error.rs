// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("another devloop daemon is already running for {project_dir} (pid {pid})")]
    AlreadyRunning { project_dir: PathBuf, pid: String },

    #[error("failed to acquire lock at {path}")]
    LockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no devloop daemon appears to be running for {0}")]
    NotRunning(PathBuf),

    #[error("{context}: {field} invalid: {detail}")]
    InvalidConfig {
        context: String,
        field: String,
        detail: String,
    },

    #[error("io error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Collector(#[from] devloop_collector::CollectorError),

    #[error(transparent)]
    Store(#[from] devloop_store::StoreError),

    #[error(transparent)]
    Agent(#[from] devloop_agent::AgentError),

    #[error(transparent)]
    Builtin(#[from] devloop_builtins::BuiltinError),
}
