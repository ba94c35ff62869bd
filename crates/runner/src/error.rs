// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for command execution.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("command {0} is not in the runner's allowlist")]
    NotAllowlisted(String),
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
    #[error("resource cap exceeded running {command}: {detail}")]
    ResourceCap { command: String, detail: String },
    #[error("io error waiting on {command}: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}
