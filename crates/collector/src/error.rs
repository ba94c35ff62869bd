// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the filesystem collector.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("collector root {0} does not exist or is not a directory")]
    InvalidRoot(PathBuf),
    #[error("invalid glob pattern {pattern}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("debounce_ms must be between {min} and {max}, got {actual}")]
    InvalidDebounce { actual: u64, min: u64, max: u64 },
    #[error("failed to start native watcher: {0}")]
    WatchStart(#[source] notify::Error),
    #[error("watcher reported an unrecoverable error: {0}")]
    WatchFailed(#[source] notify::Error),
    #[error("path {path} resolved outside collector root {root}")]
    PathOutsideRoot { path: PathBuf, root: PathBuf },
}
