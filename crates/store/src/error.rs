// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the context store.

use devloop_core::Tier;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize tier {tier:?}: {source}")]
    Serialize {
        tier: Tier,
        #[source]
        source: serde_json::Error,
    },
    #[error("tier file for {tier:?} at {path} is corrupt: {source}")]
    Corrupt {
        tier: Tier,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("finding is invalid: {0}")]
    InvalidFinding(#[from] devloop_core::FindingError),
}
