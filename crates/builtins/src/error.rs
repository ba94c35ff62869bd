// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuiltinError {
    #[error("tool {tool} config invalid: {detail}")]
    InvalidConfig { tool: String, detail: String },
    #[error("tool {tool} failed to run")]
    Runner {
        tool: String,
        #[source]
        source: devloop_runner::RunnerError,
    },
    #[error("tool {tool} produced a finding devloop_core rejected")]
    InvalidFinding {
        tool: String,
        #[source]
        source: devloop_core::FindingError,
    },
    #[error("tool {tool} could not persist a finding")]
    Store {
        tool: String,
        #[source]
        source: devloop_store::StoreError,
    },
}
