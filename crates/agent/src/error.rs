// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the agent runtime.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid agent config: {0}")]
    InvalidConfig(String),
    #[error("handler timed out")]
    HandlerTimeout,
    #[error("illegal state transition from {from:?} to {to:?}")]
    IllegalTransition {
        from: crate::state::AgentLifecycle,
        to: crate::state::AgentLifecycle,
    },
}
