// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Serializable health/status view of one managed agent.

use crate::state::AgentLifecycle;
use devloop_core::AgentResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleView {
    Created,
    Running,
    Stopping,
    Stopped,
}

impl From<AgentLifecycle> for LifecycleView {
    fn from(s: AgentLifecycle) -> Self {
        match s {
            AgentLifecycle::Created => LifecycleView::Created,
            AgentLifecycle::Running => LifecycleView::Running,
            AgentLifecycle::Stopping => LifecycleView::Stopping,
            AgentLifecycle::Stopped => LifecycleView::Stopped,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentHealth {
    pub name: String,
    pub state: LifecycleView,
    pub enabled: bool,
    pub consecutive_failures: u32,
    pub restart_count: u32,
    pub dropped_events: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_result: Option<AgentResult>,
    /// `true` once the restart policy has given up on this agent.
    pub unhealthy: bool,
}
