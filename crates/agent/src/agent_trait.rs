// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Agent` trait implemented by every DevLoop agent.

use async_trait::async_trait;
use devloop_core::{AgentResult, Event, Pattern};

/// An agent declares its name and the event patterns it subscribes to,
/// and reacts to matching events via `handle`.
#[async_trait]
pub trait Agent: Send + Sync {
    fn name(&self) -> &str;

    fn triggers(&self) -> &[Pattern];

    /// Whether the agent should currently process events. When `false`,
    /// the runtime keeps the subscription alive (so recent-event context
    /// is preserved) but drains events without invoking `handle`.
    fn enabled(&self) -> bool {
        true
    }

    async fn handle(&self, event: Event) -> AgentResult;
}
