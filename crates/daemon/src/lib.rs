// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! devloop-daemon: the long-running background process for one project —
//! single-instance enforcement, the heartbeat/log/pid files under
//! `.devloop/`, and the collector/store/agent-manager wiring that turns a
//! project directory into a running instance.

mod agents_config;
mod config;
mod error;
mod heartbeat;
mod logging;
mod pidlock;
mod supervisor;

pub use agents_config::{AgentSpec, AgentsFile};
pub use config::{
    canonical_project_dir, DaemonConfig, DEFAULT_CLEANUP_INTERVAL, DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_SHUTDOWN_GRACE,
};
pub use error::DaemonError;
pub use heartbeat::{classify as heartbeat_status, HeartbeatStatus};
pub use logging::{rotate_log_if_needed, setup_logging};
pub use pidlock::PidLock;
pub use supervisor::{start, RunningDaemon};
