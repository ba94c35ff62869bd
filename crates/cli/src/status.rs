// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `devloop status`: a read-only snapshot assembled from the pid file,
//! heartbeat file, and context index — never talks to a running daemon
//! directly.

use devloop_daemon::{DaemonConfig, HeartbeatStatus};
use devloop_store::Index;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub running: bool,
    pub pid: Option<u32>,
    pub heartbeat: HeartbeatStatusView,
    pub index: Option<Index>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatStatusView {
    Healthy,
    Unhealthy,
    Error,
    Unknown,
}

impl From<HeartbeatStatus> for HeartbeatStatusView {
    fn from(status: HeartbeatStatus) -> Self {
        match status {
            HeartbeatStatus::Healthy => HeartbeatStatusView::Healthy,
            HeartbeatStatus::Unhealthy => HeartbeatStatusView::Unhealthy,
            HeartbeatStatus::Error => HeartbeatStatusView::Error,
            HeartbeatStatus::Unknown => HeartbeatStatusView::Unknown,
        }
    }
}

pub fn collect(config: &DaemonConfig) -> StatusReport {
    let pid = std::fs::read_to_string(&config.pid_path)
        .ok()
        .and_then(|s| s.trim().parse::<u32>().ok());
    let heartbeat = devloop_daemon::heartbeat_status(&config.heartbeat_path, config.staleness_threshold());
    let index = std::fs::read(config.context_dir.join("index.json"))
        .ok()
        .and_then(|bytes| serde_json::from_slice::<Index>(&bytes).ok());

    StatusReport {
        running: pid.is_some() && heartbeat == HeartbeatStatus::Healthy,
        pid,
        heartbeat: heartbeat.into(),
        index,
    }
}

pub fn print_text(report: &StatusReport) {
    if report.running {
        println!("devloop: running (pid {})", report.pid.unwrap_or_default());
    } else {
        println!("devloop: not running");
    }
    println!("heartbeat: {:?}", report.heartbeat);
    match &report.index {
        Some(index) => {
            println!(
                "  check_now: {} finding(s) across {} file(s)",
                index.check_now.count,
                index.check_now.files.len()
            );
            println!("  mention_if_relevant: {} finding(s)", index.mention_if_relevant.count);
            println!("  deferred: {} finding(s)", index.deferred.count);
            println!("  auto_fixed: {} finding(s)", index.auto_fixed.count);
        }
        None => println!("  no context index found"),
    }
}
