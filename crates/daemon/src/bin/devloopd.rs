// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! devloopd — the DevLoop background daemon.
//!
//! Watches one project directory, runs configured analysis agents against
//! changes, and publishes findings to the on-disk context store under
//! `<project>/.devloop/`. Normally started by the `devloop` CLI, not
//! invoked directly.

use devloop_daemon::{canonical_project_dir, rotate_log_if_needed, setup_logging, start, DaemonConfig, DaemonError};
use std::path::PathBuf;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if let Some(arg) = args.get(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("devloopd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            path => {
                return run(PathBuf::from(path)).await;
            }
        }
    }

    eprintln!("error: missing required argument <project-dir>");
    print_help();
    std::process::exit(1);
}

fn print_help() {
    println!("devloopd {}", env!("CARGO_PKG_VERSION"));
    println!("DevLoop background daemon — watches a project and runs analysis agents");
    println!();
    println!("USAGE:");
    println!("    devloopd <project-dir>");
    println!();
    println!("devloopd is normally started by the `devloop start` CLI command and");
    println!("should not be invoked directly.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -V, --version    Print version information");
}

async fn run(project_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let project_dir = canonical_project_dir(&project_dir)?;
    let config = DaemonConfig::for_project(project_dir);

    config.ensure_dirs()?;
    rotate_log_if_needed(&config.log_path, config.max_log_bytes, config.log_backup_count);
    let log_guard = setup_logging(&config.log_path)?;

    info!(project_dir = %config.project_dir.display(), "starting devloopd");

    let daemon = match start(config.clone()).await {
        Ok(daemon) => daemon,
        Err(DaemonError::AlreadyRunning { project_dir, pid }) => {
            eprintln!("devloopd is already running for {}", project_dir.display());
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            drop(log_guard);
            std::process::exit(1);
        }
        Err(e) => {
            error!(error = %e, "failed to start daemon");
            drop(log_guard);
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("devloopd ready");
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    daemon.shutdown(config.shutdown_grace).await?;
    info!("devloopd stopped");
    Ok(())
}
