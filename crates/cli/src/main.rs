// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! devloop - the DevLoop CLI
//!
//! A thin surface over the daemon: start it, stop it, and read its status.
//! Everything else (agent output, findings) is consumed by AI coding tools
//! reading the context store directly.

mod error;
mod process;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};
use devloop_daemon::DaemonConfig;
use error::CliError;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "devloop", version, about = "DevLoop - background analysis daemon for AI coding workflows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the daemon is running and a summary of current findings
    Status {
        /// Project directory (defaults to the current directory)
        #[arg(default_value = ".")]
        project_dir: PathBuf,
        /// Print the raw status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the daemon for a project
    Start {
        project_dir: PathBuf,
    },
    /// Stop the daemon for a project
    Stop {
        /// Project directory (defaults to the current directory)
        #[arg(default_value = ".")]
        project_dir: PathBuf,
    },
}

/// Exit code reserved for "another instance is already running", matching
/// the daemon's own single-instance-conflict signal.
const EXIT_ALREADY_RUNNING: i32 = 3;

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Status { project_dir, json } => run_status(project_dir, json),
        Commands::Start { project_dir } => run_start(project_dir),
        Commands::Stop { project_dir } => run_stop(project_dir),
    }
}

fn run_status(project_dir: PathBuf, json: bool) -> Result<()> {
    let project_dir = devloop_daemon::canonical_project_dir(&project_dir).unwrap_or(project_dir);
    let config = DaemonConfig::for_project(project_dir);
    let report = status::collect(&config);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        status::print_text(&report);
    }
    Ok(())
}

fn run_start(project_dir: PathBuf) -> Result<()> {
    let project_dir = devloop_daemon::canonical_project_dir(&project_dir)?;
    let config = DaemonConfig::for_project(project_dir);
    match process::start_daemon(&config) {
        Ok(()) => {
            println!("devloop started for {}", config.project_dir.display());
            Ok(())
        }
        Err(err @ CliError::AlreadyRunning { .. }) => {
            eprintln!("{err}");
            std::process::exit(EXIT_ALREADY_RUNNING);
        }
        Err(err) => Err(err.into()),
    }
}

fn run_stop(project_dir: PathBuf) -> Result<()> {
    let project_dir = devloop_daemon::canonical_project_dir(&project_dir)?;
    let config = DaemonConfig::for_project(project_dir);
    process::stop_daemon(&config, config.shutdown_grace)?;
    println!("devloop stopped for {}", config.project_dir.display());
    Ok(())
}
