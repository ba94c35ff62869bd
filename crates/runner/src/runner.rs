// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Allowlisted subprocess execution: no shell, bounded output, a hard
//! wall-clock timeout, and a minimal environment.

use crate::config::RunnerConfig;
use crate::error::RunnerError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

/// A validated request to run one command. Built through [`CommandSpec::new`]
/// so invalid specs never reach [`CommandRunner::run`].
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env_overrides: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
            env_overrides: BTreeMap::new(),
            timeout: None,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_overrides.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The captured result of running a [`CommandSpec`].
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }

    pub fn stdout_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// Runs argv-only commands against an allowlist; never invokes a shell.
#[derive(Clone)]
pub struct CommandRunner {
    config: RunnerConfig,
}

impl CommandRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self, spec: CommandSpec) -> Result<CommandOutput, RunnerError> {
        if !self.config.is_allowlisted(&spec.program) {
            return Err(RunnerError::NotAllowlisted(spec.program.clone()));
        }

        let timeout = spec.timeout.unwrap_or(self.config.default_timeout);
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .env_clear();

        for name in self.config.env_passthrough() {
            if let Ok(value) = std::env::var(name) {
                cmd.env(name, value);
            }
        }
        for (key, value) in &spec.env_overrides {
            cmd.env(key, value);
        }
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        tracing::debug!(
            program = %spec.program,
            arg_count = spec.args.len(),
            env_var_names = ?spec.env_overrides.keys().collect::<Vec<_>>(),
            "spawning command"
        );

        let started = Instant::now();
        let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
            command: spec.program.clone(),
            source,
        })?;

        let stdio_err = || RunnerError::Io {
            command: spec.program.clone(),
            source: std::io::Error::other("child was spawned without a piped stdout/stderr handle"),
        };
        let mut stdout = child.stdout.take().ok_or_else(stdio_err)?;
        let mut stderr = child.stderr.take().ok_or_else(stdio_err)?;
        let max_bytes = self.config.max_output_bytes;

        let run_fut = async {
            let (stdout_result, stderr_result, status) = tokio::join!(
                capture_bounded(&mut stdout, max_bytes),
                capture_bounded(&mut stderr, max_bytes),
                child.wait(),
            );
            let status = status.map_err(|source| RunnerError::Io {
                command: spec.program.clone(),
                source,
            })?;
            Ok::<_, RunnerError>((stdout_result, stderr_result, status))
        };

        let (stdout_captured, stderr_captured, status) =
            match tokio::time::timeout(timeout, run_fut).await {
                Ok(result) => result?,
                Err(_elapsed) => {
                    let _ = child.kill().await;
                    return Err(RunnerError::Timeout {
                        command: spec.program.clone(),
                        timeout,
                    });
                }
            };

        let (stdout, stdout_truncated) = stdout_captured;
        let (stderr, stderr_truncated) = stderr_captured;

        tracing::debug!(
            program = %spec.program,
            status = ?status.code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "command finished"
        );

        Ok(CommandOutput {
            status_code: status.code(),
            stdout,
            stderr,
            stdout_truncated,
            stderr_truncated,
            duration: started.elapsed(),
        })
    }
}

/// Drains `stream` fully (so the child never blocks on a full pipe) while
/// keeping at most `cap` bytes in memory.
async fn capture_bounded(
    stream: &mut (impl tokio::io::AsyncRead + Unpin),
    cap: usize,
) -> (Vec<u8>, bool) {
    let mut buf = Vec::with_capacity(cap.min(64 * 1024));
    let mut truncated = false;
    let mut chunk = [0u8; 8192];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => break,
        };
        if buf.len() < cap {
            let remaining = cap - buf.len();
            let take = remaining.min(n);
            buf.extend_from_slice(&chunk[..take]);
            if take < n {
                truncated = true;
            }
        } else {
            truncated = true;
        }
    }
    (buf, truncated)
}
