// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration for the command runner: the argv allowlist, the env
//! passthrough allowlist, and resource caps.

use std::collections::HashSet;
use std::time::Duration;

/// Env var names passed through from the daemon's own environment by
/// default. Callers may add to this per-runner; nothing outside this set
/// (plus explicit per-call overrides) ever reaches a child process.
pub const DEFAULT_ENV_PASSTHROUGH: &[&str] = &["PATH", "HOME", "LANG", "LC_ALL", "TERM"];

/// Default cap on stdout/stderr each, beyond which output is truncated.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 8 * 1024 * 1024;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    allowlisted_commands: HashSet<String>,
    env_passthrough: HashSet<String>,
    pub default_timeout: Duration,
    pub max_output_bytes: usize,
    /// Advisory cap surfaced to callers; enforcement is platform-specific
    /// and currently limited to wall-clock timeout, not memory or CPU.
    pub max_memory_bytes: Option<u64>,
}

impl RunnerConfig {
    pub fn new(allowlisted_commands: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            allowlisted_commands: allowlisted_commands.into_iter().map(Into::into).collect(),
            env_passthrough: DEFAULT_ENV_PASSTHROUGH.iter().map(|s| s.to_string()).collect(),
            default_timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            max_memory_bytes: None,
        }
    }

    pub fn with_env_passthrough(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.env_passthrough.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_max_output_bytes(mut self, bytes: usize) -> Self {
        self.max_output_bytes = bytes;
        self
    }

    pub fn with_max_memory_bytes(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    pub fn is_allowlisted(&self, program: &str) -> bool {
        let basename = std::path::Path::new(program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(program);
        self.allowlisted_commands.contains(program) || self.allowlisted_commands.contains(basename)
    }

    pub fn env_passthrough(&self) -> impl Iterator<Item = &str> {
        self.env_passthrough.iter().map(String::as_str)
    }
}
