//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for black-box testing of the `devloop` CLI
//! and `devloopd` daemon.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;

pub const SPEC_POLL_INTERVAL_MS: u64 = 20;
pub const SPEC_WAIT_MAX_MS: u64 = 15_000;

/// Returns the path to a binary built alongside the test harness. Falls
/// back to resolving relative to the test binary itself when
/// `CARGO_MANIFEST_DIR` is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// Returns the path to the `devloop` CLI binary.
fn devloop_binary() -> PathBuf {
    binary_path("devloop")
}

/// Returns the path to the `devloopd` daemon binary.
pub fn devloopd_binary() -> PathBuf {
    binary_path("devloopd")
}

/// Create a CLI builder for `devloop` commands.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions.
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(devloop_binary());
        cmd.args(&self.args);
        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Run and expect success (exit code 0).
    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect a specific non-zero exit code.
    pub fn fails_with(self, code: i32) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert_eq!(
            output.status.code(),
            Some(code),
            "expected exit code {code}, got {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    /// Run and expect failure (non-zero exit code).
    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}",
            String::from_utf8_lossy(&output.stdout)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run, for chaining assertions.
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{expected}'\nstdout: {stdout}");
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain '{expected}'\nstderr: {stderr}");
        self
    }
}

/// Poll a condition until it returns true or the timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = Duration::from_millis(timeout_ms);
    let poll_interval = Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// Temporary project directory with helper methods for driving a
/// `devloop`/`devloopd` pair against it.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    /// Create an empty project.
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file at `path` (parent directories created automatically).
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }

    /// Write `.devloop/agents.json`, creating the `.devloop` directory if
    /// it doesn't exist yet.
    pub fn agents_config(&self, json: &str) {
        let devloop_dir = self.dir.path().join(".devloop");
        std::fs::create_dir_all(&devloop_dir).unwrap();
        std::fs::write(devloop_dir.join("agents.json"), json).unwrap();
    }

    /// Run `devloop` in this project's directory.
    pub fn devloop(&self) -> CliBuilder {
        cli().pwd(self.path())
    }

    pub fn pid_path(&self) -> PathBuf {
        self.dir.path().join(".devloop/daemon.pid")
    }

    pub fn heartbeat_path(&self) -> PathBuf {
        self.dir.path().join(".devloop/heartbeat")
    }

    pub fn is_running(&self) -> bool {
        self.pid_path().exists()
    }

    pub fn tier_json(&self, tier_file_name: &str) -> Option<serde_json::Value> {
        let path = self.dir.path().join(".devloop/context").join(tier_file_name);
        let bytes = std::fs::read(path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub fn index_json(&self) -> Option<serde_json::Value> {
        self.tier_json("index.json")
    }

    pub fn daemon_log(&self) -> String {
        std::fs::read_to_string(self.dir.path().join(".devloop/daemon.log"))
            .unwrap_or_else(|_| "(no daemon log)".to_string())
    }

    /// Waits for the daemon to become healthy, up to `SPEC_WAIT_MAX_MS`.
    pub fn wait_until_running(&self) -> bool {
        wait_for(SPEC_WAIT_MAX_MS, || {
            self.devloop().args(&["status", "--json"]).passes().stdout().contains("\"running\": true")
        })
    }

    /// Waits for the daemon to have shut down, up to `SPEC_WAIT_MAX_MS`.
    pub fn wait_until_stopped(&self) -> bool {
        wait_for(SPEC_WAIT_MAX_MS, || !self.is_running())
    }
}

impl Drop for Project {
    fn drop(&mut self) {
        // Best-effort cleanup: stop the daemon if our test left it running.
        if self.is_running() {
            let mut cmd = self.devloop().args(&["stop"]).command();
            cmd.stdout(std::process::Stdio::null()).stderr(std::process::Stdio::null());
            let _ = cmd.status();
        }
    }
}
