// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared plumbing every built-in agent uses: argv templating and the
//! parse-diagnostics -> submit-findings pipeline.

use crate::diagnostic::RawDiagnostic;
use crate::error::BuiltinError;
use devloop_core::{Clock as _, Finding, SystemClock, Tier};
use devloop_runner::{CommandOutput, CommandRunner, CommandSpec, RunnerError};
use devloop_store::ContextStore;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// An argv template with `{file}` substituted per invocation. Lets agent
/// configuration stay data (serializable from `agents.json`) rather than
/// closures.
#[derive(Debug, Clone)]
pub struct ArgTemplate(Vec<String>);

impl ArgTemplate {
    pub fn new(args: Vec<String>) -> Self {
        Self(args)
    }

    pub fn render(&self, file: &str) -> Vec<String> {
        self.0.iter().map(|a| a.replace("{file}", file)).collect()
    }
}

/// Config common to every thin tool adapter.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    pub program: String,
    pub args: ArgTemplate,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl AdapterConfig {
    pub fn validate(&self, tool: &str) -> Result<(), BuiltinError> {
        if self.program.trim().is_empty() {
            return Err(BuiltinError::InvalidConfig {
                tool: tool.to_string(),
                detail: "program must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Runs `program args(file)` through `runner`, mapping failures into
/// [`BuiltinError`]. A non-allowlisted or timed-out run is a hard error;
/// a non-zero exit is not, since most analyzers exit non-zero when they
/// simply found something to report.
pub async fn run_tool(
    runner: &CommandRunner,
    tool: &str,
    config: &AdapterConfig,
    file: &str,
) -> Result<CommandOutput, BuiltinError> {
    let mut spec = CommandSpec::new(config.program.clone(), config.args.render(file))
        .with_timeout(config.timeout);
    if let Some(cwd) = &config.cwd {
        spec = spec.with_cwd(cwd.clone());
    }
    runner.run(spec).await.map_err(|source| map_runner_error(tool, source))
}

fn map_runner_error(tool: &str, source: RunnerError) -> BuiltinError {
    BuiltinError::Runner {
        tool: tool.to_string(),
        source,
    }
}

/// Builds a stable finding id from the tool name, file, line, and category
/// so repeated runs update the same finding instead of duplicating it.
pub fn finding_id(tool: &str, file: &str, line: Option<u32>, category: &str) -> String {
    match line {
        Some(line) => format!("{tool}:{file}:{line}:{category}"),
        None => format!("{tool}:{file}:{category}"),
    }
}

/// Converts parsed diagnostics into [`Finding`]s and submits each to the
/// store, returning how many were accepted. `fix_applied` is set by an
/// auto-fixer once it has actually rewritten the file through the runner;
/// the store's tiering policy moves those straight to the auto-fixed tier.
pub fn submit_diagnostics(
    store: &ContextStore,
    tool: &str,
    agent_name: &str,
    diagnostics: Vec<RawDiagnostic>,
    fix_applied: bool,
) -> Result<usize, BuiltinError> {
    let now_ms = SystemClock.epoch_ms();
    let mut submitted = 0usize;
    for diag in diagnostics {
        let mut context = BTreeMap::new();
        if fix_applied {
            context.insert("fix_applied".to_string(), serde_json::Value::Bool(true));
        }
        let finding = Finding {
            schema_version: 1,
            id: finding_id(tool, &diag.file, diag.line, diag.rule_code()),
            agent: agent_name.to_string(),
            timestamp: now_ms,
            file: diag.file,
            line: diag.line,
            column: diag.column,
            severity: diag.severity,
            blocking: diag.severity == devloop_core::Severity::Error,
            category: diag.category,
            message: diag.message,
            detail: None,
            suggestion: None,
            auto_fixable: diag.auto_fixable,
            relevance_score: 0.0,
            tier: Tier::Background,
            context,
        };
        store
            .add_finding(finding, now_ms)
            .map_err(|source| BuiltinError::Store {
                tool: tool.to_string(),
                source,
            })?;
        submitted += 1;
    }
    Ok(submitted)
}
